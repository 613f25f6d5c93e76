pub mod engine;
pub mod random;

pub use engine::{BucketCounts, DecisionBuckets, DecisionEngine, MatchEntry, RecordedDecision};
pub use random::{FixedRandom, SeededRandom, SequenceRandom};
