pub mod candidate_stack;
pub mod layering;

pub use candidate_stack::CandidateStack;
pub use layering::CardLayer;
