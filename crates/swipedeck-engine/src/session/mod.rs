pub mod clock;
pub mod machine;

pub use clock::ManualScheduler;
pub use machine::Session;
