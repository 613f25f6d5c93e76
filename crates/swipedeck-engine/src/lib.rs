#![forbid(unsafe_code)]

pub mod decision;
pub mod gesture;
pub mod replay;
pub mod session;
pub mod stack;
pub mod undo;
