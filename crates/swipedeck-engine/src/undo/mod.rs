pub mod controller;

pub use controller::{Capture, UndoController, UndoSlot};
