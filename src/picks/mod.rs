pub mod copy;
pub mod selector;

pub use selector::{PickRun, PickSelector};
