pub mod army;
pub mod buildings;
pub mod common;
pub mod errors;
pub mod queue;

pub use errors::Result;
