pub mod buildings;
pub mod queue;
pub mod village;
