use thiserror::Error;

use crate::{army::UnitName, buildings::BuildingName, queue::QueueStatus};

/// Errors for domain logic (game rules).
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Not enough resources")]
    NotEnoughResources,

    #[error("Quantity must be positive")]
    InvalidQuantity,

    #[error("Iteration count must be positive")]
    InvalidIterations,

    #[error("No units selected")]
    NoUnitsSelected,

    #[error("Building has already reached max level")]
    BuildingMaxLevelReached,

    #[error("No building on slot {slot_id}")]
    EmptySlot { slot_id: u8 },

    #[error("Slot {slot_id} is already occupied")]
    SlotOccupied { slot_id: u8 },

    #[error("{building} at level {level} required to train {unit}")]
    TrainingBuildingMissing {
        building: BuildingName,
        level: u8,
        unit: UnitName,
    },

    #[error("Entry is {from}, expected in_progress")]
    InvalidStateTransition { from: QueueStatus },

    #[error("Stock invariant violated for {resource}: {amount}")]
    StockInvariantViolated { resource: String, amount: f64 },
}
