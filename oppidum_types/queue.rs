use serde::{Deserialize, Serialize};
use std::fmt;

use crate::army::UnitName;
use crate::buildings::BuildingName;

/// Which per-village queue an entry belongs to. Limits are enforced per
/// kind, and the tick processes both kinds for every village.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueKind {
    Construction,
    Training,
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueKind::Construction => f.write_str("construction"),
            QueueKind::Training => f.write_str("training"),
        }
    }
}

/// The pending change a queue entry applies on completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueTarget {
    Construction {
        slot_id: u8,
        building: BuildingName,
        target_level: u8,
    },
    Training {
        unit: UnitName,
        quantity: u32,
        /// Frozen at enqueue time; later trainer upgrades do not affect
        /// entries already in flight.
        time_per_unit_secs: u32,
    },
}

impl QueueTarget {
    pub fn kind(&self) -> QueueKind {
        match self {
            QueueTarget::Construction { .. } => QueueKind::Construction,
            QueueTarget::Training { .. } => QueueKind::Training,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueStatus {
    InProgress,
    Completed,
    Cancelled,
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueStatus::InProgress => f.write_str("in_progress"),
            QueueStatus::Completed => f.write_str("completed"),
            QueueStatus::Cancelled => f.write_str("cancelled"),
        }
    }
}
