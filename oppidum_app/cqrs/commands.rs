use uuid::Uuid;

use oppidum_types::{army::UnitName, buildings::BuildingName};

use crate::cqrs::Command;

#[derive(Debug, Clone)]
pub struct EnqueueConstruction {
    pub player_id: Uuid,
    pub village_id: u32,
    pub slot_id: u8,
    pub building: BuildingName,
}

impl Command for EnqueueConstruction {}

#[derive(Debug, Clone)]
pub struct EnqueueTraining {
    pub player_id: Uuid,
    pub village_id: u32,
    pub unit: UnitName,
    pub quantity: u32,
}

impl Command for EnqueueTraining {}

#[derive(Debug, Clone)]
pub struct CancelQueueEntry {
    pub player_id: Uuid,
    pub village_id: u32,
    pub entry_id: Uuid,
}

impl Command for CancelQueueEntry {}
