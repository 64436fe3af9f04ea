use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use oppidum_types::army::TroopSquad;

/// A scheduled world-level occurrence, processed by the tick after the
/// per-village pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEvent {
    pub id: Uuid,
    pub world_id: Uuid,
    pub kind: WorldEventKind,
    pub due_at: DateTime<Utc>,
    pub processed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEventKind {
    /// A wonder under construction reached a stage worth announcing.
    WonderStage { village_id: u32, stage: u8 },
    /// An external force strikes a village at `due_at`.
    Incursion {
        target_village_id: u32,
        attacker: Vec<TroopSquad>,
    },
}

impl WorldEvent {
    pub fn new(world_id: Uuid, kind: WorldEventKind, due_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            world_id,
            kind,
            due_at,
            processed: false,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.processed && self.due_at <= now
    }

    /// Handler-registry key for this event kind.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            WorldEventKind::WonderStage { .. } => "WonderStage",
            WorldEventKind::Incursion { .. } => "Incursion",
        }
    }
}
