use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use oppidum_game::battle::BattleOutcome;

/// Persistent record of a resolved battle against a village.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    pub id: Uuid,
    pub village_id: u32,
    pub outcome: BattleOutcome,
    pub created_at: DateTime<Utc>,
}

impl BattleReport {
    pub fn new(village_id: u32, outcome: BattleOutcome, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            village_id,
            outcome,
            created_at,
        }
    }
}
