use uuid::Uuid;

use oppidum_game::battle::BattleVerdict;
use oppidum_types::army::UnitName;
use oppidum_types::buildings::BuildingName;
use oppidum_types::common::Resource;
use oppidum_types::errors::ApplicationError;

/// Notifications emitted by the tick for player-facing delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum GameNotification {
    StorageOverflow {
        village_id: u32,
        resource: Resource,
        discarded: u32,
    },
    ConstructionCompleted {
        village_id: u32,
        building: BuildingName,
        level: u8,
    },
    TrainingCompleted {
        village_id: u32,
        unit: UnitName,
        remaining: u32,
    },
    BattleResolved {
        village_id: u32,
        report_id: Uuid,
        verdict: BattleVerdict,
    },
    WonderStageReached {
        village_id: u32,
        stage: u8,
    },
}

/// Delivery seam for notifications. Implementations must tolerate being
/// called from concurrent village tasks.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: GameNotification) -> Result<(), ApplicationError>;
}

/// Discards everything. The default wiring until a real delivery channel
/// exists.
pub struct NullNotifier;

#[async_trait::async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _notification: GameNotification) -> Result<(), ApplicationError> {
        Ok(())
    }
}

/// Records notifications in memory so tests can assert on them.
#[cfg(any(test, feature = "test-utils"))]
pub struct RecordingNotifier {
    sent: std::sync::Mutex<Vec<GameNotification>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<GameNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: GameNotification) -> Result<(), ApplicationError> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}
