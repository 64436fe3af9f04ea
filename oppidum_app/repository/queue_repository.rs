use chrono::{DateTime, Utc};
use uuid::Uuid;

use oppidum_game::models::queue::QueueEntry;
use oppidum_types::errors::ApplicationError;
use oppidum_types::queue::QueueKind;

#[async_trait::async_trait]
pub trait QueueRepository: Send + Sync {
    async fn add(&self, entry: &QueueEntry) -> Result<(), ApplicationError>;

    async fn get_by_id(&self, entry_id: Uuid) -> Result<QueueEntry, ApplicationError>;

    /// In-progress entries of one kind for a village, ordered by
    /// `started_at`. Used to enforce the per-village queue limits.
    async fn list_active_by_village(
        &self,
        village_id: u32,
        kind: QueueKind,
    ) -> Result<Vec<QueueEntry>, ApplicationError>;

    /// In-progress entries for a village whose deadline has passed,
    /// ordered by `started_at`, capped at `limit`.
    async fn list_due_by_village(
        &self,
        village_id: u32,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<QueueEntry>, ApplicationError>;

    async fn save(&self, entry: &QueueEntry) -> Result<(), ApplicationError>;
}
