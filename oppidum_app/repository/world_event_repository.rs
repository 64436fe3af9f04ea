use chrono::{DateTime, Utc};
use uuid::Uuid;

use oppidum_types::errors::ApplicationError;

use crate::events::WorldEvent;

#[async_trait::async_trait]
pub trait WorldEventRepository: Send + Sync {
    async fn add(&self, event: &WorldEvent) -> Result<(), ApplicationError>;

    /// Unprocessed events whose deadline has passed, ordered by `due_at`.
    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<WorldEvent>, ApplicationError>;

    async fn mark_processed(&self, event_id: Uuid) -> Result<(), ApplicationError>;
}
