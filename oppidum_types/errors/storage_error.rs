use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the storage collaborator. `Unavailable` is the
/// transient case: the tick skips the affected village and retries it on
/// the next interval.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Village {0} not found")]
    VillageNotFound(u32),

    #[error("Queue entry {0} not found")]
    QueueEntryNotFound(Uuid),

    #[error("World event {0} not found")]
    EventNotFound(Uuid),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
