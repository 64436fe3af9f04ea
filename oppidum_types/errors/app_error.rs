use thiserror::Error;
use uuid::Uuid;

/// Errors for app logic.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{queue} queue is full")]
    QueueLimitReached { queue: &'static str },

    #[error("Village {village_id} does not belong to world {world_id}")]
    WrongWorld { village_id: u32, world_id: Uuid },
}
