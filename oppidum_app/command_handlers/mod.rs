mod cancel_queue_entry;
mod enqueue_construction;
mod enqueue_training;

pub use cancel_queue_entry::CancelQueueEntryCommandHandler;
pub use enqueue_construction::EnqueueConstructionCommandHandler;
pub use enqueue_training::EnqueueTrainingCommandHandler;
