use std::sync::Arc;

use oppidum_types::errors::{ApplicationError, Result, StorageError};

use crate::{
    config::Config,
    cqrs::{CommandHandler, commands::CancelQueueEntry},
    uow::UnitOfWork,
};

pub struct CancelQueueEntryCommandHandler {}

impl CancelQueueEntryCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<CancelQueueEntry> for CancelQueueEntryCommandHandler {
    async fn handle(
        &self,
        command: CancelQueueEntry,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        config: &Arc<Config>,
    ) -> Result<(), ApplicationError> {
        let village_repo = uow.villages();
        let queue_repo = uow.queues();

        let mut entry = queue_repo.get_by_id(command.entry_id).await?;
        // An entry id from another village is treated as unknown rather
        // than leaking its existence.
        if entry.village_id != command.village_id {
            return Err(StorageError::QueueEntryNotFound(command.entry_id).into());
        }

        let refund = entry.cancel(config.refund_fraction)?;

        let mut village = village_repo.get_by_id(command.village_id).await?;
        village.store_resources(&refund);

        queue_repo.save(&entry).await?;
        village_repo.save(&village).await?;

        tracing::info!(
            village_id = command.village_id,
            entry_id = %entry.id,
            refund = ?refund,
            "Cancelled queue entry"
        );
        Ok(())
    }
}
