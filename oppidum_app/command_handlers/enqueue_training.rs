use std::sync::Arc;

use oppidum_game::models::queue::QueueEntry;
use oppidum_types::errors::{AppError, ApplicationError, Result};
use oppidum_types::queue::QueueKind;

use crate::{
    config::Config,
    cqrs::{CommandHandler, commands::EnqueueTraining},
    uow::UnitOfWork,
};

pub struct EnqueueTrainingCommandHandler {}

impl EnqueueTrainingCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<EnqueueTraining> for EnqueueTrainingCommandHandler {
    async fn handle(
        &self,
        command: EnqueueTraining,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        config: &Arc<Config>,
    ) -> Result<(), ApplicationError> {
        let village_repo = uow.villages();
        let queue_repo = uow.queues();
        let mut village = village_repo.get_by_id(command.village_id).await?;

        let active = queue_repo
            .list_active_by_village(command.village_id, QueueKind::Training)
            .await?;
        if active.len() >= config.training_queue_limit {
            return Err(AppError::QueueLimitReached { queue: "training" }.into());
        }

        // The whole batch is paid upfront; the per-unit chain carries the
        // remaining cost for refunds.
        let entry = QueueEntry::training(
            &village,
            command.unit,
            command.quantity,
            chrono::Utc::now(),
            config.speed,
        )?;

        village.deduct_resources(&entry.cost)?;
        village_repo.save(&village).await?;
        queue_repo.add(&entry).await?;

        tracing::info!(
            village_id = command.village_id,
            unit = %command.unit,
            quantity = command.quantity,
            entry_id = %entry.id,
            "Enqueued training"
        );
        Ok(())
    }
}
