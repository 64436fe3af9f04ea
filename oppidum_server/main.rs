use std::sync::Arc;

use uuid::Uuid;

use oppidum_app::{
    config::Config, memory::InMemoryUnitOfWorkProvider, notifier::NullNotifier,
    tick::TickOrchestrator, uow::UnitOfWorkProvider, worker::TickWorker,
};
use oppidum_game::models::village::Village;
use oppidum_types::common::Position;
use oppidum_types::errors::{ApplicationError, Result};

mod logs;
use logs::setup_logging;

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    setup_logging();

    let config = Arc::new(Config::from_env());
    let uow_provider: Arc<dyn UnitOfWorkProvider> = Arc::new(InMemoryUnitOfWorkProvider::new());

    bootstrap_world(&uow_provider).await?;

    let orchestrator = Arc::new(TickOrchestrator::new(
        uow_provider.clone(),
        Arc::new(NullNotifier),
        config.clone(),
    ));
    let worker = Arc::new(TickWorker::new(orchestrator, &config));
    worker.run();

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| ApplicationError::Unknown(e.to_string()))?;
    tracing::info!("Shutting down");
    Ok(())
}

/// Seeds a starter village on first boot so the tick has something to
/// drive. A populated store is left untouched.
async fn bootstrap_world(provider: &Arc<dyn UnitOfWorkProvider>) -> Result<(), ApplicationError> {
    let uow = provider.tx().await?;

    if uow.villages().list_ids().await?.is_empty() {
        let village = Village::new(
            1,
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Capital".to_string(),
            Position { x: 0, y: 0 },
        );
        uow.villages().save(&village).await?;
        tracing::info!(village_id = village.id, "World bootstrapped with starter village");
    } else {
        tracing::info!("World already populated. Skipping bootstrap.");
    }

    uow.commit().await
}
