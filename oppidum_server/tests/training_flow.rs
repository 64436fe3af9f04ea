use std::sync::Arc;

use chrono::{Duration, Utc};

use oppidum_app::{
    bus::AppBus,
    command_handlers::{CancelQueueEntryCommandHandler, EnqueueTrainingCommandHandler},
    config::Config,
    cqrs::commands::{CancelQueueEntry, EnqueueTraining},
    memory::InMemoryUnitOfWorkProvider,
    notifier::NullNotifier,
    tick::TickOrchestrator,
    uow::UnitOfWorkProvider,
};
use oppidum_game::models::buildings::Building;
use oppidum_game::test_utils::{VillageFactoryOptions, village_factory};
use oppidum_types::{
    army::{UnitName, get_unit_data},
    buildings::BuildingName,
    common::ResourceGroup,
    errors::Result,
    queue::{QueueKind, QueueStatus},
};

async fn setup() -> Result<(Arc<dyn UnitOfWorkProvider>, Arc<Config>, u32, uuid::Uuid)> {
    let config = Arc::new(Config::from_env());
    let provider: Arc<dyn UnitOfWorkProvider> = Arc::new(InMemoryUnitOfWorkProvider::new());

    let mut village = village_factory(VillageFactoryOptions {
        stocks: Some(ResourceGroup::new(800, 800, 800, 800)),
        ..Default::default()
    });
    let barracks = Building::new(BuildingName::Barracks).at_level(5)?;
    village.add_building_at_slot(barracks, 10)?;

    let village_id = village.id;
    let player_id = village.player_id;

    let uow = provider.tx().await?;
    uow.villages().save(&village).await?;
    uow.commit().await?;

    Ok((provider, config, village_id, player_id))
}

#[tokio::test]
async fn test_full_training_flow_trains_units_one_at_a_time() -> Result<()> {
    let (provider, config, village_id, player_id) = setup().await?;
    let bus = AppBus::new(config.clone(), provider.clone());

    bus.execute(
        EnqueueTraining {
            player_id,
            village_id,
            unit: UnitName::Spearman,
            quantity: 3,
        },
        EnqueueTrainingCommandHandler::new(),
    )
    .await?;

    // A level 5 barracks shaves 25% off the nominal per-unit time.
    let entry = {
        let uow = provider.tx().await?;
        let active = uow
            .queues()
            .list_active_by_village(village_id, QueueKind::Training)
            .await?;
        uow.rollback().await?;
        active.into_iter().next().unwrap()
    };
    let nominal = get_unit_data(&UnitName::Spearman).training_time_secs;
    let expected_per_unit = (nominal as f64 * 0.75).floor() as i64;
    assert_eq!(
        (entry.completed_at - entry.started_at).num_seconds(),
        expected_per_unit
    );

    // Each tick delivers exactly one unit; the chain carries the rest.
    let orchestrator =
        TickOrchestrator::new(provider.clone(), Arc::new(NullNotifier), config.clone());
    let far_future = Utc::now() + Duration::days(7);
    for expected in 1..=3u32 {
        orchestrator.run_tick_at(far_future).await?;

        let uow = provider.tx().await?;
        let saved = uow.villages().get_by_id(village_id).await?;
        let spearmen = saved
            .garrison()
            .iter()
            .find(|s| s.unit == UnitName::Spearman)
            .map_or(0, |s| s.quantity);
        assert_eq!(spearmen, expected);
        uow.rollback().await?;
    }

    let uow = provider.tx().await?;
    let active = uow
        .queues()
        .list_active_by_village(village_id, QueueKind::Training)
        .await?;
    assert!(active.is_empty(), "Chain should be exhausted");
    uow.rollback().await?;
    Ok(())
}

#[tokio::test]
async fn test_cancel_training_refunds_remaining_cost() -> Result<()> {
    let (provider, config, village_id, player_id) = setup().await?;
    let bus = AppBus::new(config.clone(), provider.clone());

    bus.execute(
        EnqueueTraining {
            player_id,
            village_id,
            unit: UnitName::Spearman,
            quantity: 2,
        },
        EnqueueTrainingCommandHandler::new(),
    )
    .await?;

    let (entry, wood_after_enqueue) = {
        let uow = provider.tx().await?;
        let active = uow
            .queues()
            .list_active_by_village(village_id, QueueKind::Training)
            .await?;
        let village = uow.villages().get_by_id(village_id).await?;
        uow.rollback().await?;
        (
            active.into_iter().next().unwrap(),
            village.stored_resources().wood(),
        )
    };

    bus.execute(
        CancelQueueEntry {
            player_id,
            village_id,
            entry_id: entry.id,
        },
        CancelQueueEntryCommandHandler::new(),
    )
    .await?;

    let refund = entry.cost * config.refund_fraction;
    let uow = provider.tx().await?;
    let village = uow.villages().get_by_id(village_id).await?;
    assert_eq!(
        village.stored_resources().wood(),
        wood_after_enqueue + refund.wood()
    );
    assert_eq!(
        uow.queues().get_by_id(entry.id).await?.status,
        QueueStatus::Cancelled
    );
    uow.rollback().await?;
    Ok(())
}
