use std::sync::Arc;

use oppidum_game::models::queue::QueueEntry;
use oppidum_types::errors::{AppError, ApplicationError, GameError, Result};
use oppidum_types::queue::QueueKind;

use crate::{
    config::Config,
    cqrs::{CommandHandler, commands::EnqueueConstruction},
    uow::UnitOfWork,
};

pub struct EnqueueConstructionCommandHandler {}

impl EnqueueConstructionCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<EnqueueConstruction> for EnqueueConstructionCommandHandler {
    async fn handle(
        &self,
        command: EnqueueConstruction,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        config: &Arc<Config>,
    ) -> Result<(), ApplicationError> {
        let village_repo = uow.villages();
        let queue_repo = uow.queues();
        let mut village = village_repo.get_by_id(command.village_id).await?;

        // An occupied slot only accepts upgrades of its own building.
        if let Some(vb) = village.building_at_slot(command.slot_id) {
            if vb.building.name != command.building {
                return Err(GameError::SlotOccupied {
                    slot_id: command.slot_id,
                }
                .into());
            }
        }

        let active = queue_repo
            .list_active_by_village(command.village_id, QueueKind::Construction)
            .await?;
        if active.len() >= config.construction_queue_limit {
            return Err(AppError::QueueLimitReached {
                queue: "construction",
            }
            .into());
        }

        let entry = QueueEntry::construction(
            &village,
            command.slot_id,
            command.building,
            chrono::Utc::now(),
            config.speed,
        )?;

        village.deduct_resources(&entry.cost)?;
        village_repo.save(&village).await?;
        queue_repo.add(&entry).await?;

        tracing::info!(
            village_id = command.village_id,
            slot_id = command.slot_id,
            building = %command.building,
            entry_id = %entry.id,
            "Enqueued construction"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use oppidum_game::test_utils::{VillageFactoryOptions, village_factory};
    use oppidum_types::buildings::BuildingName;
    use oppidum_types::common::ResourceGroup;
    use oppidum_types::errors::Result;

    use super::*;
    use crate::{config::Config, memory::InMemoryUnitOfWork};

    async fn setup() -> Result<(Box<dyn UnitOfWork<'static> + 'static>, u32, Arc<Config>)> {
        let uow: Box<dyn UnitOfWork<'static> + 'static> = Box::new(InMemoryUnitOfWork::new());

        let village = village_factory(VillageFactoryOptions {
            stocks: Some(ResourceGroup::new(800, 800, 800, 800)),
            ..Default::default()
        });
        let village_id = village.id;
        uow.villages().save(&village).await?;

        Ok((uow, village_id, Arc::new(Config::from_env())))
    }

    #[tokio::test]
    async fn test_enqueue_construction_deducts_cost_and_adds_entry() -> Result<()> {
        let (uow, village_id, config) = setup().await?;
        let before = uow.villages().get_by_id(village_id).await?.stored_resources();

        let handler = EnqueueConstructionCommandHandler::new();
        handler
            .handle(
                EnqueueConstruction {
                    player_id: uuid::Uuid::new_v4(),
                    village_id,
                    slot_id: 1,
                    building: BuildingName::Woodcutter,
                },
                &uow,
                &config,
            )
            .await?;

        let active = uow
            .queues()
            .list_active_by_village(village_id, QueueKind::Construction)
            .await?;
        assert_eq!(active.len(), 1);

        let after = uow.villages().get_by_id(village_id).await?.stored_resources();
        assert_eq!(after.wood(), before.wood() - active[0].cost.wood());
        Ok(())
    }

    #[tokio::test]
    async fn test_enqueue_construction_enforces_queue_limit() -> Result<()> {
        let (uow, village_id, config) = setup().await?;
        let handler = EnqueueConstructionCommandHandler::new();

        for slot_id in 1..=config.construction_queue_limit as u8 {
            let building = uow
                .villages()
                .get_by_id(village_id)
                .await?
                .building_at_slot(slot_id)
                .unwrap()
                .building
                .name;
            handler
                .handle(
                    EnqueueConstruction {
                        player_id: uuid::Uuid::new_v4(),
                        village_id,
                        slot_id,
                        building,
                    },
                    &uow,
                    &config,
                )
                .await?;
        }

        let result = handler
            .handle(
                EnqueueConstruction {
                    player_id: uuid::Uuid::new_v4(),
                    village_id,
                    slot_id: 4,
                    building: BuildingName::Cropland,
                },
                &uow,
                &config,
            )
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::App(AppError::QueueLimitReached {
                queue: "construction"
            }))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_enqueue_construction_rejects_mismatched_slot() -> Result<()> {
        let (uow, village_id, config) = setup().await?;
        let handler = EnqueueConstructionCommandHandler::new();

        // Slot 1 holds the woodcutter.
        let result = handler
            .handle(
                EnqueueConstruction {
                    player_id: uuid::Uuid::new_v4(),
                    village_id,
                    slot_id: 1,
                    building: BuildingName::Warehouse,
                },
                &uow,
                &config,
            )
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::Game(GameError::SlotOccupied { slot_id: 1 }))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_enqueue_construction_fails_without_resources() -> Result<()> {
        let uow: Box<dyn UnitOfWork<'static> + 'static> = Box::new(InMemoryUnitOfWork::new());
        let village = village_factory(VillageFactoryOptions {
            stocks: Some(ResourceGroup::new(0, 0, 0, 0)),
            ..Default::default()
        });
        let village_id = village.id;
        uow.villages().save(&village).await?;
        let config = Arc::new(Config::from_env());

        let handler = EnqueueConstructionCommandHandler::new();
        let result = handler
            .handle(
                EnqueueConstruction {
                    player_id: uuid::Uuid::new_v4(),
                    village_id,
                    slot_id: 1,
                    building: BuildingName::Woodcutter,
                },
                &uow,
                &config,
            )
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::Game(GameError::NotEnoughResources))
        ));
        let active = uow
            .queues()
            .list_active_by_village(village_id, QueueKind::Construction)
            .await?;
        assert!(active.is_empty());
        Ok(())
    }
}
