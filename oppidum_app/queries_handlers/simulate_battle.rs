use std::sync::Arc;

use oppidum_game::battle::{BattleSimulator, BattleStats};
use oppidum_game::defense::defensive_bonus;
use oppidum_types::errors::{ApplicationError, Result};

use crate::{
    config::Config,
    cqrs::{QueryHandler, queries::SimulateBattle},
    uow::UnitOfWork,
};

pub struct SimulateBattleQueryHandler {}

impl SimulateBattleQueryHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl QueryHandler<SimulateBattle> for SimulateBattleQueryHandler {
    async fn handle(
        &self,
        query: SimulateBattle,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &Arc<Config>,
    ) -> Result<BattleStats, ApplicationError> {
        let village = uow.villages().get_by_id(query.village_id).await?;

        let mut simulator = match query.seed {
            Some(seed) => BattleSimulator::seeded(seed),
            None => BattleSimulator::from_entropy(),
        };

        let stats = simulator.simulate(
            &query.attacker,
            village.garrison(),
            defensive_bonus(&village),
            &village.stored_resources(),
            query.iterations,
        )?;

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use oppidum_game::models::buildings::Building;
    use oppidum_game::test_utils::{VillageFactoryOptions, village_factory};
    use oppidum_types::army::{TroopSquad, UnitName};
    use oppidum_types::buildings::BuildingName;
    use oppidum_types::errors::Result;

    use super::*;
    use crate::{config::Config, memory::InMemoryUnitOfWork};

    #[tokio::test]
    async fn test_simulate_battle_leaves_village_untouched() -> Result<()> {
        let uow: Box<dyn UnitOfWork<'static> + 'static> = Box::new(InMemoryUnitOfWork::new());
        let config = Arc::new(Config::from_env());

        let mut village = village_factory(VillageFactoryOptions {
            garrison: Some(vec![(UnitName::Swordsman, 20)]),
            ..Default::default()
        });
        let wall = Building::new(BuildingName::Wall).at_level(5)?;
        village.add_building_at_slot(wall, 10)?;
        uow.villages().save(&village).await?;
        let before = uow.villages().get_by_id(village.id).await?;

        let handler = SimulateBattleQueryHandler::new();
        let stats = handler
            .handle(
                SimulateBattle {
                    village_id: village.id,
                    attacker: vec![TroopSquad::new(UnitName::Spearman, 100)],
                    iterations: 50,
                    seed: Some(11),
                },
                &uow,
                &config,
            )
            .await?;

        assert_eq!(stats.iterations, 50);
        assert_eq!(
            stats.attacker_wins + stats.defender_wins + stats.draws,
            50
        );

        let after = uow.villages().get_by_id(village.id).await?;
        assert_eq!(before, after);
        Ok(())
    }

    #[tokio::test]
    async fn test_simulate_battle_is_reproducible_with_seed() -> Result<()> {
        let uow: Box<dyn UnitOfWork<'static> + 'static> = Box::new(InMemoryUnitOfWork::new());
        let config = Arc::new(Config::from_env());

        let village = village_factory(VillageFactoryOptions {
            garrison: Some(vec![(UnitName::Swordsman, 50)]),
            ..Default::default()
        });
        uow.villages().save(&village).await?;

        let handler = SimulateBattleQueryHandler::new();
        let query = SimulateBattle {
            village_id: village.id,
            attacker: vec![TroopSquad::new(UnitName::Spearman, 200)],
            iterations: 100,
            seed: Some(7),
        };

        let first = handler.handle(query.clone(), &uow, &config).await?;
        let second = handler.handle(query, &uow, &config).await?;
        assert_eq!(first, second);
        Ok(())
    }
}
