use std::sync::Arc;

use oppidum_game::battle::{BattleSimulator, CompositionPlan};
use oppidum_game::defense::defensive_bonus;
use oppidum_types::errors::{ApplicationError, Result};

use crate::{
    config::Config,
    cqrs::{QueryHandler, queries::OptimizeComposition},
    uow::UnitOfWork,
};

pub struct OptimizeCompositionQueryHandler {}

impl OptimizeCompositionQueryHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl QueryHandler<OptimizeComposition> for OptimizeCompositionQueryHandler {
    async fn handle(
        &self,
        query: OptimizeComposition,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &Arc<Config>,
    ) -> Result<CompositionPlan, ApplicationError> {
        let village = uow.villages().get_by_id(query.village_id).await?;

        let mut simulator = match query.seed {
            Some(seed) => BattleSimulator::seeded(seed),
            None => BattleSimulator::from_entropy(),
        };

        let plan = simulator.optimize_composition(
            query.total_units,
            &query.available_units,
            village.garrison(),
            defensive_bonus(&village),
            &village.stored_resources(),
        )?;

        Ok(plan)
    }
}
