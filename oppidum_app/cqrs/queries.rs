use oppidum_game::battle::{BattleStats, CompositionPlan};
use oppidum_types::army::{TroopSquad, UnitName};

use crate::cqrs::Query;

/// Monte-Carlo estimate of an attack against a village's current
/// garrison and stocks. Never modifies state.
#[derive(Debug, Clone)]
pub struct SimulateBattle {
    pub village_id: u32,
    pub attacker: Vec<TroopSquad>,
    pub iterations: u32,
    /// Pin the simulation for reproducible results; None draws a fresh
    /// seed.
    pub seed: Option<u64>,
}

impl Query for SimulateBattle {
    type Output = BattleStats;
}

/// Searches the candidate mix ratios for the composition with the best
/// estimated win rate against a village.
#[derive(Debug, Clone)]
pub struct OptimizeComposition {
    pub village_id: u32,
    pub total_units: u32,
    pub available_units: Vec<UnitName>,
    pub seed: Option<u64>,
}

impl Query for OptimizeComposition {
    type Output = CompositionPlan;
}
