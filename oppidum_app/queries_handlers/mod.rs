mod optimize_composition;
mod simulate_battle;

pub use optimize_composition::OptimizeCompositionQueryHandler;
pub use simulate_battle::SimulateBattleQueryHandler;
