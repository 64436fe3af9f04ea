//! Factories for creating domain model instances for testing.
//! These do not interact with any storage.

use rand::Rng;
use uuid::Uuid;

use oppidum_types::army::{TroopSquad, UnitName};
use oppidum_types::common::{Position, Resource, ResourceGroup};

use crate::models::village::Village;

#[derive(Default, Clone)]
pub struct VillageFactoryOptions {
    pub id: Option<u32>,
    pub world_id: Option<Uuid>,
    pub player_id: Option<Uuid>,
    pub name: Option<String>,
    pub position: Option<Position>,
    /// Overrides the starting stocks of all four pools. The raw amounts are
    /// written as-is, so tests can seed stocks above the base capacity.
    pub stocks: Option<ResourceGroup>,
    pub garrison: Option<Vec<(UnitName, u32)>>,
}

pub fn village_factory(options: VillageFactoryOptions) -> Village {
    let default_name = format!("village_{}", rand::thread_rng().r#gen::<u32>());

    let mut village = Village::new(
        options.id.unwrap_or(1),
        options.world_id.unwrap_or_else(Uuid::new_v4),
        options.player_id.unwrap_or_else(Uuid::new_v4),
        options.name.unwrap_or(default_name),
        options.position.unwrap_or(Position { x: 0, y: 0 }),
    );

    if let Some(stocks) = options.stocks {
        for resource in Resource::ALL {
            village
                .pool_mut(resource)
                .set_amount(stocks.get(resource));
        }
    }

    for (unit, quantity) in options.garrison.unwrap_or_default() {
        village.add_troops(unit, quantity);
    }

    village
}

pub fn garrison_factory(squads: &[(UnitName, u32)]) -> Vec<TroopSquad> {
    squads
        .iter()
        .map(|(unit, quantity)| TroopSquad::new(*unit, *quantity))
        .collect()
}
