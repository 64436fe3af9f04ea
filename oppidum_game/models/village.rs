use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use oppidum_types::army::{TroopSquad, UnitName};
use oppidum_types::buildings::BuildingName;
use oppidum_types::common::{Position, Resource, ResourceGroup};
use oppidum_types::errors::GameError;

use super::buildings::Building;

/// Base production in units/hour every pool gets even with no producing
/// buildings, and base storage before any warehouse/granary.
const BASE_PRODUCTION_PER_HOUR: u32 = 8;
const BASE_STORAGE_CAPACITY: u32 = 800;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VillageBuilding {
    pub slot_id: u8,
    pub building: Building,
}

/// One resource pool of a village. `amount` is kept fractional so frequent
/// settlements do not lose sub-unit production to rounding; consumers see
/// the floored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub resource: Resource,
    amount: f64,
    /// Units per second. Negative is legal for crop under heavy upkeep.
    pub production_rate: f64,
    pub storage_capacity: u32,
    pub last_updated: DateTime<Utc>,
}

impl ResourcePool {
    pub fn new(resource: Resource, amount: u32, capacity: u32, now: DateTime<Utc>) -> Self {
        Self {
            resource,
            amount: amount as f64,
            production_rate: 0.0,
            storage_capacity: capacity,
            last_updated: now,
        }
    }

    pub fn amount(&self) -> u32 {
        self.amount.max(0.0).floor() as u32
    }

    /// Raw write, may exceed capacity; the next `settle` reconciles it.
    pub fn set_amount(&mut self, amount: u32) {
        self.amount = amount as f64;
    }

    /// Reconciles the stored amount with elapsed time. Returns the amount
    /// of production discarded at capacity, if any. Idempotent for a given
    /// `now`: a second call sees zero elapsed time and changes nothing.
    pub fn settle(&mut self, now: DateTime<Utc>) -> Option<f64> {
        let elapsed_secs = (now - self.last_updated).num_milliseconds() as f64 / 1000.0;
        if elapsed_secs <= 0.0 {
            return None;
        }

        let produced = self.production_rate * elapsed_secs;
        let uncapped = self.amount + produced;
        let settled = uncapped.clamp(0.0, self.storage_capacity as f64);

        // Skip the write when nothing changed (e.g. idle pool at zero rate).
        if (settled - self.amount).abs() < f64::EPSILON {
            return None;
        }

        self.amount = settled;
        self.last_updated = now;

        let discarded = uncapped - self.storage_capacity as f64;
        (discarded > 0.0).then_some(discarded)
    }
}

/// Per-resource overflow detected during a settlement, for the
/// notification collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementReport {
    pub village_id: u32,
    pub settled_at: DateTime<Utc>,
    pub overflows: Vec<(Resource, u32)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Village {
    pub id: u32,
    pub world_id: Uuid,
    pub player_id: Uuid,
    pub name: String,
    pub position: Position,
    pub population: u32,
    buildings: Vec<VillageBuilding>,
    garrison: Vec<TroopSquad>,
    pools: [ResourcePool; 4],
    pub updated_at: DateTime<Utc>,
}

impl Village {
    /// Returns a new village with the starting resource fields and a level
    /// 1 main building.
    pub fn new(
        id: u32,
        world_id: Uuid,
        player_id: Uuid,
        name: String,
        position: Position,
    ) -> Self {
        let now = Utc::now();
        let pools = Resource::ALL
            .map(|r| ResourcePool::new(r, BASE_STORAGE_CAPACITY, BASE_STORAGE_CAPACITY, now));

        let mut village = Self {
            id,
            world_id,
            player_id,
            name,
            position,
            population: 0,
            buildings: vec![],
            garrison: vec![],
            pools,
            updated_at: now,
        };

        let starting = [
            BuildingName::Woodcutter,
            BuildingName::ClayPit,
            BuildingName::IronMine,
            BuildingName::Cropland,
            BuildingName::MainBuilding,
        ];
        for (idx, name) in starting.into_iter().enumerate() {
            village.buildings.push(VillageBuilding {
                slot_id: idx as u8 + 1,
                building: Building::new(name),
            });
        }

        village.refresh_state();
        village
    }

    /// Constructor for re-hydrating a village from persistence.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: u32,
        world_id: Uuid,
        player_id: Uuid,
        name: String,
        position: Position,
        buildings: Vec<VillageBuilding>,
        garrison: Vec<TroopSquad>,
        pools: [ResourcePool; 4],
        updated_at: DateTime<Utc>,
    ) -> Self {
        let mut village = Self {
            id,
            world_id,
            player_id,
            name,
            position,
            population: 0,
            buildings,
            garrison,
            pools,
            updated_at,
        };
        village.refresh_state();
        village
    }

    pub fn buildings(&self) -> &Vec<VillageBuilding> {
        &self.buildings
    }

    pub fn pools(&self) -> &[ResourcePool; 4] {
        &self.pools
    }

    pub fn pool(&self, resource: Resource) -> &ResourcePool {
        &self.pools[resource.index()]
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn pool_mut(&mut self, resource: Resource) -> &mut ResourcePool {
        &mut self.pools[resource.index()]
    }

    pub fn garrison(&self) -> &Vec<TroopSquad> {
        &self.garrison
    }

    /// Returns a building on a given slot. None if the slot is empty.
    pub fn building_at_slot(&self, slot_id: u8) -> Option<&VillageBuilding> {
        self.buildings.iter().find(|vb| vb.slot_id == slot_id)
    }

    /// Returns the highest-level building of the given kind, if present.
    pub fn building_by_name(&self, name: &BuildingName) -> Option<&VillageBuilding> {
        self.buildings
            .iter()
            .filter(|vb| vb.building.name == *name)
            .max_by_key(|vb| vb.building.level)
    }

    pub fn building_level(&self, name: &BuildingName) -> u8 {
        self.building_by_name(name).map_or(0, |vb| vb.building.level)
    }

    /// Places a new building on an empty slot.
    pub fn add_building_at_slot(
        &mut self,
        building: Building,
        slot_id: u8,
    ) -> Result<(), GameError> {
        if self.building_at_slot(slot_id).is_some() {
            return Err(GameError::SlotOccupied { slot_id });
        }
        self.buildings.push(VillageBuilding { slot_id, building });
        self.refresh_state();
        Ok(())
    }

    /// Assigns a new level to the building in the given slot.
    pub fn set_building_level_at_slot(
        &mut self,
        slot_id: u8,
        level: u8,
    ) -> Result<(), GameError> {
        let idx = self
            .buildings
            .iter()
            .position(|vb| vb.slot_id == slot_id)
            .ok_or(GameError::EmptySlot { slot_id })?;

        let upgraded = self.buildings[idx].building.at_level(level)?;
        self.buildings[idx].building = upgraded;
        self.refresh_state();
        Ok(())
    }

    /// Demolishes the building in the given slot.
    pub fn remove_building_at_slot(&mut self, slot_id: u8) -> Result<(), GameError> {
        if self.building_at_slot(slot_id).is_none() {
            return Err(GameError::EmptySlot { slot_id });
        }
        self.buildings.retain(|vb| vb.slot_id != slot_id);
        self.refresh_state();
        Ok(())
    }

    pub fn stored_resources(&self) -> ResourceGroup {
        ResourceGroup::new(
            self.pools[0].amount(),
            self.pools[1].amount(),
            self.pools[2].amount(),
            self.pools[3].amount(),
        )
    }

    pub fn has_enough_resources(&self, cost: &ResourceGroup) -> bool {
        Resource::ALL
            .iter()
            .all(|r| self.pool(*r).amount() >= cost.get(*r))
    }

    /// Tries to deduct resources, failing without any change if the stocks
    /// don't cover the cost.
    pub fn deduct_resources(&mut self, cost: &ResourceGroup) -> Result<(), GameError> {
        if !self.has_enough_resources(cost) {
            return Err(GameError::NotEnoughResources);
        }
        for resource in Resource::ALL {
            let pool = &mut self.pools[resource.index()];
            pool.amount -= cost.get(resource) as f64;
            if pool.amount < 0.0 {
                // has_enough_resources above makes this unreachable; a
                // negative stock here is a programmer error, not a clamp.
                return Err(GameError::StockInvariantViolated {
                    resource: resource.to_string(),
                    amount: pool.amount,
                });
            }
        }
        Ok(())
    }

    /// Stores resources (refunds, loot), silently capped at capacity.
    pub fn store_resources(&mut self, resources: &ResourceGroup) {
        for resource in Resource::ALL {
            let pool = &mut self.pools[resource.index()];
            pool.amount = (pool.amount + resources.get(resource) as f64)
                .min(pool.storage_capacity as f64);
        }
    }

    /// Adds trained or returning units to the garrison.
    pub fn add_troops(&mut self, unit: UnitName, quantity: u32) {
        if let Some(squad) = self.garrison.iter_mut().find(|s| s.unit == unit) {
            squad.quantity += quantity;
        } else {
            self.garrison.push(TroopSquad::new(unit, quantity));
        }
        self.refresh_state();
    }

    /// Removes battle losses from the garrison, saturating at zero.
    pub fn apply_troop_losses(&mut self, losses: &[TroopSquad]) {
        for loss in losses {
            if let Some(squad) = self.garrison.iter_mut().find(|s| s.unit == loss.unit) {
                squad.quantity = squad.quantity.saturating_sub(loss.quantity);
            }
        }
        self.garrison.retain(|s| s.quantity > 0);
        self.refresh_state();
    }

    /// Settles all four resource pools against `now`, then advances
    /// `updated_at`. Returns the per-resource overflow report.
    pub fn settle(&mut self, now: DateTime<Utc>) -> SettlementReport {
        let mut overflows = vec![];
        for pool in self.pools.iter_mut() {
            if let Some(discarded) = pool.settle(now) {
                if pool.amount() == pool.storage_capacity {
                    overflows.push((pool.resource, discarded.floor() as u32));
                }
            }
        }

        if now > self.updated_at {
            self.updated_at = now;
        }

        SettlementReport {
            village_id: self.id,
            settled_at: now,
            overflows,
        }
    }

    /// Recomputes everything derived from building levels and the
    /// garrison: population, pool production rates and storage capacities.
    fn refresh_state(&mut self) {
        self.population = self
            .buildings
            .iter()
            .map(|vb| vb.building.population())
            .sum();

        let upkeep: u32 = self.population + self.garrison.iter().map(|s| s.upkeep()).sum::<u32>();

        for resource in Resource::ALL {
            let mut per_hour: i64 = BASE_PRODUCTION_PER_HOUR as i64;
            let mut capacity = BASE_STORAGE_CAPACITY;

            for vb in self.buildings.iter() {
                let data = vb.building.data();
                if data.produces == Some(resource) {
                    per_hour += vb.building.production_per_hour() as i64;
                }
                if data.stores.contains(&resource) {
                    capacity += vb.building.capacity();
                }
            }

            if resource == Resource::Crop {
                per_hour -= upkeep as i64;
            }

            let pool = &mut self.pools[resource.index()];
            pool.production_rate = per_hour as f64 / 3600.0;
            pool.storage_capacity = capacity;
            pool.amount = pool.amount.min(capacity as f64);
        }
    }
}
