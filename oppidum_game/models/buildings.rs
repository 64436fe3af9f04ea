use serde::{Deserialize, Serialize};

use oppidum_types::buildings::{BuildingData, BuildingName, get_building_data};
use oppidum_types::common::ResourceGroup;
use oppidum_types::errors::GameError;

/// A building instance in a village: a kind plus its current level.
/// All per-level stats come from the static catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub name: BuildingName,
    pub level: u8,
}

impl Building {
    pub fn new(name: BuildingName) -> Self {
        Self { name, level: 1 }
    }

    pub fn data(&self) -> &'static BuildingData {
        get_building_data(&self.name)
    }

    /// Returns a copy of this building at the given level.
    pub fn at_level(&self, level: u8) -> Result<Self, GameError> {
        let data = self.data();
        if level > data.max_level {
            return Err(GameError::BuildingMaxLevelReached);
        }
        Ok(Self {
            name: self.name,
            level,
        })
    }

    /// Cost to build or upgrade *to* the given level.
    pub fn cost_at(name: &BuildingName, target_level: u8) -> ResourceGroup {
        let data = get_building_data(name);
        let factor = data.cost_multiplier.powi(target_level.saturating_sub(1) as i32);
        data.base_cost * factor
    }

    /// Construction time in seconds for the given target level, already
    /// divided by the server speed. Frozen into the queue entry at enqueue.
    pub fn build_time_secs(name: &BuildingName, target_level: u8, server_speed: i8) -> u32 {
        let data = get_building_data(name);
        let factor = data.time_multiplier.powi(target_level.saturating_sub(1) as i32);
        let secs = (data.base_build_secs as f64 * factor / server_speed as f64).floor();
        (secs as u32).max(1)
    }

    pub fn population(&self) -> u32 {
        self.level as u32 * self.data().population_per_level
    }

    /// Production contributed to the building's resource, in units per hour.
    pub fn production_per_hour(&self) -> u32 {
        self.level as u32 * self.data().production_per_level
    }

    /// Storage capacity contributed to each pool listed in the catalog.
    pub fn capacity(&self) -> u32 {
        self.level as u32 * self.data().capacity_per_level
    }

    /// Defender power fraction contributed by this building.
    pub fn defense_bonus(&self) -> f64 {
        self.level as f64 * self.data().defense_bonus_per_level
    }

    /// Training time factor for units trained in this building, floored at
    /// 10% of the nominal time.
    pub fn training_time_factor(&self) -> f64 {
        (1.0 - self.level as f64 * self.data().training_bonus_per_level).max(0.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_grows_geometrically() {
        let l1 = Building::cost_at(&BuildingName::Woodcutter, 1);
        let l2 = Building::cost_at(&BuildingName::Woodcutter, 2);
        let data = get_building_data(&BuildingName::Woodcutter);

        assert_eq!(l1, data.base_cost);
        assert_eq!(l2, data.base_cost * data.cost_multiplier);
        assert!(l2.total() > l1.total());
    }

    #[test]
    fn test_build_time_scales_with_server_speed() {
        let slow = Building::build_time_secs(&BuildingName::Warehouse, 3, 1);
        let fast = Building::build_time_secs(&BuildingName::Warehouse, 3, 2);
        assert_eq!(fast, slow / 2);
    }

    #[test]
    fn test_at_level_rejects_over_max() {
        let b = Building::new(BuildingName::Granary);
        let max = b.data().max_level;
        assert!(b.at_level(max).is_ok());
        assert!(matches!(
            b.at_level(max + 1),
            Err(GameError::BuildingMaxLevelReached)
        ));
    }

    #[test]
    fn test_training_time_factor_floor() {
        let barracks = Building {
            name: BuildingName::Barracks,
            level: 20,
        };
        // 20 levels at 5% each would zero the time; the floor holds at 10%.
        assert_eq!(barracks.training_time_factor(), 0.1);

        let level_five = Building {
            name: BuildingName::Barracks,
            level: 5,
        };
        assert!((level_five.training_time_factor() - 0.75).abs() < 1e-9);
    }
}
