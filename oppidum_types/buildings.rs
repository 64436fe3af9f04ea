use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::{Resource, ResourceGroup};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum BuildingGroup {
    Resources,
    Infrastructure,
    Military,
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum BuildingName {
    Woodcutter,
    ClayPit,
    IronMine,
    Cropland,
    Warehouse,
    Granary,
    MainBuilding,
    Barracks,
    Stable,
    Wall,
    Wonder,
}

impl fmt::Display for BuildingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildingName::Woodcutter => "Woodcutter",
            BuildingName::ClayPit => "Clay Pit",
            BuildingName::IronMine => "Iron Mine",
            BuildingName::Cropland => "Cropland",
            BuildingName::Warehouse => "Warehouse",
            BuildingName::Granary => "Granary",
            BuildingName::MainBuilding => "Main Building",
            BuildingName::Barracks => "Barracks",
            BuildingName::Stable => "Stable",
            BuildingName::Wall => "Wall",
            BuildingName::Wonder => "Wonder",
        };
        f.write_str(name)
    }
}

/// Static stats for a building kind. Per-level values grow linearly
/// (production, capacity, defense, population) or geometrically
/// (cost, construction time).
#[derive(Debug, Clone)]
pub struct BuildingData {
    pub name: BuildingName,
    pub group: BuildingGroup,
    pub max_level: u8,
    pub base_cost: ResourceGroup,
    pub cost_multiplier: f64,
    pub base_build_secs: u32,
    pub time_multiplier: f64,
    pub population_per_level: u32,
    /// Resource kind produced, if this is a production building.
    pub produces: Option<Resource>,
    /// Units per hour added per level.
    pub production_per_level: u32,
    /// Storage capacity added per level, applied to the pools listed in
    /// `stores`.
    pub capacity_per_level: u32,
    pub stores: &'static [Resource],
    /// Defender power fraction added per level (0.04 = +4%).
    pub defense_bonus_per_level: f64,
    /// Training time reduction fraction per level for units trained here.
    pub training_bonus_per_level: f64,
}

static WOODCUTTER: BuildingData = BuildingData {
    name: BuildingName::Woodcutter,
    group: BuildingGroup::Resources,
    max_level: 20,
    base_cost: ResourceGroup::new(40, 100, 50, 60),
    cost_multiplier: 1.28,
    base_build_secs: 260,
    time_multiplier: 1.22,
    population_per_level: 1,
    produces: Some(Resource::Wood),
    production_per_level: 30,
    capacity_per_level: 0,
    stores: &[],
    defense_bonus_per_level: 0.0,
    training_bonus_per_level: 0.0,
};

static CLAY_PIT: BuildingData = BuildingData {
    name: BuildingName::ClayPit,
    group: BuildingGroup::Resources,
    max_level: 20,
    base_cost: ResourceGroup::new(80, 40, 80, 50),
    cost_multiplier: 1.28,
    base_build_secs: 220,
    time_multiplier: 1.22,
    population_per_level: 1,
    produces: Some(Resource::Clay),
    production_per_level: 30,
    capacity_per_level: 0,
    stores: &[],
    defense_bonus_per_level: 0.0,
    training_bonus_per_level: 0.0,
};

static IRON_MINE: BuildingData = BuildingData {
    name: BuildingName::IronMine,
    group: BuildingGroup::Resources,
    max_level: 20,
    base_cost: ResourceGroup::new(100, 80, 30, 60),
    cost_multiplier: 1.28,
    base_build_secs: 450,
    time_multiplier: 1.22,
    population_per_level: 2,
    produces: Some(Resource::Iron),
    production_per_level: 30,
    capacity_per_level: 0,
    stores: &[],
    defense_bonus_per_level: 0.0,
    training_bonus_per_level: 0.0,
};

static CROPLAND: BuildingData = BuildingData {
    name: BuildingName::Cropland,
    group: BuildingGroup::Resources,
    max_level: 20,
    base_cost: ResourceGroup::new(70, 90, 70, 20),
    cost_multiplier: 1.28,
    base_build_secs: 150,
    time_multiplier: 1.22,
    population_per_level: 0,
    produces: Some(Resource::Crop),
    production_per_level: 30,
    capacity_per_level: 0,
    stores: &[],
    defense_bonus_per_level: 0.0,
    training_bonus_per_level: 0.0,
};

static WAREHOUSE: BuildingData = BuildingData {
    name: BuildingName::Warehouse,
    group: BuildingGroup::Infrastructure,
    max_level: 20,
    base_cost: ResourceGroup::new(130, 160, 90, 40),
    cost_multiplier: 1.28,
    base_build_secs: 2000,
    time_multiplier: 1.16,
    population_per_level: 1,
    produces: None,
    production_per_level: 0,
    capacity_per_level: 1200,
    stores: &[Resource::Wood, Resource::Clay, Resource::Iron],
    defense_bonus_per_level: 0.0,
    training_bonus_per_level: 0.0,
};

static GRANARY: BuildingData = BuildingData {
    name: BuildingName::Granary,
    group: BuildingGroup::Infrastructure,
    max_level: 20,
    base_cost: ResourceGroup::new(80, 100, 70, 20),
    cost_multiplier: 1.28,
    base_build_secs: 1600,
    time_multiplier: 1.16,
    population_per_level: 1,
    produces: None,
    production_per_level: 0,
    capacity_per_level: 1200,
    stores: &[Resource::Crop],
    defense_bonus_per_level: 0.0,
    training_bonus_per_level: 0.0,
};

static MAIN_BUILDING: BuildingData = BuildingData {
    name: BuildingName::MainBuilding,
    group: BuildingGroup::Infrastructure,
    max_level: 20,
    base_cost: ResourceGroup::new(70, 40, 60, 20),
    cost_multiplier: 1.28,
    base_build_secs: 2620,
    time_multiplier: 1.16,
    population_per_level: 2,
    produces: None,
    production_per_level: 0,
    capacity_per_level: 0,
    stores: &[],
    defense_bonus_per_level: 0.0,
    training_bonus_per_level: 0.0,
};

static BARRACKS: BuildingData = BuildingData {
    name: BuildingName::Barracks,
    group: BuildingGroup::Military,
    max_level: 20,
    base_cost: ResourceGroup::new(210, 140, 260, 120),
    cost_multiplier: 1.28,
    base_build_secs: 2000,
    time_multiplier: 1.16,
    population_per_level: 4,
    produces: None,
    production_per_level: 0,
    capacity_per_level: 0,
    stores: &[],
    defense_bonus_per_level: 0.0,
    training_bonus_per_level: 0.05,
};

static STABLE: BuildingData = BuildingData {
    name: BuildingName::Stable,
    group: BuildingGroup::Military,
    max_level: 20,
    base_cost: ResourceGroup::new(260, 140, 220, 100),
    cost_multiplier: 1.28,
    base_build_secs: 2200,
    time_multiplier: 1.16,
    population_per_level: 5,
    produces: None,
    production_per_level: 0,
    capacity_per_level: 0,
    stores: &[],
    defense_bonus_per_level: 0.0,
    training_bonus_per_level: 0.05,
};

static WALL: BuildingData = BuildingData {
    name: BuildingName::Wall,
    group: BuildingGroup::Military,
    max_level: 20,
    base_cost: ResourceGroup::new(70, 90, 170, 70),
    cost_multiplier: 1.28,
    base_build_secs: 3875,
    time_multiplier: 1.16,
    population_per_level: 0,
    produces: None,
    production_per_level: 0,
    capacity_per_level: 0,
    stores: &[],
    defense_bonus_per_level: 0.04,
    training_bonus_per_level: 0.0,
};

static WONDER: BuildingData = BuildingData {
    name: BuildingName::Wonder,
    group: BuildingGroup::Infrastructure,
    max_level: 100,
    base_cost: ResourceGroup::new(66700, 69050, 72200, 13200),
    cost_multiplier: 1.0275,
    base_build_secs: 18000,
    time_multiplier: 1.02,
    population_per_level: 1,
    produces: None,
    production_per_level: 0,
    capacity_per_level: 0,
    stores: &[],
    defense_bonus_per_level: 0.0,
    training_bonus_per_level: 0.0,
};

pub fn get_building_data(name: &BuildingName) -> &'static BuildingData {
    match name {
        BuildingName::Woodcutter => &WOODCUTTER,
        BuildingName::ClayPit => &CLAY_PIT,
        BuildingName::IronMine => &IRON_MINE,
        BuildingName::Cropland => &CROPLAND,
        BuildingName::Warehouse => &WAREHOUSE,
        BuildingName::Granary => &GRANARY,
        BuildingName::MainBuilding => &MAIN_BUILDING,
        BuildingName::Barracks => &BARRACKS,
        BuildingName::Stable => &STABLE,
        BuildingName::Wall => &WALL,
        BuildingName::Wonder => &WONDER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_resource_has_a_producer() {
        for resource in Resource::ALL {
            let found = [
                &WOODCUTTER,
                &CLAY_PIT,
                &IRON_MINE,
                &CROPLAND,
            ]
            .iter()
            .any(|d| d.produces == Some(resource));
            assert!(found, "no producer for {resource}");
        }
    }

    #[test]
    fn test_wall_is_the_only_defensive_building() {
        for name in [
            BuildingName::Woodcutter,
            BuildingName::Warehouse,
            BuildingName::Barracks,
            BuildingName::MainBuilding,
        ] {
            assert_eq!(get_building_data(&name).defense_bonus_per_level, 0.0);
        }
        assert!(get_building_data(&BuildingName::Wall).defense_bonus_per_level > 0.0);
    }
}
