use serde::{Deserialize, Serialize};
use std::fmt;

use crate::buildings::BuildingName;
use crate::common::ResourceGroup;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitName {
    Spearman,
    Swordsman,
    Archer,
    LightCavalry,
    HeavyCavalry,
    Scout,
}

impl UnitName {
    pub const ALL: [UnitName; 6] = [
        UnitName::Spearman,
        UnitName::Swordsman,
        UnitName::Archer,
        UnitName::LightCavalry,
        UnitName::HeavyCavalry,
        UnitName::Scout,
    ];
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitName::Spearman => "Spearman",
            UnitName::Swordsman => "Swordsman",
            UnitName::Archer => "Archer",
            UnitName::LightCavalry => "Light Cavalry",
            UnitName::HeavyCavalry => "Heavy Cavalry",
            UnitName::Scout => "Scout",
        };
        f.write_str(name)
    }
}

/// Static combat and training stats for a unit kind.
///
/// Defense is split into infantry and cavalry values; combat currently sums
/// both regardless of the attacking force's makeup. The split is kept in the
/// data so a future combat-type differentiation does not need a schema
/// change.
#[derive(Debug, Clone)]
pub struct Unit {
    pub name: UnitName,
    pub attack: u32,
    pub defense_infantry: u32,
    pub defense_cavalry: u32,
    pub upkeep: u32,
    pub cost: ResourceGroup,
    pub training_time_secs: u32,
    pub trained_at: BuildingName,
}

static SPEARMAN: Unit = Unit {
    name: UnitName::Spearman,
    attack: 10,
    defense_infantry: 35,
    defense_cavalry: 50,
    upkeep: 1,
    cost: ResourceGroup::new(120, 100, 150, 30),
    training_time_secs: 1040,
    trained_at: BuildingName::Barracks,
};

static SWORDSMAN: Unit = Unit {
    name: UnitName::Swordsman,
    attack: 65,
    defense_infantry: 35,
    defense_cavalry: 20,
    upkeep: 1,
    cost: ResourceGroup::new(150, 160, 210, 40),
    training_time_secs: 1450,
    trained_at: BuildingName::Barracks,
};

static ARCHER: Unit = Unit {
    name: UnitName::Archer,
    attack: 50,
    defense_infantry: 40,
    defense_cavalry: 30,
    upkeep: 1,
    cost: ResourceGroup::new(170, 150, 20, 40),
    training_time_secs: 1300,
    trained_at: BuildingName::Barracks,
};

static LIGHT_CAVALRY: Unit = Unit {
    name: UnitName::LightCavalry,
    attack: 90,
    defense_infantry: 25,
    defense_cavalry: 40,
    upkeep: 2,
    cost: ResourceGroup::new(350, 450, 230, 60),
    training_time_secs: 2480,
    trained_at: BuildingName::Stable,
};

static HEAVY_CAVALRY: Unit = Unit {
    name: UnitName::HeavyCavalry,
    attack: 140,
    defense_infantry: 60,
    defense_cavalry: 80,
    upkeep: 3,
    cost: ResourceGroup::new(550, 640, 800, 180),
    training_time_secs: 3900,
    trained_at: BuildingName::Stable,
};

static SCOUT: Unit = Unit {
    name: UnitName::Scout,
    attack: 0,
    defense_infantry: 10,
    defense_cavalry: 5,
    upkeep: 1,
    cost: ResourceGroup::new(170, 150, 20, 40),
    training_time_secs: 900,
    trained_at: BuildingName::Stable,
};

pub fn get_unit_data(name: &UnitName) -> &'static Unit {
    match name {
        UnitName::Spearman => &SPEARMAN,
        UnitName::Swordsman => &SWORDSMAN,
        UnitName::Archer => &ARCHER,
        UnitName::LightCavalry => &LIGHT_CAVALRY,
        UnitName::HeavyCavalry => &HEAVY_CAVALRY,
        UnitName::Scout => &SCOUT,
    }
}

/// A homogeneous group of units, the unit of account for garrisons,
/// attacking forces and battle losses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TroopSquad {
    pub unit: UnitName,
    pub quantity: u32,
}

impl TroopSquad {
    pub fn new(unit: UnitName, quantity: u32) -> Self {
        Self { unit, quantity }
    }

    pub fn upkeep(&self) -> u32 {
        self.quantity * get_unit_data(&self.unit).upkeep
    }
}
