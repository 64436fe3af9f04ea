use serde::{Deserialize, Serialize};
use std::fmt;

/// The four resource kinds a village produces and stores.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resource {
    Wood,
    Clay,
    Iron,
    Crop,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Wood,
        Resource::Clay,
        Resource::Iron,
        Resource::Crop,
    ];

    pub fn index(&self) -> usize {
        match self {
            Resource::Wood => 0,
            Resource::Clay => 1,
            Resource::Iron => 2,
            Resource::Crop => 3,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Wood => "Wood",
            Resource::Clay => "Clay",
            Resource::Iron => "Iron",
            Resource::Crop => "Crop",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroup(pub u32, pub u32, pub u32, pub u32);

impl ResourceGroup {
    pub const fn new(wood: u32, clay: u32, iron: u32, crop: u32) -> Self {
        Self(wood, clay, iron, crop)
    }

    pub fn total(&self) -> u32 {
        self.0 + self.1 + self.2 + self.3
    }

    pub fn wood(&self) -> u32 {
        self.0
    }
    pub fn clay(&self) -> u32 {
        self.1
    }
    pub fn iron(&self) -> u32 {
        self.2
    }
    pub fn crop(&self) -> u32 {
        self.3
    }

    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.0,
            Resource::Clay => self.1,
            Resource::Iron => self.2,
            Resource::Crop => self.3,
        }
    }
}

impl core::ops::Mul<f64> for ResourceGroup {
    type Output = ResourceGroup;

    fn mul(self, rhs: f64) -> Self::Output {
        let wood = (self.0 as f64 * rhs).floor() as u32;
        let clay = (self.1 as f64 * rhs).floor() as u32;
        let iron = (self.2 as f64 * rhs).floor() as u32;
        let crop = (self.3 as f64 * rhs).floor() as u32;
        ResourceGroup(wood, clay, iron, crop)
    }
}

impl core::ops::Add for ResourceGroup {
    type Output = ResourceGroup;

    fn add(self, rhs: Self) -> Self::Output {
        ResourceGroup(
            self.0 + rhs.0,
            self.1 + rhs.1,
            self.2 + rhs.2,
            self.3 + rhs.3,
        )
    }
}

/// Map coordinates of a village.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_group_total() {
        let rg = ResourceGroup::new(100, 200, 300, 400);
        assert_eq!(rg.total(), 1000);

        let rg_zero = ResourceGroup::new(0, 0, 0, 0);
        assert_eq!(rg_zero.total(), 0);
    }

    #[test]
    fn test_resource_group_mul_floors() {
        let rg = ResourceGroup::new(101, 0, 3, 999) * 0.5;
        assert_eq!(rg, ResourceGroup::new(50, 0, 1, 499));
    }
}
