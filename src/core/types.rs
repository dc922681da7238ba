//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for units in a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub Uuid);

impl UnitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UnitId {
    fn default() -> Self {
        Self::new()
    }
}

/// Owning side of a unit (player = 0, enemy = 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Player,
    Enemy,
}

impl Side {
    pub fn index(&self) -> u8 {
        match self {
            Side::Player => 0,
            Side::Enemy => 1,
        }
    }

    pub fn opponent(&self) -> Self {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

/// Nationality of a unit or crewman
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Nation {
    #[default]
    Germany,
    Poland,
    SovietUnion,
    France,
}

impl Nation {
    pub fn name(&self) -> &'static str {
        match self {
            Nation::Germany => "Germany",
            Nation::Poland => "Poland",
            Nation::SovietUnion => "Soviet Union",
            Nation::France => "France",
        }
    }
}

/// Where a weapon or crew position sits on the unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mount {
    #[default]
    Hull,
    Turret,
}

/// Round a chance to one decimal place
pub fn round_chance(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
