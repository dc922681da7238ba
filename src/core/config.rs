//! Engine configuration with documented constants
//!
//! Tuning values that are not part of a lookup table live here. Tables
//! that come from content (penetration, terrain effects) are in `content`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};

/// Configuration for a tactical scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === CLOCK ===
    /// Campaign minutes that pass at each Enemy Action -> Command wrap
    pub turn_minutes: u32,

    /// Scenario minutes between weather checks
    ///
    /// Weather rarely changes within one battle; at 30 minutes a typical
    /// 10-turn engagement sees at most one check.
    pub weather_check_minutes: u32,

    // === EVENTS ===
    /// Percentile chance of a random event at each turn wrap
    pub random_event_chance: f32,

    /// Percentile chance that a smoked hex edge loses one level per turn
    pub smoke_dispersal_chance: f32,

    /// Added to the dispersal chance while it rains or snows
    pub smoke_dispersal_precip_bonus: f32,

    // === SPAWNING ===
    /// Upper bound on enemy units spawned at scenario start
    pub max_enemy_units: u32,

    /// Ambush chance bonus in forest and village hexes
    pub ambush_cover_bonus: f32,

    // === COMBAT ===
    /// Halve rate of fire when a gun is not drawing from its ready rack
    pub halve_rof_off_ready_rack: bool,

    // === AI ===
    /// Extra shots an AI unit may take in one activation by maintaining
    /// rate of fire
    pub ai_max_follow_up_shots: u32,

    /// Scored attack options at or below this value are discarded
    pub ai_min_attack_score: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            turn_minutes: 2,
            weather_check_minutes: 30,
            random_event_chance: 10.0,
            smoke_dispersal_chance: 25.0,
            smoke_dispersal_precip_bonus: 10.0,
            max_enemy_units: 6,
            ambush_cover_bonus: 10.0,
            halve_rof_off_ready_rack: true,
            ai_max_follow_up_shots: 3,
            ai_min_attack_score: 3.0,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate().map_err(EngineError::Config)?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.turn_minutes == 0 {
            return Err("turn_minutes must be positive".into());
        }

        if self.weather_check_minutes < self.turn_minutes {
            return Err(format!(
                "weather_check_minutes ({}) should be >= turn_minutes ({})",
                self.weather_check_minutes, self.turn_minutes
            ));
        }

        for (name, value) in [
            ("random_event_chance", self.random_event_chance),
            ("smoke_dispersal_chance", self.smoke_dispersal_chance),
            ("ambush_cover_bonus", self.ambush_cover_bonus),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(format!("{} ({}) must be within 0-100", name, value));
            }
        }

        if self.max_enemy_units == 0 {
            return Err("max_enemy_units must be at least 1".into());
        }

        Ok(())
    }
}
