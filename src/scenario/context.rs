//! Campaign-day inputs a scenario is created from

use serde::{Deserialize, Serialize};

use crate::campaign::weather::Weather;
use crate::content::terrain::CampaignTerrain;
use crate::content::units::UnitStats;
use crate::core::error::ContentError;
use crate::core::types::{Nation, Side};

pub const MIN_STRENGTH: u8 = 1;
pub const MAX_STRENGTH: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mission {
    #[default]
    Advance,
    Battle,
    Counterattack,
    HillDefence,
    FightingWithdrawal,
    Patrol,
}

impl Mission {
    pub fn name(&self) -> &'static str {
        match self {
            Mission::Advance => "Advance",
            Mission::Battle => "Battle",
            Mission::Counterattack => "Counterattack",
            Mission::HillDefence => "Hill Defence",
            Mission::FightingWithdrawal => "Fighting Withdrawal",
            Mission::Patrol => "Patrol",
        }
    }

    /// Victory point multiplier
    pub fn vp_multiplier(&self) -> f32 {
        match self {
            Mission::Advance | Mission::Battle => 1.0,
            Mission::Counterattack => 1.25,
            Mission::HillDefence | Mission::FightingWithdrawal => 1.5,
            Mission::Patrol => 0.75,
        }
    }

    /// Base chance that the enemy opens the scenario with an ambush
    pub fn ambush_base(&self) -> f32 {
        match self {
            Mission::Advance => 40.0,
            Mission::Battle => 10.0,
            Mission::Counterattack => 10.0,
            Mission::HillDefence => 0.0,
            Mission::FightingWithdrawal => 30.0,
            Mission::Patrol => 50.0,
        }
    }
}

/// The campaign-day map hex the battle is fought in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHex {
    pub terrain: CampaignTerrain,
    /// Enemy strength 1..=10
    pub strength: u8,
    pub known: bool,
    pub control: Side,
}

impl Default for DayHex {
    fn default() -> Self {
        Self {
            terrain: CampaignTerrain::Flat,
            strength: 3,
            known: false,
            control: Side::Enemy,
        }
    }
}

/// Support levels, each a 0..=100 chance of the support arriving
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Support {
    pub air: f32,
    pub artillery: f32,
}

/// Time of day on the scenario clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Clock {
    pub hour: u8,
    pub minute: u8,
}

impl Default for Clock {
    fn default() -> Self {
        Self { hour: 8, minute: 0 }
    }
}

impl Clock {
    pub fn new(hour: u8, minute: u8) -> Self {
        Self {
            hour: hour % 24,
            minute: minute % 60,
        }
    }

    pub fn advance(&mut self, minutes: u32) {
        let total = self.hour as u32 * 60 + self.minute as u32 + minutes;
        self.hour = ((total / 60) % 24) as u8;
        self.minute = (total % 60) as u8;
    }

    pub fn label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioContext {
    pub day_hex: DayHex,
    pub weather: Weather,
    pub support: Support,
    pub mission: Mission,
    pub enemy_nation: Nation,
    /// Copies of the player's unit fighting alongside it
    pub squad_size: u32,
    /// Weighted templates the enemy spawns from
    pub roster: Vec<UnitStats>,
    pub start: Clock,
}

impl ScenarioContext {
    pub fn new(day_hex: DayHex, enemy_nation: Nation, roster: Vec<UnitStats>) -> Self {
        Self {
            day_hex,
            weather: Weather::clear(),
            support: Support::default(),
            mission: Mission::default(),
            enemy_nation,
            squad_size: 0,
            roster,
            start: Clock::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ContentError> {
        if !(MIN_STRENGTH..=MAX_STRENGTH).contains(&self.day_hex.strength) {
            return Err(ContentError::Invalid(format!(
                "enemy strength {} outside {}-{}",
                self.day_hex.strength, MIN_STRENGTH, MAX_STRENGTH
            )));
        }
        if !self.roster.iter().any(|u| u.weight > 0.0) {
            return Err(ContentError::Invalid("enemy roster is empty".into()));
        }
        Ok(())
    }
}
