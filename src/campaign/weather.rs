//! Weather state and its transition tables
//!
//! The campaign layer owns the weather; a scenario advances it on its own
//! clock through `Weather::check`. Probabilities are literal tuning data.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::dice::Dice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CloudCover {
    #[default]
    Clear,
    Scattered,
    Heavy,
    Overcast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Precipitation {
    #[default]
    None,
    LightRain,
    Rain,
    HeavyRain,
    LightSnow,
    Snow,
    Blizzard,
}

impl Precipitation {
    /// Intensity 0..=3, shared by rain and snow
    pub fn intensity(&self) -> u8 {
        match self {
            Precipitation::None => 0,
            Precipitation::LightRain | Precipitation::LightSnow => 1,
            Precipitation::Rain | Precipitation::Snow => 2,
            Precipitation::HeavyRain | Precipitation::Blizzard => 3,
        }
    }

    pub fn is_snow(&self) -> bool {
        matches!(
            self,
            Precipitation::LightSnow | Precipitation::Snow | Precipitation::Blizzard
        )
    }

    pub fn is_falling(&self) -> bool {
        *self != Precipitation::None
    }

    fn from_intensity(intensity: u8, snow: bool) -> Self {
        match (intensity, snow) {
            (0, _) => Precipitation::None,
            (1, false) => Precipitation::LightRain,
            (2, false) => Precipitation::Rain,
            (_, false) => Precipitation::HeavyRain,
            (1, true) => Precipitation::LightSnow,
            (2, true) => Precipitation::Snow,
            (_, true) => Precipitation::Blizzard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GroundCondition {
    #[default]
    Dry,
    Wet,
    Muddy,
    Snow,
    DeepSnow,
}

/// Cloud cover transitions: (chance to clear one step, chance to thicken one step)
const CLOUD_TABLE: [(f32, f32); 4] = [
    (0.0, 10.0),  // Clear
    (15.0, 10.0), // Scattered
    (15.0, 10.0), // Heavy
    (15.0, 0.0),  // Overcast
];

/// Precipitation transitions by intensity: (ease, escalate)
///
/// Easing and escalation are not symmetric.
const PRECIPITATION_TABLE: [(f32, f32); 4] = [
    (0.0, 15.0),  // none: start on overcast, a third of this under heavy cloud
    (20.0, 10.0), // light
    (15.0, 10.0), // moderate
    (30.0, 0.0),  // heavy
];

/// Ground transitions under rain: (Dry -> Wet, Wet -> Muddy) by intensity 1..=3
const RAIN_GROUND_TABLE: [(f32, f32); 3] = [(10.0, 5.0), (20.0, 10.0), (40.0, 25.0)];

/// Ground transitions under snow: (-> Snow, Snow -> DeepSnow) by intensity 1..=3
const SNOW_GROUND_TABLE: [(f32, f32); 3] = [(10.0, 5.0), (20.0, 10.0), (40.0, 25.0)];

/// Drying without precipitation: (Muddy -> Wet, Wet -> Dry)
const DRYING: (f32, f32) = (5.0, 10.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Weather {
    pub clouds: CloudCover,
    pub precipitation: Precipitation,
    pub ground: GroundCondition,
    /// Winter days fall as snow instead of rain
    #[serde(default)]
    pub cold: bool,
}

impl Weather {
    pub fn clear() -> Self {
        Self::default()
    }

    pub fn overcast(&self) -> bool {
        self.clouds == CloudCover::Overcast
    }

    /// One weather check; returns true if anything changed
    pub fn check(&mut self, dice: &mut dyn Dice) -> bool {
        let before = *self;

        let (ease, thicken) = CLOUD_TABLE[self.clouds as usize];
        let roll = dice.percentile();
        if roll <= ease {
            self.clouds = match self.clouds {
                CloudCover::Overcast => CloudCover::Heavy,
                CloudCover::Heavy => CloudCover::Scattered,
                _ => CloudCover::Clear,
            };
        } else if roll <= ease + thicken {
            self.clouds = match self.clouds {
                CloudCover::Clear => CloudCover::Scattered,
                CloudCover::Scattered => CloudCover::Heavy,
                _ => CloudCover::Overcast,
            };
        }

        self.update_precipitation(dice);
        self.update_ground(dice);

        if *self != before {
            debug!(?before, after = ?self, "weather changed");
        }
        *self != before
    }

    fn update_precipitation(&mut self, dice: &mut dyn Dice) {
        if matches!(self.clouds, CloudCover::Clear | CloudCover::Scattered) {
            self.precipitation = Precipitation::None;
            return;
        }

        let intensity = self.precipitation.intensity();
        let (ease, mut escalate) = PRECIPITATION_TABLE[intensity as usize];
        if intensity == 0 && self.clouds == CloudCover::Heavy {
            escalate /= 3.0;
        }

        let roll = dice.percentile();
        let new_intensity = if roll <= ease {
            intensity.saturating_sub(1)
        } else if roll <= ease + escalate {
            (intensity + 1).min(3)
        } else {
            intensity
        };
        self.precipitation = Precipitation::from_intensity(new_intensity, self.cold);
    }

    fn update_ground(&mut self, dice: &mut dyn Dice) {
        let intensity = self.precipitation.intensity();
        if intensity == 0 {
            let (mud_to_wet, wet_to_dry) = DRYING;
            self.ground = match self.ground {
                GroundCondition::Muddy if dice.chance(mud_to_wet) => GroundCondition::Wet,
                GroundCondition::Wet if dice.chance(wet_to_dry) => GroundCondition::Dry,
                other => other,
            };
            return;
        }

        let row = (intensity - 1) as usize;
        if self.precipitation.is_snow() {
            let (settle, deepen) = SNOW_GROUND_TABLE[row];
            self.ground = match self.ground {
                GroundCondition::Snow if dice.chance(deepen) => GroundCondition::DeepSnow,
                GroundCondition::Dry | GroundCondition::Wet | GroundCondition::Muddy
                    if dice.chance(settle) =>
                {
                    GroundCondition::Snow
                }
                other => other,
            };
        } else {
            let (wet, mud) = RAIN_GROUND_TABLE[row];
            self.ground = match self.ground {
                GroundCondition::Dry if dice.chance(wet) => GroundCondition::Wet,
                GroundCondition::Wet if dice.chance(mud) => GroundCondition::Muddy,
                other => other,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::FixedDice;

    #[test]
    fn test_high_rolls_leave_weather_alone() {
        let mut weather = Weather {
            clouds: CloudCover::Heavy,
            precipitation: Precipitation::Rain,
            ground: GroundCondition::Wet,
            cold: false,
        };
        let mut dice = FixedDice::always(99.0);
        assert!(!weather.check(&mut dice));
    }

    #[test]
    fn test_clear_skies_stop_precipitation() {
        let mut weather = Weather {
            clouds: CloudCover::Scattered,
            precipitation: Precipitation::LightRain,
            ground: GroundCondition::Dry,
            cold: false,
        };
        // clouds unchanged, ground roll irrelevant
        let mut dice = FixedDice::always(99.0);
        weather.check(&mut dice);
        assert_eq!(weather.precipitation, Precipitation::None);
    }

    #[test]
    fn test_overcast_can_start_snow_when_cold() {
        let mut weather = Weather {
            clouds: CloudCover::Overcast,
            precipitation: Precipitation::None,
            ground: GroundCondition::Dry,
            cold: true,
        };
        // clouds: 50 > 15 keeps overcast; precipitation: 10 <= 15 starts
        let mut dice = FixedDice::scripted([50.0, 10.0], 99.0);
        weather.check(&mut dice);
        assert_eq!(weather.precipitation, Precipitation::LightSnow);
    }

    #[test]
    fn test_heavy_rain_muddies_wet_ground() {
        let mut weather = Weather {
            clouds: CloudCover::Overcast,
            precipitation: Precipitation::HeavyRain,
            ground: GroundCondition::Wet,
            cold: false,
        };
        // clouds stay, rain stays (40 > 30), ground 20 <= 25
        let mut dice = FixedDice::scripted([50.0, 40.0, 20.0], 99.0);
        weather.check(&mut dice);
        assert_eq!(weather.ground, GroundCondition::Muddy);
    }

    #[test]
    fn test_intensity_shared_scale() {
        assert_eq!(Precipitation::Blizzard.intensity(), 3);
        assert_eq!(Precipitation::LightRain.intensity(), 1);
        assert!(Precipitation::Snow.is_snow());
        assert!(!Precipitation::None.is_falling());
    }
}
