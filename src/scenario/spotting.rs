//! Spotting phase: the player's crew looks for hidden enemy units

use tracing::debug;

use super::events::SoundEvent;
use super::state::{Scenario, PLAYER};
use crate::campaign::weather::Weather;
use crate::combat::point_fire::combined_smoke;
use crate::content::skills::Skill;
use crate::content::tables::{
    clamp_chance, spot_base, SPOT_INFANTRY_FACTOR, SPOT_PERCEPTION_STEP, SPOT_SMOKE_PER_LEVEL,
    SPOT_TARGET_FIRED, SPOT_TARGET_MOVING,
};
use crate::content::units::UnitCategory;
use crate::core::dice::Dice;
use crate::core::types::Mount;
use crate::crew::personnel::Personnel;
use crate::unit::Unit;

const PRECIPITATION_SPOT_STEP: f32 = -10.0;
const SKILL_SPOT_BONUS: f32 = 5.0;
/// Perception of an average crewman
const BASELINE_PERCEPTION: f32 = 5.0;

/// Chance that `crewman` in `spotter` spots `target`
pub fn spot_chance(spotter: &Unit, crewman: &Personnel, commander: bool, target: &Unit, weather: &Weather) -> f32 {
    // a unit that has drawn fire is already known
    if target.hit_by_fp {
        return 100.0;
    }
    let distance = spotter.hex.distance(&target.hex);
    let mut chance = spot_base(distance);
    chance += target.stats.size.spotting_modifier();
    chance += PRECIPITATION_SPOT_STEP * weather.precipitation.intensity() as f32;
    chance += SPOT_SMOKE_PER_LEVEL * combined_smoke(spotter, target) as f32;
    if target.moving {
        chance += SPOT_TARGET_MOVING;
    }
    if target.fired {
        chance += SPOT_TARGET_FIRED;
    }
    chance += target.terrain.effects().spotting;
    chance += (crewman.stats.perception as f32 - BASELINE_PERCEPTION) * SPOT_PERCEPTION_STEP;
    if commander && crewman.has_skill(Skill::EagleEye) {
        chance += SKILL_SPOT_BONUS;
    }
    if crewman.has_skill(Skill::Observant) {
        chance += SKILL_SPOT_BONUS;
    }
    if spotter.category() == UnitCategory::Infantry {
        chance *= SPOT_INFANTRY_FACTOR;
    }
    clamp_chance(chance)
}

impl Scenario {
    /// Each fit crewman of the player's unit checks the unspotted
    /// enemies in their field of view
    pub fn run_spotting(&mut self, dice: &mut dyn Dice) {
        let player = &self.units[PLAYER];
        let mut spotted = Vec::new();

        for position in player.positions.iter().filter(|p| p.can_act()) {
            let Some(crewman) = position.crewman.as_ref() else {
                continue;
            };
            let facing = match position.location {
                Mount::Turret => player.turret_facing.or(player.hull_facing),
                Mount::Hull => player.hull_facing,
            }
            .unwrap_or(0);
            let visible = position.visible_hexes(player.hex, facing);

            for (i, target) in self.units.iter().enumerate() {
                if !target.alive
                    || target.spotted
                    || !target.is_hostile_to(player)
                    || spotted.contains(&i)
                    || !visible.contains(&target.hex)
                {
                    continue;
                }
                let chance = spot_chance(player, crewman, position.kind.is_commander(), target, &self.weather);
                let roll = dice.percentile();
                debug!(crewman = %crewman.name, target = %target.stats.name, chance, roll, "spot check");
                if roll <= chance {
                    spotted.push(i);
                }
            }
        }

        for i in spotted {
            let unit = &mut self.units[i];
            unit.spotted = true;
            let (id, name) = (unit.id, unit.stats.name.clone());
            self.notifications.message(format!("{} spotted", name), Some(id));
            self.notifications.sound(Some(id), SoundEvent::Spotted);
        }
    }
}
