//! Rate of fire: the chance a weapon may fire again straight away

use crate::content::skills::Skill;
use crate::content::units::AmmoType;
use crate::content::tables::clamp_chance;
use crate::core::config::EngineConfig;
use crate::core::dice::Dice;
use crate::crew::position::PositionKind;
use crate::unit::Unit;

/// Fast Hands bonus to maintaining rate of fire
pub const FAST_HANDS_BONUS: f32 = 5.0;

/// Chance to maintain rate of fire after a shot of `ammo`, 0 for none
pub fn rof_chance(unit: &Unit, weapon_index: usize, ammo: Option<AmmoType>, config: &EngineConfig) -> f32 {
    let Some(weapon) = unit.weapons.get(weapon_index) else {
        return 0.0;
    };
    if weapon.stats.rof <= 0.0 {
        return 0.0;
    }
    if weapon.stats.loaded && !unit.loader_ready() {
        return 0.0;
    }

    let mut chance = weapon.stats.rof;
    if weapon.uses_ammo() {
        let Some(ammo) = ammo else {
            return 0.0;
        };
        if weapon.ammo.count(ammo) == 0 {
            return 0.0;
        }
        let from_rack = weapon.draws_from_ready_rack(ammo);
        if !from_rack
            && config.halve_rof_off_ready_rack
            && !unit.crew_skill(PositionKind::Loader, Skill::ShellJuggler)
        {
            chance /= 2.0;
        }
    }
    if unit.crew_skill(PositionKind::Loader, Skill::FastHands) {
        chance += FAST_HANDS_BONUS;
    }
    clamp_chance(chance)
}

/// Roll to maintain rate of fire; on success the weapon may fire again
pub fn roll_rate_of_fire(
    unit: &mut Unit,
    weapon_index: usize,
    ammo: Option<AmmoType>,
    config: &EngineConfig,
    dice: &mut dyn Dice,
) -> bool {
    let chance = rof_chance(unit, weapon_index, ammo, config);
    if chance <= 0.0 || !dice.chance(chance) {
        return false;
    }
    if let Some(weapon) = unit.weapons.get_mut(weapon_index) {
        weapon.fired = false;
        weapon.maintained_rof = true;
    }
    true
}
