//! Executing an attack: check, build, spend, roll, apply
//!
//! Profiles are built from shared borrows; the attacker and target are
//! only mutated once the roll is drawn. Armour hits are queued on the
//! target and resolved at the end of the phase.

use tracing::{debug, info};

use super::area_fire::build_area_fire;
use super::armour::{resolve_armour_hit, ArmourOutcome};
use super::check::{check_attack, CheckOptions};
use super::point_fire::{build_point_fire, FireOverrides};
use super::profile::{AttackKind, AttackProfile, AttackResult};
use super::rate_of_fire::roll_rate_of_fire;
use super::roll::do_attack_roll;
use crate::campaign::weather::Weather;
use crate::content::tables::{he_firepower, MG_AP_RANGE};
use crate::content::units::AmmoType;
use crate::core::config::EngineConfig;
use crate::core::dice::Dice;
use crate::core::error::{ContentError, IllegalAction};
use crate::unit::{FirepowerOutcome, Unit};

/// What one attack did
#[derive(Debug, Clone, PartialEq)]
pub struct AttackOutcome {
    pub profile: AttackProfile,
    /// An MG effect on armour at close range that became an armour hit
    pub converted: bool,
    pub rof_maintained: bool,
}

impl AttackOutcome {
    pub fn result(&self) -> Option<AttackResult> {
        self.profile.result
    }
}

/// Mutable access to two distinct units of one slice
pub fn pair_mut(units: &mut [Unit], a: usize, b: usize) -> Option<(&mut Unit, &mut Unit)> {
    if a == b || a >= units.len() || b >= units.len() {
        return None;
    }
    if a < b {
        let (left, right) = units.split_at_mut(b);
        Some((&mut left[a], &mut right[0]))
    } else {
        let (left, right) = units.split_at_mut(a);
        Some((&mut right[0], &mut left[b]))
    }
}

/// Build the to-hit or effect profile for an attack without rolling it
pub fn build_attack_profile(
    attacker: &Unit,
    weapon_index: usize,
    target: &Unit,
    ammo: Option<AmmoType>,
    weather: &Weather,
    overrides: FireOverrides,
) -> Result<AttackProfile, IllegalAction> {
    if attacker.weapon(weapon_index)?.is_point_fire() {
        build_point_fire(attacker, weapon_index, target, ammo, weather, overrides)
    } else {
        build_area_fire(attacker, weapon_index, target, weather)
    }
}

/// Firepower a gun hit delivers to a soft target
pub fn gun_hit_firepower(profile: &AttackProfile) -> u32 {
    let base = match (profile.ammo, profile.weapon.calibre) {
        (Some(AmmoType::He), Some(calibre)) => he_firepower(calibre),
        _ => 1,
    };
    if profile.is_critical() {
        base * 2
    } else {
        base
    }
}

/// Whether an MG effect on armour is treated as an armour hit
fn converts_to_armour_hit(profile: &AttackProfile, target: &Unit) -> bool {
    profile.kind == AttackKind::AreaFire
        && profile.weapon.kind.is_mg()
        && target.is_armoured()
        && profile.distance <= MG_AP_RANGE
        && matches!(
            profile.result,
            Some(AttackResult::FullEffect | AttackResult::CriticalEffect)
        )
}

/// Fire weapon `weapon_index` of `units[attacker]` at `units[target]`
#[allow(clippy::too_many_arguments)]
pub fn execute_attack(
    units: &mut [Unit],
    attacker: usize,
    weapon_index: usize,
    target: usize,
    ammo: Option<AmmoType>,
    weather: &Weather,
    config: &EngineConfig,
    dice: &mut dyn Dice,
) -> Result<AttackOutcome, IllegalAction> {
    let (shooter, victim) = pair_mut(units, attacker, target).ok_or(IllegalAction::FriendlyTarget)?;
    check_attack(shooter, weapon_index, victim, ammo, CheckOptions::default())?;
    let mut profile = build_attack_profile(
        shooter,
        weapon_index,
        victim,
        ammo,
        weather,
        FireOverrides::default(),
    )?;

    // the round is spent before the roll
    let weapon = shooter
        .weapons
        .get_mut(weapon_index)
        .ok_or(IllegalAction::UnknownWeapon(weapon_index))?;
    weapon.expend_round(ammo)?;
    weapon.fired = true;
    shooter.fired = true;

    let hull_down = victim.hull_down_against(shooter.hex);
    let result = do_attack_roll(&mut profile, hull_down, dice);

    let mut converted = false;
    if converts_to_armour_hit(&profile, victim) {
        profile.result = Some(if result == AttackResult::CriticalEffect {
            AttackResult::CriticalHit
        } else {
            AttackResult::Hit
        });
        profile.effective_fp = 0;
        converted = true;
    }

    let landed = profile.result.is_some_and(|r| r.is_hit() || r.has_effect());
    if let Some(result) = profile.result.filter(|r| r.is_hit()) {
        if victim.is_vehicle() {
            debug!(target = %victim.stats.name, result = result.name(), "armour hit queued");
            victim.ap_hits_to_resolve.push(profile.clone());
        } else {
            victim.fp_to_resolve += gun_hit_firepower(&profile);
            victim.hit_by_fp = true;
        }
    } else if profile.effective_fp > 0 {
        victim.fp_to_resolve += profile.effective_fp;
        victim.hit_by_fp = true;
    }

    if landed {
        victim.last_hit_by = Some((shooter.id, weapon_index));
        if let Some(weapon) = shooter.weapons.get_mut(weapon_index) {
            weapon.acquire(victim.id);
        }
    }

    let rof_maintained = roll_rate_of_fire(shooter, weapon_index, ammo, config, dice);
    if rof_maintained {
        debug!(unit = %shooter.stats.name, "rate of fire maintained");
    }

    Ok(AttackOutcome {
        profile,
        converted,
        rof_maintained,
    })
}

/// Everything that happened while resolving one unit's queued damage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub armour: Vec<ArmourOutcome>,
    pub firepower: Option<FirepowerOutcome>,
    /// Hits that could not be resolved for a content gap
    pub content_errors: Vec<ContentError>,
}

/// Resolve the armour hits and firepower queued on `unit`
pub fn resolve_pending(unit: &mut Unit, dice: &mut dyn Dice) -> Resolution {
    let mut resolution = Resolution::default();
    let hits = std::mem::take(&mut unit.ap_hits_to_resolve);
    for hit in &hits {
        if !unit.alive {
            break;
        }
        match resolve_armour_hit(unit, hit, dice) {
            Ok(outcome) => resolution.armour.push(outcome),
            Err(e) => resolution.content_errors.push(e),
        }
    }
    if unit.alive && unit.fp_to_resolve > 0 {
        let outcome = unit.resolve_firepower(dice);
        if outcome.destroyed {
            info!(unit = %unit.stats.name, fp = outcome.fp, "destroyed by firepower");
        }
        resolution.firepower = Some(outcome);
    } else {
        unit.fp_to_resolve = 0;
    }
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::units::Catalogue;
    use crate::core::dice::{FixedDice, SeededDice};
    use crate::core::types::Side;
    use crate::hex::HexCoord;

    fn setup(target_id: &str, target_hex: HexCoord) -> Vec<Unit> {
        let catalogue = Catalogue::builtin().unwrap();
        let mut dice = SeededDice::new(77);
        let tank = Unit::new(catalogue.get("pzkpfw_iii_e").unwrap(), Side::Player, HexCoord::ORIGIN, 0, &mut dice);
        let mut enemy = Unit::new(catalogue.get(target_id).unwrap(), Side::Enemy, target_hex, 3, &mut dice);
        enemy.spotted = true;
        vec![tank, enemy]
    }

    #[test]
    fn test_pair_mut_rejects_same_index() {
        let mut units = setup("t26", HexCoord::new(0, -1));
        assert!(pair_mut(&mut units, 0, 0).is_none());
        let (b, a) = pair_mut(&mut units, 1, 0).unwrap();
        assert_eq!(a.side, Side::Player);
        assert_eq!(b.side, Side::Enemy);
    }

    #[test]
    fn test_gun_hit_on_tank_is_queued() {
        let mut units = setup("t26", HexCoord::new(0, -1));
        let before = units[0].weapons[0].ammo.count(AmmoType::Ap);
        // roll 10 hits; the RoF roll of 10 is also made
        let mut dice = FixedDice::always(10.0);
        let outcome = execute_attack(
            &mut units,
            0,
            0,
            1,
            Some(AmmoType::Ap),
            &Weather::clear(),
            &EngineConfig::default(),
            &mut dice,
        )
        .unwrap();
        assert_eq!(outcome.result(), Some(AttackResult::Hit));
        assert_eq!(units[0].weapons[0].ammo.count(AmmoType::Ap), before - 1);
        assert_eq!(units[1].ap_hits_to_resolve.len(), 1);
        assert_eq!(units[0].weapons[0].acquired_level(units[1].id), Some(0));
        assert!(outcome.rof_maintained);
        assert!(!units[0].weapons[0].fired);
    }

    #[test]
    fn test_hit_into_hull_down_arc_is_blocked() {
        let mut units = setup("t26", HexCoord::new(0, -1));
        // the attacker sits in direction 3 from the target
        units[1].hull_down = vec![2, 3, 4];
        assert!(units[1].hull_down_against(HexCoord::ORIGIN));
        let before = units[0].weapons[0].ammo.count(AmmoType::Ap);
        let mut dice = FixedDice::always(10.0);
        let outcome = execute_attack(
            &mut units,
            0,
            0,
            1,
            Some(AmmoType::Ap),
            &Weather::clear(),
            &EngineConfig::default(),
            &mut dice,
        )
        .unwrap();
        assert_eq!(outcome.result(), Some(AttackResult::BlockedByHullDown));
        assert!(units[1].ap_hits_to_resolve.is_empty());
        assert_eq!(units[1].last_hit_by, None);
        // the round is still spent
        assert_eq!(units[0].weapons[0].ammo.count(AmmoType::Ap), before - 1);
    }

    #[test]
    fn test_fired_weapon_is_rejected() {
        let mut units = setup("t26", HexCoord::new(0, -1));
        units[0].weapons[0].fired = true;
        let mut dice = FixedDice::always(10.0);
        let err = execute_attack(
            &mut units,
            0,
            0,
            1,
            Some(AmmoType::Ap),
            &Weather::clear(),
            &EngineConfig::default(),
            &mut dice,
        )
        .unwrap_err();
        assert_eq!(err, IllegalAction::AlreadyFired);
    }

    #[test]
    fn test_he_on_infantry_delivers_firepower() {
        let mut units = setup("polish_rifle_squad", HexCoord::new(0, -1));
        let mut dice = FixedDice::always(10.0);
        execute_attack(
            &mut units,
            0,
            0,
            1,
            Some(AmmoType::He),
            &Weather::clear(),
            &EngineConfig::default(),
            &mut dice,
        )
        .unwrap();
        assert_eq!(units[1].fp_to_resolve, 2);
        assert!(units[1].hit_by_fp);
        assert!(units[1].ap_hits_to_resolve.is_empty());
    }

    #[test]
    fn test_close_mg_effect_on_armour_converts() {
        let mut units = setup("7tp", HexCoord::new(0, -1));
        // coax at 40%: a roll of 3 is inside the critical tenth
        let mut dice = FixedDice::always(3.0);
        let outcome = execute_attack(
            &mut units,
            0,
            1,
            1,
            None,
            &Weather::clear(),
            &EngineConfig::default(),
            &mut dice,
        )
        .unwrap();
        assert!(outcome.converted);
        assert_eq!(outcome.result(), Some(AttackResult::CriticalHit));
        assert_eq!(units[1].ap_hits_to_resolve.len(), 1);
        assert_eq!(units[1].fp_to_resolve, 0);
    }

    #[test]
    fn test_resolve_pending_clears_queue() {
        let mut units = setup("t26", HexCoord::new(0, -1));
        let mut dice = FixedDice::always(10.0);
        execute_attack(
            &mut units,
            0,
            0,
            1,
            Some(AmmoType::Ap),
            &Weather::clear(),
            &EngineConfig::default(),
            &mut dice,
        )
        .unwrap();
        let resolution = resolve_pending(&mut units[1], &mut dice);
        assert_eq!(resolution.armour.len(), 1);
        assert!(units[1].ap_hits_to_resolve.is_empty());
        assert!(resolution.content_errors.is_empty());
    }
}
