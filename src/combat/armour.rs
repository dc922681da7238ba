//! Armour penetration and its effect on the target
//!
//! A missing penetration-table entry is a content defect: the hit is
//! abandoned and the error is returned, never defaulted.

use tracing::{debug, error, info};

use super::profile::{AttackKind, AttackProfile, AttackResult, PenetrationEffect};
use super::roll::do_attack_roll;
use crate::content::tables::{
    ap_base_penetration, ap_range_modifier, he_base_penetration, APCR_CLOSE_BONUS,
    ARMOUR_POINT, ARMOUR_POINT_CRITICAL, AT_RIFLE_PENETRATION_BASE, HULL_HIT_CHANCE,
    MG_PENETRATION_BASE, OUTCOME_CRITICAL_BONUS, OUTCOME_IMMOBILIZED_BELOW, OUTCOME_MINOR_BELOW,
    OUTCOME_SPALLING_BELOW, REAR_FACING_BONUS, SPALLING_WOUND_FP, SPALLING_WOUND_MODIFIER,
    UNARMOURED_AP_MALUS, UNARMOURED_HE_BONUS,
};
use crate::content::units::{AmmoType, Facing, WeaponKind};
use crate::core::dice::Dice;
use crate::core::error::ContentError;
use crate::core::types::{Mount, Side};
use crate::crew::personnel::WoundResult;
use crate::hex::{bearing, steps_between, HexCoord};
use crate::unit::Unit;

/// Facing struck, from the shot's direction relative to the struck mount
pub fn facing_from(relative: u8) -> Facing {
    match relative % 6 {
        0 => Facing::Front,
        3 => Facing::Rear,
        _ => Facing::Side,
    }
}

/// Roll hull or turret; unturreted units are always hit on the hull
pub fn roll_location(target: &Unit, dice: &mut dyn Dice) -> Mount {
    if target.has_turret() && !dice.chance(HULL_HIT_CHANCE) {
        Mount::Turret
    } else {
        Mount::Hull
    }
}

/// Facing struck on `location` by a shot from `attacker_hex`
pub fn roll_facing(target: &Unit, location: Mount, attacker_hex: HexCoord, dice: &mut dyn Dice) -> Facing {
    let reference = match location {
        Mount::Turret => target.turret_facing.or(target.hull_facing),
        Mount::Hull => target.hull_facing,
    };
    let Some(reference) = reference else {
        return Facing::Front;
    };
    let incoming = match bearing(target.hex, attacker_hex) {
        Some(d) => d,
        None => dice.range(0, 5) as u8,
    };
    facing_from(steps_between(reference, incoming))
}

/// Base penetration and range adjustment for the hitting round
fn base_penetration(hit: &AttackProfile) -> Result<(f32, f32), ContentError> {
    let weapon = &hit.weapon;
    match weapon.kind {
        WeaponKind::AtRifle => Ok((AT_RIFLE_PENETRATION_BASE, 0.0)),
        WeaponKind::Gun => {
            let calibre = weapon
                .calibre
                .ok_or_else(|| ContentError::MissingCalibre(weapon.name.clone()))?;
            if hit.ammo == Some(AmmoType::He) {
                return Ok((he_base_penetration(calibre), 0.0));
            }
            let key = weapon
                .calibre_key()
                .ok_or_else(|| ContentError::MissingCalibre(weapon.name.clone()))?;
            let base = ap_base_penetration(&key)?;
            Ok((base, ap_range_modifier(calibre, hit.distance)))
        }
        _ => Ok((MG_PENETRATION_BASE, 0.0)),
    }
}

/// Build the penetration profile for a confirmed hit on `target`
pub fn build_armour_profile(hit: &AttackProfile, target: &Unit, dice: &mut dyn Dice) -> Result<AttackProfile, ContentError> {
    let (base, range_modifier) = base_penetration(hit).inspect_err(|e| {
        error!(weapon = %hit.weapon.name, error = %e, "cannot resolve armour hit");
    })?;

    let mut profile = AttackProfile::new(
        AttackKind::Armour,
        hit.attacker,
        &hit.attacker_name,
        hit.attacker_hex,
        hit.weapon_index,
        &hit.weapon,
        hit.target,
        &hit.target_name,
        hit.ammo,
        hit.distance,
        base,
    );
    profile.add("Range", range_modifier);
    if hit.ammo == Some(AmmoType::Apcr) && hit.distance <= 1 {
        profile.add("APCR", APCR_CLOSE_BONUS);
    }

    let location = roll_location(target, dice);
    let facing = roll_facing(target, location, hit.attacker_hex, dice);
    profile.location = Some(location);
    profile.facing = Some(facing);

    match target.stats.armour() {
        None => {
            let value = if hit.ammo == Some(AmmoType::He) {
                UNARMOURED_HE_BONUS
            } else {
                UNARMOURED_AP_MALUS
            };
            profile.add("Unarmoured Target", value);
        }
        Some(armour) => {
            let points = armour.value(location, facing);
            let per_point = if hit.is_critical() {
                ARMOUR_POINT_CRITICAL
            } else {
                ARMOUR_POINT
            };
            profile.add(
                format!("{:?} {:?} Armour {}", location, facing, points),
                per_point * points as f32,
            );
        }
    }
    if facing == Facing::Rear {
        profile.add("Rear Facing", REAR_FACING_BONUS);
    }

    let raw = profile.raw_total();
    if raw <= 0.0 {
        profile.final_chance = 0.0;
    } else if raw >= 100.0 {
        profile.final_chance = 100.0;
    } else {
        profile.finalize();
    }
    Ok(profile)
}

/// Effect band for the modified outcome roll
pub fn penetration_effect(outcome_roll: f32) -> PenetrationEffect {
    if outcome_roll < OUTCOME_MINOR_BELOW {
        PenetrationEffect::Minor
    } else if outcome_roll < OUTCOME_IMMOBILIZED_BELOW {
        PenetrationEffect::Immobilized
    } else if outcome_roll < OUTCOME_SPALLING_BELOW {
        PenetrationEffect::Spalling
    } else {
        PenetrationEffect::Destroyed
    }
}

/// Result of resolving one armour hit
#[derive(Debug, Clone, PartialEq)]
pub struct ArmourOutcome {
    pub profile: AttackProfile,
    pub effect: Option<PenetrationEffect>,
    pub wounds: Vec<(String, WoundResult)>,
    pub abandoned: bool,
}

/// Resolve a queued hit against `target`
pub fn resolve_armour_hit(target: &mut Unit, hit: &AttackProfile, dice: &mut dyn Dice) -> Result<ArmourOutcome, ContentError> {
    let mut profile = build_armour_profile(hit, target, dice)?;
    let critical = hit.is_critical();
    let result = do_attack_roll(&mut profile, false, dice);
    let mut outcome = ArmourOutcome {
        profile,
        effect: None,
        wounds: Vec::new(),
        abandoned: false,
    };
    if result != AttackResult::Penetrated || !target.alive {
        return Ok(outcome);
    }

    let margin = outcome.profile.roll.map_or(0.0, |r| outcome.profile.final_chance - r);
    let bonus = if critical { OUTCOME_CRITICAL_BONUS } else { 0.0 };
    let outcome_roll = dice.percentile() + margin + bonus;
    let mut effect = penetration_effect(outcome_roll);
    debug!(target = %target.stats.name, outcome_roll, effect = effect.name(), "penetration");

    target.last_hit_by = Some((hit.attacker, hit.weapon_index));
    match effect {
        PenetrationEffect::Minor => {}
        PenetrationEffect::Immobilized => {
            target.immobilized = true;
            target.revalidate_commands();
        }
        PenetrationEffect::Spalling if !target.is_crewed() => {
            effect = PenetrationEffect::Destroyed;
        }
        PenetrationEffect::Spalling => {
            let victims = if critical { 2 } else { 1 };
            for _ in 0..victims {
                let alive: Vec<usize> = target
                    .positions
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.crewman.as_ref().is_some_and(|c| c.is_alive()))
                    .map(|(i, _)| i)
                    .collect();
                if alive.is_empty() {
                    break;
                }
                let i = alive[dice.index(alive.len())];
                if let Some(crewman) = target.positions[i].crewman.as_mut() {
                    let wound = crewman.wound_check(SPALLING_WOUND_FP, SPALLING_WOUND_MODIFIER, dice);
                    outcome.wounds.push((crewman.name.clone(), wound));
                }
            }
            target.revalidate_commands();
            if (target.side == Side::Enemy || target.squad_member) && target.crew_incapacitated() {
                outcome.abandoned = true;
                effect = PenetrationEffect::Destroyed;
            }
        }
        PenetrationEffect::Destroyed => {}
    }

    if effect == PenetrationEffect::Destroyed {
        // the crew bail out of the wreck
        if !outcome.abandoned {
            for position in target.positions.iter_mut() {
                if let Some(crewman) = position.crewman.as_mut().filter(|c| c.is_alive()) {
                    let wound = crewman.wound_check(SPALLING_WOUND_FP, SPALLING_WOUND_MODIFIER, dice);
                    outcome.wounds.push((crewman.name.clone(), wound));
                }
            }
        }
        info!(target = %target.stats.name, attacker = %hit.attacker_name, "vehicle knocked out");
        target.destroy();
    }
    outcome.effect = Some(effect);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::weather::Weather;
    use crate::combat::point_fire::{build_point_fire, FireOverrides};
    use crate::content::units::Catalogue;
    use crate::core::dice::{FixedDice, SeededDice};

    fn setup(attacker_id: &str, target_id: &str, target_hex: HexCoord, target_facing: u8) -> (Unit, Unit) {
        let catalogue = Catalogue::builtin().unwrap();
        let mut dice = SeededDice::new(31);
        let attacker = Unit::new(catalogue.get(attacker_id).unwrap(), Side::Player, HexCoord::ORIGIN, 0, &mut dice);
        let target = Unit::new(catalogue.get(target_id).unwrap(), Side::Enemy, target_hex, target_facing, &mut dice);
        (attacker, target)
    }

    fn hit(attacker: &Unit, target: &Unit, ammo: AmmoType, result: AttackResult) -> AttackProfile {
        let mut p = build_point_fire(attacker, 0, target, Some(ammo), &Weather::clear(), FireOverrides::default()).unwrap();
        p.result = Some(result);
        p
    }

    #[test]
    fn test_facing_tiers() {
        assert_eq!(facing_from(0), Facing::Front);
        assert_eq!(facing_from(1), Facing::Side);
        assert_eq!(facing_from(3), Facing::Rear);
        assert_eq!(facing_from(5), Facing::Side);
    }

    #[test]
    fn test_front_hull_penetration_chance() {
        // target faces the attacker: direction 3 from (0,-1) points at (0,0)
        let (tank, target) = setup("pzkpfw_iv_f2", "t26", HexCoord::new(0, -1), 3);
        let h = hit(&tank, &target, AmmoType::Ap, AttackResult::Hit);
        // location roll 10 hits the hull
        let mut dice = FixedDice::always(10.0);
        let p = build_armour_profile(&h, &target, &mut dice).unwrap();
        assert_eq!(p.location, Some(Mount::Hull));
        assert_eq!(p.facing, Some(Facing::Front));
        // 88 base, range 1 adds nothing, 1 point of armour
        assert_eq!(p.final_chance, 76.0);
    }

    #[test]
    fn test_rear_shot_bonus() {
        let (tank, target) = setup("pzkpfw_iv_f2", "t26", HexCoord::new(0, -1), 0);
        let h = hit(&tank, &target, AmmoType::Ap, AttackResult::Hit);
        let mut dice = FixedDice::always(10.0);
        let p = build_armour_profile(&h, &target, &mut dice).unwrap();
        assert_eq!(p.facing, Some(Facing::Rear));
        assert!(p.modifiers.iter().any(|m| m.label == "Rear Facing"));
    }

    #[test]
    fn test_critical_halves_armour() {
        let (tank, target) = setup("pzkpfw_35t", "pzkpfw_iv_f2", HexCoord::new(0, -2), 3);
        let normal = hit(&tank, &target, AmmoType::Ap, AttackResult::Hit);
        let critical = hit(&tank, &target, AmmoType::Ap, AttackResult::CriticalHit);
        let mut dice = FixedDice::always(10.0);
        let a = build_armour_profile(&normal, &target, &mut dice).unwrap();
        let b = build_armour_profile(&critical, &target, &mut dice).unwrap();
        // 58 base, 18 off for range, 5 points of armour
        assert_eq!(a.final_chance, 0.0);
        assert_eq!(b.final_chance, 10.0);
    }

    #[test]
    fn test_point_blank_heavy_front() {
        let (tank, mut target) = setup("pzkpfw_iv_f2", "t26", HexCoord::ORIGIN, 0);
        if let Some(armour) = target.stats.armour.as_mut() {
            armour.hull_front = 4;
        }
        let h = hit(&tank, &target, AmmoType::Ap, AttackResult::Hit);
        // same hex: facing roll 10 lands on direction 0, dead ahead
        let mut dice = FixedDice::always(10.0);
        let p = build_armour_profile(&h, &target, &mut dice).unwrap();
        assert_eq!(p.facing, Some(Facing::Front));
        assert_eq!(p.final_chance, 47.0);
    }

    #[test]
    fn test_unarmoured_he_bonus() {
        let (tank, target) = setup("pzkpfw_iv_f2", "polish_truck", HexCoord::new(0, -1), 3);
        let h = hit(&tank, &target, AmmoType::He, AttackResult::Hit);
        let mut dice = FixedDice::always(10.0);
        let p = build_armour_profile(&h, &target, &mut dice).unwrap();
        assert_eq!(p.final_chance, 68.0);
    }

    #[test]
    fn test_missing_table_entry_is_an_error() {
        let (mut tank, target) = setup("pzkpfw_iv_f2", "t26", HexCoord::new(0, -1), 3);
        tank.weapons[0].stats.calibre = Some(105);
        let h = hit(&tank, &target, AmmoType::Ap, AttackResult::Hit);
        let mut dice = FixedDice::always(10.0);
        assert_eq!(
            build_armour_profile(&h, &target, &mut dice),
            Err(ContentError::MissingPenetrationEntry("105L".into()))
        );
    }

    #[test]
    fn test_outcome_bands() {
        assert_eq!(penetration_effect(10.0), PenetrationEffect::Minor);
        assert_eq!(penetration_effect(30.0), PenetrationEffect::Immobilized);
        assert_eq!(penetration_effect(50.0), PenetrationEffect::Spalling);
        assert_eq!(penetration_effect(65.0), PenetrationEffect::Destroyed);
    }

    #[test]
    fn test_penetration_destroys() {
        let (tank, mut target) = setup("pzkpfw_iv_f2", "t26", HexCoord::new(0, -1), 3);
        let h = hit(&tank, &target, AmmoType::Ap, AttackResult::Hit);
        // location 10, penetration roll 10 vs 76, outcome 10 + 66 margin
        let mut dice = FixedDice::always(10.0);
        let outcome = resolve_armour_hit(&mut target, &h, &mut dice).unwrap();
        assert_eq!(outcome.effect, Some(PenetrationEffect::Destroyed));
        assert!(!target.alive);
        assert_eq!(target.last_hit_by, Some((tank.id, 0)));
    }

    #[test]
    fn test_no_penetration_leaves_target() {
        let (tank, mut target) = setup("pzkpfw_iv_f2", "t26", HexCoord::new(0, -1), 3);
        let h = hit(&tank, &target, AmmoType::Ap, AttackResult::Hit);
        let mut dice = FixedDice::scripted([10.0, 90.0], 10.0);
        let outcome = resolve_armour_hit(&mut target, &h, &mut dice).unwrap();
        assert_eq!(outcome.profile.result, Some(AttackResult::NoPenetration));
        assert!(outcome.effect.is_none());
        assert!(target.alive);
    }
}
