//! The percentile roll that turns a profile into a result

use tracing::debug;

use super::profile::{AttackKind, AttackProfile, AttackResult};
use crate::content::tables::{AUTO_MISS_ROLL, CRITICAL_EFFECT_SHARE, FULL_EFFECT_SHARE};
use crate::core::dice::Dice;

/// Result of a to-hit roll on point fire
pub fn point_fire_result(roll: f32, final_chance: f32, critical_threshold: f32) -> AttackResult {
    if roll >= AUTO_MISS_ROLL {
        AttackResult::Miss
    } else if roll <= critical_threshold {
        AttackResult::CriticalHit
    } else if roll <= final_chance {
        AttackResult::Hit
    } else {
        AttackResult::Miss
    }
}

/// Result band of an area-fire roll
pub fn area_fire_result(roll: f32, final_chance: f32) -> AttackResult {
    if roll >= AUTO_MISS_ROLL {
        AttackResult::NoEffect
    } else if roll <= final_chance * CRITICAL_EFFECT_SHARE {
        AttackResult::CriticalEffect
    } else if roll <= final_chance * FULL_EFFECT_SHARE {
        AttackResult::FullEffect
    } else if roll <= final_chance {
        AttackResult::PartialEffect
    } else {
        AttackResult::NoEffect
    }
}

/// Penetration result; chances of exactly 0 or 100 are decided unrolled
pub fn armour_result(roll: Option<f32>, final_chance: f32) -> AttackResult {
    match roll {
        None if final_chance >= 100.0 => AttackResult::Penetrated,
        None => AttackResult::NoPenetration,
        Some(r) if r >= AUTO_MISS_ROLL => AttackResult::NoPenetration,
        Some(r) if r <= final_chance => AttackResult::Penetrated,
        Some(_) => AttackResult::NoPenetration,
    }
}

/// Firepower an area-fire result delivers
pub fn effective_fp(result: AttackResult, fp: u32) -> u32 {
    match result {
        AttackResult::CriticalEffect => fp * 2,
        AttackResult::FullEffect => fp,
        AttackResult::PartialEffect => (fp / 2).max(1),
        _ => 0,
    }
}

/// Roll the profile and record the result
///
/// `hull_down` is whether the target is hull down toward the attacker;
/// a point-fire hit into that arc is blocked.
pub fn do_attack_roll(profile: &mut AttackProfile, hull_down: bool, dice: &mut dyn Dice) -> AttackResult {
    let automatic = profile.kind == AttackKind::Armour
        && (profile.final_chance <= 0.0 || profile.final_chance >= 100.0);
    let roll = if automatic { None } else { Some(dice.percentile()) };

    let result = match profile.kind {
        AttackKind::PointFire => {
            let r = point_fire_result(roll.unwrap_or(100.0), profile.final_chance, profile.critical_threshold);
            if r.is_hit() && hull_down {
                AttackResult::BlockedByHullDown
            } else {
                r
            }
        }
        AttackKind::AreaFire => {
            let r = area_fire_result(roll.unwrap_or(100.0), profile.final_chance);
            profile.effective_fp = effective_fp(r, profile.weapon.fp);
            r
        }
        AttackKind::Armour => armour_result(roll, profile.final_chance),
    };

    profile.roll = roll;
    profile.result = Some(result);
    debug!(
        attacker = %profile.attacker_name,
        target = %profile.target_name,
        kind = ?profile.kind,
        chance = profile.final_chance,
        ?roll,
        result = result.name(),
        "attack roll"
    );
    result
}
