//! Attack scoring: every legal option with its adjusted chance
//!
//! Scoring is pure. It reads the units and returns options; nothing is
//! pivoted, rotated or fired until an option is executed.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::campaign::weather::Weather;
use crate::combat::attack::build_attack_profile;
use crate::combat::check::{check_attack, CheckOptions};
use crate::combat::point_fire::FireOverrides;
use crate::content::tables::MG_AP_RANGE;
use crate::content::units::{AmmoType, WeaponKind};
use crate::core::types::Mount;
use crate::hex::{bearing, steps_between, HexCoord};
use crate::unit::Unit;

/// HE at soft targets when an MG could do the job
pub const HE_WITH_MG_AVAILABLE: f32 = -30.0;
/// Small arms at armour beyond point-blank range
pub const SMALL_ARMS_VS_ARMOUR: f32 = -40.0;
/// Armour-piercing rounds at soft targets
pub const AP_VS_SOFT_TARGET: f32 = -30.0;
/// HE at armoured targets
pub const HE_VS_ARMOUR: f32 = -15.0;

/// Facing change needed before a weapon bears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reorientation {
    None,
    /// Clockwise hull pivot steps
    Pivot(u8),
    /// Clockwise turret rotation steps
    RotateTurret(u8),
}

/// Which targets an activation may consider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFilter {
    /// Only the unit at this index
    Only(usize),
    /// Only the unit at this index, and only with area fire
    AreaOnly(usize),
    /// The nearest hostiles other than the unit at this index
    NearestExcept(usize),
    AnyHostile,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredAttack {
    pub weapon_index: usize,
    /// Index of the target in the unit list
    pub target: usize,
    pub ammo: Option<AmmoType>,
    pub reorientation: Reorientation,
    pub score: f32,
}

/// Facing change that brings weapon `weapon_index` to bear on `target_hex`
pub fn reorientation_for(unit: &Unit, weapon_index: usize, target_hex: HexCoord) -> Option<Reorientation> {
    let weapon = unit.weapons.get(weapon_index)?;
    if weapon.covers(target_hex) {
        return Some(Reorientation::None);
    }
    let direction = bearing(unit.hex, target_hex)?;
    match (weapon.mount(), unit.turret_facing, unit.hull_facing) {
        (Mount::Turret, Some(turret), _) => {
            Some(Reorientation::RotateTurret(steps_between(turret, direction)))
        }
        (_, _, Some(hull)) if !unit.immobilized && !unit.bogged => {
            Some(Reorientation::Pivot(steps_between(hull, direction)))
        }
        _ => None,
    }
}

fn candidate_targets(units: &[Unit], actor: usize, filter: TargetFilter) -> Vec<usize> {
    let me = &units[actor];
    let hostile = |i: usize| i != actor && units[i].alive && me.is_hostile_to(&units[i]);
    match filter {
        TargetFilter::Only(i) | TargetFilter::AreaOnly(i) => {
            if i < units.len() && hostile(i) {
                vec![i]
            } else {
                Vec::new()
            }
        }
        TargetFilter::AnyHostile => (0..units.len()).filter(|&i| hostile(i)).collect(),
        TargetFilter::NearestExcept(excluded) => {
            let others: Vec<usize> = (0..units.len())
                .filter(|&i| i != excluded && hostile(i))
                .collect();
            let nearest = others
                .iter()
                .map(|&i| me.hex.distance(&units[i].hex))
                .min();
            match nearest {
                Some(d) => others
                    .into_iter()
                    .filter(|&i| me.hex.distance(&units[i].hex) == d)
                    .collect(),
                None => Vec::new(),
            }
        }
    }
}

/// Hand-tuned score adjustment for a weapon, ammo and target pairing
fn score_adjustment(units: &[Unit], actor: usize, weapon_index: usize, target: usize, ammo: Option<AmmoType>) -> f32 {
    let me = &units[actor];
    let victim = &units[target];
    let weapon = &me.weapons[weapon_index];
    let distance = me.hex.distance(&victim.hex);
    let mut adjustment = 0.0;

    match ammo {
        Some(AmmoType::He) if !victim.is_vehicle() => {
            let mg_available = me.weapons.iter().enumerate().any(|(i, w)| {
                w.is_mg()
                    && check_attack(me, i, victim, None, CheckOptions { ignore_facing: true }).is_ok()
            });
            if mg_available {
                adjustment += HE_WITH_MG_AVAILABLE;
            }
        }
        Some(AmmoType::He) if victim.is_armoured() => adjustment += HE_VS_ARMOUR,
        Some(a) if a.is_ap() && !victim.is_vehicle() => adjustment += AP_VS_SOFT_TARGET,
        _ => {}
    }
    if weapon.kind() == WeaponKind::SmallArms && victim.is_armoured() && distance > MG_AP_RANGE {
        adjustment += SMALL_ARMS_VS_ARMOUR;
    }
    adjustment
}

/// Every legal attack for `units[actor]`, scored, above `min_score`
pub fn score_attacks(
    units: &[Unit],
    actor: usize,
    filter: TargetFilter,
    weather: &Weather,
    min_score: f32,
) -> Vec<ScoredAttack> {
    let Some(me) = units.get(actor) else {
        return Vec::new();
    };
    let area_only = matches!(filter, TargetFilter::AreaOnly(_));
    let mut options = Vec::new();

    for target in candidate_targets(units, actor, filter) {
        let victim = &units[target];
        for (weapon_index, weapon) in me.weapons.iter().enumerate() {
            if area_only && weapon.is_point_fire() {
                continue;
            }
            let ammo_choices: Vec<Option<AmmoType>> = if weapon.uses_ammo() {
                weapon.stats.ammo_types.iter().map(|a| Some(*a)).collect()
            } else {
                vec![None]
            };
            for ammo in ammo_choices {
                let options_check = CheckOptions { ignore_facing: true };
                if check_attack(me, weapon_index, victim, ammo, options_check).is_err() {
                    continue;
                }
                let Some(reorientation) = reorientation_for(me, weapon_index, victim.hex) else {
                    continue;
                };
                let overrides = FireOverrides {
                    pivot: matches!(reorientation, Reorientation::Pivot(s) if s > 0),
                    turret_rotate: matches!(reorientation, Reorientation::RotateTurret(s) if s > 0),
                };
                let Ok(profile) = build_attack_profile(me, weapon_index, victim, ammo, weather, overrides) else {
                    continue;
                };
                let score = profile.final_chance + score_adjustment(units, actor, weapon_index, target, ammo);
                if score > min_score {
                    options.push(ScoredAttack {
                        weapon_index,
                        target,
                        ammo,
                        reorientation,
                        score,
                    });
                }
            }
        }
    }
    options
}

/// Highest-scoring option
pub fn best_attack(options: &[ScoredAttack]) -> Option<&ScoredAttack> {
    options.iter().max_by_key(|o| OrderedFloat(o.score))
}
