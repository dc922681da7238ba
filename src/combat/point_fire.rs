//! Point fire: aimed shots from guns and AT rifles

use super::profile::{AttackKind, AttackProfile};
use crate::campaign::weather::Weather;
use crate::content::skills::Skill;
use crate::content::tables::{
    acquired_target_bonus, extra_long_barrel, point_fire_base, precipitation_step,
    small_calibre_at_range, smoke_modifier, ATTACKER_MOVING, ATTACKER_PINNED, CRACK_SHOT_BONUS,
    LONG_BARREL, PIVOTED_HULL_WEAPON, PIVOTED_TURRET_WEAPON, SHORT_BARREL,
    SKILLED_CRITICAL_THRESHOLD, SMALL_CALIBRE_MM, SNIPER_BONUS, TARGET_MOVING,
    TARGET_TRACKER_BONUS, TARGET_UNSPOTTED, TURRET_ROTATED_FAST, TURRET_ROTATED_SLOW,
};
use crate::content::units::{AmmoType, BarrelLength, Traverse};
use crate::core::error::IllegalAction;
use crate::core::types::Mount;
use crate::hex::bearing;
use crate::unit::Unit;

/// Range band at which Sniper applies
const SNIPER_RANGE: u32 = 3;

/// Hypothetical facing changes the AI scores before committing to them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FireOverrides {
    pub pivot: bool,
    pub turret_rotate: bool,
}

/// Whether the crewman operating weapon `weapon_index` has `skill`
pub fn operator_has_skill(attacker: &Unit, weapon_index: usize, skill: Skill) -> bool {
    match attacker.operator_of(weapon_index) {
        Some(Some(i)) => attacker.positions[i]
            .crewman
            .as_ref()
            .is_some_and(|c| c.has_skill(skill)),
        _ => false,
    }
}

/// Smoke between two units: each one's edge toward the other
pub fn combined_smoke(attacker: &Unit, target: &Unit) -> u8 {
    if attacker.hex == target.hex {
        return 0;
    }
    attacker.smoke_toward(bearing(attacker.hex, target.hex))
        + target.smoke_toward(bearing(target.hex, attacker.hex))
}

/// Precipitation penalty, scaled by range
pub fn precipitation_penalty(weather: &Weather, range: u32) -> f32 {
    precipitation_step(weather.precipitation.intensity()) * range as f32
}

/// Build the to-hit profile for a point-fire shot
pub fn build_point_fire(
    attacker: &Unit,
    weapon_index: usize,
    target: &Unit,
    ammo: Option<AmmoType>,
    weather: &Weather,
    overrides: FireOverrides,
) -> Result<AttackProfile, IllegalAction> {
    let weapon = attacker.weapon(weapon_index)?;
    let range = attacker.hex.distance(&target.hex);
    let vehicle_target = target.is_vehicle();

    let mut profile = AttackProfile::new(
        AttackKind::PointFire,
        attacker.id,
        attacker.name(),
        attacker.hex,
        weapon_index,
        &weapon.stats,
        target.id,
        target.name(),
        ammo,
        range,
        point_fire_base(vehicle_target, range),
    );

    // === ATTACKER STATE ===
    if attacker.moving {
        profile.add("Attacker Moving", ATTACKER_MOVING);
    }
    if attacker.pinned {
        profile.add("Attacker Pinned", ATTACKER_PINNED);
    }
    if attacker.pivoted || overrides.pivot {
        let value = match weapon.mount() {
            Mount::Turret => PIVOTED_TURRET_WEAPON,
            Mount::Hull => PIVOTED_HULL_WEAPON,
        };
        profile.add("Attacker Pivoted", value);
    }
    let turret_weapon = weapon.mount() == Mount::Turret;
    if turret_weapon && (attacker.turret_rotated || overrides.turret_rotate) {
        let value = match attacker.traverse() {
            Some(Traverse::Slow) => TURRET_ROTATED_SLOW,
            _ => TURRET_ROTATED_FAST,
        };
        profile.add("Turret Rotated", value);
    }

    // === CONDITIONS ===
    profile.add(
        format!("{:?}", weather.precipitation),
        precipitation_penalty(weather, range),
    );
    profile.add("Smoke", smoke_modifier(combined_smoke(attacker, target)));

    // === TARGET ===
    if !target.spotted {
        profile.add("Target Unspotted", TARGET_UNSPOTTED);
    }
    let keeps_acquisition = !overrides.pivot && !(turret_weapon && overrides.turret_rotate);
    if keeps_acquisition {
        if let Some(level) = weapon.acquired_level(target.id) {
            profile.add("Acquired Target", acquired_target_bonus(range, level));
        }
    }
    if target.moving && vehicle_target {
        profile.add("Target Moving", TARGET_MOVING);
        if operator_has_skill(attacker, weapon_index, Skill::TargetTracker) {
            profile.add("Target Tracker", TARGET_TRACKER_BONUS);
        }
    }
    profile.add("Target Size", target.stats.size.point_fire_modifier());
    profile.add(
        format!("Target in {}", target.terrain.name()),
        target.terrain.point_fire_modifier(vehicle_target),
    );

    // === WEAPON ===
    if range >= 2 {
        let barrel = match weapon.stats.barrel {
            BarrelLength::Short => SHORT_BARREL,
            BarrelLength::Normal => 0.0,
            BarrelLength::Long => LONG_BARREL,
            BarrelLength::ExtraLong => extra_long_barrel(range),
        };
        profile.add("Barrel Length", barrel);
    }
    if weapon.calibre().is_some_and(|c| c < SMALL_CALIBRE_MM) {
        profile.add("Small Calibre", small_calibre_at_range(range));
    }

    // === CREW ===
    profile.add("Direct Fire", attacker.direct_fire_bonus());
    if operator_has_skill(attacker, weapon_index, Skill::CrackShot) {
        profile.add("Crack Shot", CRACK_SHOT_BONUS);
    }
    if range == SNIPER_RANGE && operator_has_skill(attacker, weapon_index, Skill::Sniper) {
        profile.add("Sniper", SNIPER_BONUS);
    }
    if operator_has_skill(attacker, weapon_index, Skill::KnowsWeakSpots) {
        profile.critical_threshold = SKILLED_CRITICAL_THRESHOLD;
    }

    profile.finalize();
    Ok(profile)
}
