//! Area fire: MGs and small arms delivering firepower

use super::point_fire::{combined_smoke, precipitation_penalty};
use super::profile::{AttackKind, AttackProfile};
use crate::campaign::weather::Weather;
use crate::content::tables::{
    area_fire_increment, area_range_modifier, AREA_ATTACKER_MOVING, AREA_ATTACKER_PINNED,
    AREA_BASE_OTHER, AREA_BASE_VEHICLE, AREA_SMOKE_PER_LEVEL, TARGET_UNSPOTTED,
};
use crate::core::error::IllegalAction;
use crate::unit::Unit;

/// Build the effect profile for an area-fire attack
pub fn build_area_fire(
    attacker: &Unit,
    weapon_index: usize,
    target: &Unit,
    weather: &Weather,
) -> Result<AttackProfile, IllegalAction> {
    let weapon = attacker.weapon(weapon_index)?;
    let range = attacker.hex.distance(&target.hex);
    let base = if target.is_vehicle() {
        AREA_BASE_VEHICLE
    } else {
        AREA_BASE_OTHER
    };

    let mut profile = AttackProfile::new(
        AttackKind::AreaFire,
        attacker.id,
        attacker.name(),
        attacker.hex,
        weapon_index,
        &weapon.stats,
        target.id,
        target.name(),
        None,
        range,
        base,
    );

    profile.add(format!("Firepower {}", weapon.stats.fp), area_fire_increment(weapon.stats.fp));
    profile.add("Range", area_range_modifier(range));
    if attacker.moving {
        profile.add("Attacker Moving", AREA_ATTACKER_MOVING);
    }
    if attacker.pinned {
        profile.add("Attacker Pinned", AREA_ATTACKER_PINNED);
    }
    profile.add(
        format!("{:?}", weather.precipitation),
        precipitation_penalty(weather, range),
    );
    profile.add(
        "Smoke",
        AREA_SMOKE_PER_LEVEL * combined_smoke(attacker, target) as f32,
    );
    if !target.spotted {
        profile.add("Target Unspotted", TARGET_UNSPOTTED);
    }
    profile.add(
        format!("Target in {}", target.terrain.name()),
        target.terrain.effects().area_fire,
    );
    profile.add("Direct Fire", attacker.direct_fire_bonus());

    profile.finalize();
    Ok(profile)
}
