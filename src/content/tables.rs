//! Attack and damage lookup tables - all tunable values in one place
//!
//! Modifiers are ADDITIVE percentile points unless a name says otherwise.

use crate::core::error::ContentError;

// Roll limits
pub const MIN_CHANCE: f32 = 3.0;
pub const MAX_CHANCE: f32 = 97.0;
pub const AUTO_MISS_ROLL: f32 = 97.0;
pub const CRITICAL_THRESHOLD: f32 = 3.0;
pub const SKILLED_CRITICAL_THRESHOLD: f32 = 5.0;
/// Unmodified roll at which a wound check is always fatal
pub const FATAL_WOUND_ROLL: f32 = 99.0;

// Point fire modifiers
pub const ATTACKER_MOVING: f32 = -60.0;
pub const ATTACKER_PINNED: f32 = -60.0;
pub const PIVOTED_TURRET_WEAPON: f32 = -15.0;
pub const PIVOTED_HULL_WEAPON: f32 = -35.0;
pub const TURRET_ROTATED_FAST: f32 = -10.0;
pub const TURRET_ROTATED_SLOW: f32 = -20.0;
pub const SMOKE_LIGHT: f32 = -25.0;
pub const SMOKE_HEAVY: f32 = -50.0;
pub const TARGET_UNSPOTTED: f32 = -20.0;
pub const TARGET_MOVING: f32 = -30.0;
pub const SHORT_BARREL: f32 = -12.0;
pub const LONG_BARREL: f32 = 12.0;
pub const SMALL_CALIBRE_MM: u32 = 40;
pub const DIRECT_FIRE_BONUS: f32 = 5.0;
pub const FIRE_DIRECTION_BONUS: f32 = 5.0;
pub const CRACK_SHOT_BONUS: f32 = 3.0;
pub const TARGET_TRACKER_BONUS: f32 = 7.0;
pub const SNIPER_BONUS: f32 = 7.0;

// Area fire
pub const AREA_BASE_VEHICLE: f32 = 20.0;
pub const AREA_BASE_OTHER: f32 = 30.0;
pub const AREA_FP_STEP: f32 = 5.0;
pub const AREA_FP_DECAY: f32 = 0.95;
pub const AREA_ATTACKER_MOVING: f32 = -30.0;
pub const AREA_ATTACKER_PINNED: f32 = -30.0;
pub const AREA_SMOKE_PER_LEVEL: f32 = -15.0;
pub const CRITICAL_EFFECT_SHARE: f32 = 0.10;
pub const FULL_EFFECT_SHARE: f32 = 0.75;
/// MG hits within this range may be converted into armour hits
pub const MG_AP_RANGE: u32 = 1;

// Armour penetration
pub const ARMOUR_POINT: f32 = -12.0;
pub const ARMOUR_POINT_CRITICAL: f32 = -6.0;
pub const REAR_FACING_BONUS: f32 = 15.0;
pub const UNARMOURED_HE_BONUS: f32 = 40.0;
pub const UNARMOURED_AP_MALUS: f32 = -10.0;
pub const APCR_CLOSE_BONUS: f32 = 15.0;
pub const MG_PENETRATION_BASE: f32 = 16.0;
pub const AT_RIFLE_PENETRATION_BASE: f32 = 32.0;
/// Chance that a hit strikes the hull rather than the turret
pub const HULL_HIT_CHANCE: f32 = 75.0;

// Penetration outcome bands on the modified outcome roll
pub const OUTCOME_CRITICAL_BONUS: f32 = 20.0;
pub const OUTCOME_MINOR_BELOW: f32 = 30.0;
pub const OUTCOME_IMMOBILIZED_BELOW: f32 = 45.0;
pub const OUTCOME_SPALLING_BELOW: f32 = 65.0;
pub const SPALLING_WOUND_FP: u32 = 8;
pub const SPALLING_WOUND_MODIFIER: f32 = 20.0;

// Spotting
pub const SPOT_INFANTRY_FACTOR: f32 = 0.5;
pub const SPOT_SMOKE_PER_LEVEL: f32 = -15.0;
pub const SPOT_TARGET_MOVING: f32 = 10.0;
pub const SPOT_TARGET_FIRED: f32 = 20.0;
pub const SPOT_PERCEPTION_STEP: f32 = 3.0;

// Movement
pub const BASE_FORWARD_CHANCE: f32 = 50.0;
pub const BASE_REVERSE_CHANCE: f32 = 20.0;
pub const FAILED_MOVE_BONUS: f32 = 15.0;
pub const DIRECT_MOVEMENT_OPEN: f32 = 15.0;
pub const DIRECT_MOVEMENT_BUTTONED: f32 = 10.0;
pub const TACTICIAN_BONUS: f32 = 5.0;
pub const QUICK_SHIFTER_BONUS: f32 = 5.0;
pub const POWERFUL_ENGINE_BONUS: f32 = 5.0;
pub const WIDE_TRACKS_BOG: f32 = -1.0;
pub const PIVOT_BOG_WEIGHT: f32 = 0.25;
pub const REPOSITION_BOG_WEIGHT: f32 = 0.5;
pub const HULL_DOWN_EXPERT_BONUS: f32 = 10.0;

// Firepower resolution
pub const INFANTRY_DESTRUCTION_BASE: f32 = 5.0;
pub const INFANTRY_DESTRUCTION_STEP: f32 = 5.0;
pub const INFANTRY_DESTRUCTION_GROWTH: f32 = 1.05;
pub const FATIGUE_STEP: f32 = 5.0;
pub const PIN_TEST_PER_FP: f32 = 10.0;
pub const PIN_MORALE_STEP: f32 = 5.0;
pub const UNPIN_BASE: f32 = 30.0;

/// Clamp a summed chance into the legal roll window
pub fn clamp_chance(chance: f32) -> f32 {
    chance.clamp(MIN_CHANCE, MAX_CHANCE)
}

/// Base point-fire chance by range band, vehicle targets first
pub fn point_fire_base(vehicle_target: bool, range: u32) -> f32 {
    const TABLE: [[f32; 2]; 4] = [[98.0, 88.0], [83.0, 72.0], [72.0, 58.0], [58.0, 42.0]];
    let row = TABLE[range.min(3) as usize];
    if vehicle_target {
        row[0]
    } else {
        row[1]
    }
}

/// Accuracy bonus for firing again at an acquired target
pub fn acquired_target_bonus(range: u32, level: u8) -> f32 {
    const TABLE: [[f32; 2]; 4] = [[8.0, 15.0], [10.0, 20.0], [15.0, 28.0], [20.0, 35.0]];
    TABLE[range.min(3) as usize][level.min(1) as usize]
}

/// Per-range penalty for precipitation intensity 0..=3
pub fn precipitation_step(intensity: u8) -> f32 {
    match intensity {
        0 => 0.0,
        1 => -5.0,
        2 => -10.0,
        _ => -20.0,
    }
}

/// Point-fire smoke penalty from the combined smoke level
pub fn smoke_modifier(combined: u8) -> f32 {
    match combined {
        0 => 0.0,
        1 => SMOKE_LIGHT,
        _ => SMOKE_HEAVY,
    }
}

/// Extra-long barrels improve further at long range
pub fn extra_long_barrel(range: u32) -> f32 {
    match range {
        0 | 1 => 0.0,
        2 => 12.0,
        _ => 24.0,
    }
}

/// Penalty for small guns firing at range
pub fn small_calibre_at_range(range: u32) -> f32 {
    match range {
        0 | 1 => 0.0,
        2 => -7.0,
        _ => -15.0,
    }
}

/// Area fire range modifier
pub fn area_range_modifier(range: u32) -> f32 {
    match range {
        0 => 10.0,
        1 => 0.0,
        2 => -10.0,
        _ => -20.0,
    }
}

/// Diminishing increments for firepower points beyond the first
pub fn area_fire_increment(fp: u32) -> f32 {
    (1..fp)
        .map(|n| AREA_FP_STEP * AREA_FP_DECAY.powi(n as i32 - 1))
        .sum()
}

/// AP penetration base at range 1 against unarmoured plate
///
/// A missing key is a content defect; callers must not default it.
pub fn ap_base_penetration(calibre_key: &str) -> Result<f32, ContentError> {
    let chance = match calibre_key {
        "20L" => 52.0,
        "37" => 58.0,
        "37L" => 64.0,
        "45L" => 68.0,
        "47L" => 70.0,
        "75S" => 62.0,
        "75" => 70.0,
        "75L" => 88.0,
        "76S" => 64.0,
        "76L" => 84.0,
        "76LL" => 92.0,
        "88L" => 100.0,
        other => return Err(ContentError::MissingPenetrationEntry(other.to_string())),
    };
    Ok(chance)
}

/// Range adjustment to AP penetration by calibre bracket
pub fn ap_range_modifier(calibre: u32, range: u32) -> f32 {
    let close = if calibre <= 40 {
        18.0
    } else if calibre <= 57 {
        12.0
    } else {
        7.0
    };
    match range {
        0 => close,
        1 => 0.0,
        2 => -close,
        _ => -2.0 * close,
    }
}

/// HE penetration base by calibre
pub fn he_base_penetration(calibre: u32) -> f32 {
    match calibre {
        0..=20 => 5.0,
        21..=40 => 12.0,
        41..=57 => 18.0,
        58..=77 => 28.0,
        _ => 40.0,
    }
}

/// Firepower delivered to a soft target by one HE gun hit
pub fn he_firepower(calibre: u32) -> u32 {
    match calibre {
        0..=20 => 1,
        21..=40 => 2,
        41..=57 => 4,
        58..=77 => 6,
        78..=88 => 8,
        _ => 10,
    }
}

/// Destruction chance for unarmoured vehicles by accumulated firepower
pub fn soft_vehicle_destruction(fp: u32) -> f32 {
    const TABLE: [(u32, f32); 7] = [
        (12, 90.0),
        (10, 80.0),
        (8, 65.0),
        (6, 50.0),
        (4, 35.0),
        (2, 20.0),
        (1, 10.0),
    ];
    TABLE
        .iter()
        .find(|(threshold, _)| fp >= *threshold)
        .map(|(_, chance)| *chance)
        .unwrap_or(0.0)
}

/// Spotting base chance by distance
pub fn spot_base(distance: u32) -> f32 {
    match distance {
        0 => 95.0,
        1 => 85.0,
        2 => 70.0,
        _ => 50.0,
    }
}

/// Wound check modifier by firepower band
pub fn wound_fp_modifier(fp: u32) -> f32 {
    match fp {
        0..=2 => -10.0,
        3..=4 => 0.0,
        5..=7 => 10.0,
        _ => 20.0,
    }
}
