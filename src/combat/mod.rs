//! Attack resolution: build a profile, then roll it

pub mod area_fire;
pub mod armour;
pub mod attack;
pub mod check;
pub mod point_fire;
pub mod profile;
pub mod rate_of_fire;
pub mod roll;

pub use area_fire::build_area_fire;
pub use armour::{build_armour_profile, penetration_effect, resolve_armour_hit, ArmourOutcome};
pub use attack::{
    build_attack_profile, execute_attack, gun_hit_firepower, pair_mut, resolve_pending,
    AttackOutcome, Resolution,
};
pub use check::{check_attack, CheckOptions};
pub use point_fire::{build_point_fire, combined_smoke, FireOverrides};
pub use profile::{AttackKind, AttackProfile, AttackResult, Modifier, PenetrationEffect};
pub use rate_of_fire::{rof_chance, roll_rate_of_fire};
pub use roll::do_attack_roll;
