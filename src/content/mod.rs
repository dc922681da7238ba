//! Read-only content: lookup tables, terrain, skills and unit templates

pub mod loader;
pub mod nations;
pub mod skills;
pub mod tables;
pub mod terrain;
pub mod units;

pub use skills::Skill;
pub use terrain::{CampaignTerrain, Terrain, TerrainEffects};
pub use units::{
    AmmoType, ArmourSpec, BarrelLength, Catalogue, Facing, MobilityUpgrade, MovementClass,
    SizeClass, Traverse, TurretSpec, UnitCategory, UnitStats, WeaponKind, WeaponStats,
};
