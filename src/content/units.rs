//! Unit and weapon templates, and the catalogue that holds them
//!
//! Optional capabilities (armour, turret) are typed options rather than
//! missing keys.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{ContentError, Result};
use crate::core::types::{Mount, Nation};
use crate::crew::command::CrewCommand;
use crate::crew::position::{PositionKind, PositionTemplate};

const BUILTIN_UNITS: &str = include_str!("../../data/units.toml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitCategory {
    Infantry,
    Gun,
    Vehicle,
    TrainCar,
    NonCombat,
}

impl UnitCategory {
    pub fn name(&self) -> &'static str {
        match self {
            UnitCategory::Infantry => "Infantry",
            UnitCategory::Gun => "Gun",
            UnitCategory::Vehicle => "Vehicle",
            UnitCategory::TrainCar => "Train Car",
            UnitCategory::NonCombat => "Non-Combat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SizeClass {
    VerySmall,
    Small,
    #[default]
    Normal,
    Large,
    VeryLarge,
}

impl SizeClass {
    /// Point fire modifier for targets of this size
    pub fn point_fire_modifier(&self) -> f32 {
        match self {
            SizeClass::VerySmall => -28.0,
            SizeClass::Small => -12.0,
            SizeClass::Normal => 0.0,
            SizeClass::Large => 12.0,
            SizeClass::VeryLarge => 28.0,
        }
    }

    pub fn spotting_modifier(&self) -> f32 {
        match self {
            SizeClass::VerySmall => -20.0,
            SizeClass::Small => -10.0,
            SizeClass::Normal => 0.0,
            SizeClass::Large => 10.0,
            SizeClass::VeryLarge => 20.0,
        }
    }

    pub fn hull_down_modifier(&self) -> f32 {
        match self {
            SizeClass::VerySmall => 15.0,
            SizeClass::Small => 10.0,
            SizeClass::Normal => 0.0,
            SizeClass::Large => -10.0,
            SizeClass::VeryLarge => -20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MovementClass {
    Foot,
    Immobile,
    SlowTracked,
    #[default]
    Tracked,
    FastTracked,
    HalfTracked,
    Wheeled,
}

impl MovementClass {
    /// Movement and bog modifiers; `None` for units that cannot move
    pub fn modifiers(&self) -> Option<(f32, f32)> {
        match self {
            MovementClass::Foot => Some((30.0, 0.0)),
            MovementClass::Immobile => None,
            MovementClass::SlowTracked => Some((-10.0, 1.0)),
            MovementClass::Tracked => Some((0.0, 0.0)),
            MovementClass::FastTracked => Some((10.0, -0.5)),
            MovementClass::HalfTracked => Some((-5.0, 0.5)),
            MovementClass::Wheeled => Some((5.0, 2.0)),
        }
    }

    /// Foot units never bog
    pub fn can_bog(&self) -> bool {
        !matches!(self, MovementClass::Foot | MovementClass::Immobile)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MobilityUpgrade {
    PowerfulEngine,
    WideTracks,
    ReliableTransmission,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Traverse {
    #[default]
    Fast,
    Slow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TurretSpec {
    #[serde(default)]
    pub traverse: Traverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    Front,
    Side,
    Rear,
}

/// Armour values in points per location and facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ArmourSpec {
    pub hull_front: u8,
    pub hull_side: u8,
    pub turret_front: u8,
    pub turret_side: u8,
}

impl ArmourSpec {
    /// Rear hits use side armour
    pub fn value(&self, location: Mount, facing: Facing) -> u8 {
        match (location, facing) {
            (Mount::Hull, Facing::Front) => self.hull_front,
            (Mount::Hull, _) => self.hull_side,
            (Mount::Turret, Facing::Front) => self.turret_front,
            (Mount::Turret, _) => self.turret_side,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AmmoType {
    #[serde(rename = "AP")]
    Ap,
    #[serde(rename = "HE")]
    He,
    #[serde(rename = "APCR")]
    Apcr,
}

impl AmmoType {
    pub fn name(&self) -> &'static str {
        match self {
            AmmoType::Ap => "AP",
            AmmoType::He => "HE",
            AmmoType::Apcr => "APCR",
        }
    }

    /// Armour-piercing rounds
    pub fn is_ap(&self) -> bool {
        matches!(self, AmmoType::Ap | AmmoType::Apcr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Gun,
    AtRifle,
    CoaxMg,
    HullMg,
    AaMg,
    SmallArms,
}

impl WeaponKind {
    pub fn is_point_fire(&self) -> bool {
        matches!(self, WeaponKind::Gun | WeaponKind::AtRifle)
    }

    pub fn is_mg(&self) -> bool {
        matches!(self, WeaponKind::CoaxMg | WeaponKind::HullMg | WeaponKind::AaMg)
    }

    pub fn is_area_fire(&self) -> bool {
        !self.is_point_fire()
    }

    /// Crew command an operator must hold
    pub fn operator_command(&self) -> CrewCommand {
        if self.is_point_fire() {
            CrewCommand::OperateGun
        } else {
            CrewCommand::OperateMg
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BarrelLength {
    Short,
    #[default]
    Normal,
    Long,
    ExtraLong,
}

impl BarrelLength {
    pub fn suffix(&self) -> &'static str {
        match self {
            BarrelLength::Short => "S",
            BarrelLength::Normal => "",
            BarrelLength::Long => "L",
            BarrelLength::ExtraLong => "LL",
        }
    }
}

fn default_range() -> u32 {
    3
}

fn default_fp() -> u32 {
    1
}

/// Static stats of a weapon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub name: String,
    pub kind: WeaponKind,
    #[serde(default)]
    pub calibre: Option<u32>,
    #[serde(default)]
    pub barrel: BarrelLength,
    #[serde(default)]
    pub mount: Mount,
    #[serde(default = "default_range")]
    pub max_range: u32,
    /// Rate-of-fire rating in percentile points, 0 for none
    #[serde(default)]
    pub rof: f32,
    /// Firepower for area fire
    #[serde(default = "default_fp")]
    pub fp: u32,
    #[serde(default)]
    pub firing_group: Option<u8>,
    #[serde(default)]
    pub ammo_types: Vec<AmmoType>,
    #[serde(default)]
    pub max_ammo: u32,
    #[serde(default)]
    pub rr_size: u32,
    #[serde(default)]
    pub operators: Vec<PositionKind>,
    /// Needs a loader on Reload to maintain rate of fire
    #[serde(default)]
    pub loaded: bool,
    /// Fires in every direction regardless of facing
    #[serde(default)]
    pub all_around: bool,
}

impl WeaponStats {
    /// Calibre key into the penetration table, e.g. "75L"
    pub fn calibre_key(&self) -> Option<String> {
        self.calibre.map(|c| format!("{}{}", c, self.barrel.suffix()))
    }

    pub fn uses_ammo(&self) -> bool {
        !self.ammo_types.is_empty()
    }
}

fn default_morale() -> u8 {
    5
}

fn default_weight() -> f32 {
    1.0
}

/// Static template for one unit type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    pub type_id: String,
    pub name: String,
    pub nation: Nation,
    pub category: UnitCategory,
    #[serde(default)]
    pub size: SizeClass,
    #[serde(default)]
    pub movement_class: MovementClass,
    #[serde(default)]
    pub armour: Option<ArmourSpec>,
    #[serde(default)]
    pub turret: Option<TurretSpec>,
    #[serde(default)]
    pub upgrades: Vec<MobilityUpgrade>,
    #[serde(default)]
    pub smoke_grenades: u32,
    #[serde(default)]
    pub smoke_mortar: u32,
    #[serde(default)]
    pub breakdown_chance: f32,
    #[serde(default = "default_morale")]
    pub morale: u8,
    /// Relative weight when picked for an enemy roster
    #[serde(default = "default_weight")]
    pub weight: f32,
    #[serde(default)]
    pub positions: Vec<PositionTemplate>,
    #[serde(default)]
    pub weapons: Vec<WeaponStats>,
}

impl UnitStats {
    pub fn is_vehicle(&self) -> bool {
        matches!(
            self.category,
            UnitCategory::Vehicle | UnitCategory::TrainCar | UnitCategory::NonCombat
        )
    }

    pub fn armour(&self) -> Option<&ArmourSpec> {
        self.armour.as_ref()
    }

    pub fn is_armoured(&self) -> bool {
        self.armour.is_some()
    }

    pub fn turret(&self) -> Option<Traverse> {
        self.turret.map(|t| t.traverse)
    }

    pub fn has_upgrade(&self, upgrade: MobilityUpgrade) -> bool {
        self.upgrades.contains(&upgrade)
    }

    pub fn is_armed(&self) -> bool {
        !self.weapons.is_empty()
    }

    pub fn is_mobile(&self) -> bool {
        self.movement_class != MovementClass::Immobile
    }
}

/// Read-only collection of unit templates keyed by type id
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    units: Vec<UnitStats>,
    by_id: AHashMap<String, usize>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in roster
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_UNITS)
    }

    /// Add a template, replacing any with the same type id
    pub fn insert(&mut self, stats: UnitStats) {
        match self.by_id.get(&stats.type_id) {
            Some(&index) => self.units[index] = stats,
            None => {
                self.by_id.insert(stats.type_id.clone(), self.units.len());
                self.units.push(stats);
            }
        }
    }

    pub fn get(&self, type_id: &str) -> std::result::Result<&UnitStats, ContentError> {
        self.by_id
            .get(type_id)
            .map(|&i| &self.units[i])
            .ok_or_else(|| ContentError::UnknownUnitType(type_id.to_string()))
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.by_id.contains_key(type_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitStats> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Every template fielded by `nation`
    pub fn by_nation(&self, nation: Nation) -> impl Iterator<Item = &UnitStats> {
        self.units.iter().filter(move |u| u.nation == nation)
    }

    /// Enemy roster for a scenario against `nation`
    pub fn roster(&self, nation: Nation) -> Vec<UnitStats> {
        self.by_nation(nation)
            .filter(|u| u.weight > 0.0)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalogue_loads() {
        let catalogue = Catalogue::builtin().unwrap();
        assert!(catalogue.len() >= 20);
        let tank = catalogue.get("pzkpfw_iv_f2").unwrap();
        assert_eq!(tank.category, UnitCategory::Vehicle);
        assert_eq!(tank.weapons[0].calibre_key().as_deref(), Some("75L"));
        assert!(tank.turret().is_some());
    }

    #[test]
    fn test_unknown_type_is_content_error() {
        let catalogue = Catalogue::builtin().unwrap();
        assert_eq!(
            catalogue.get("tiger_ii").unwrap_err(),
            ContentError::UnknownUnitType("tiger_ii".into())
        );
    }

    #[test]
    fn test_rosters_by_nation() {
        let catalogue = Catalogue::builtin().unwrap();
        let polish = catalogue.roster(Nation::Poland);
        assert!(!polish.is_empty());
        assert!(polish.iter().all(|u| u.nation == Nation::Poland));
        assert!(polish.iter().any(|u| u.category == UnitCategory::Infantry));
    }

    #[test]
    fn test_insert_replaces() {
        let mut catalogue = Catalogue::builtin().unwrap();
        let before = catalogue.len();
        let mut stats = catalogue.get("7tp").unwrap().clone();
        stats.morale = 9;
        catalogue.insert(stats);
        assert_eq!(catalogue.len(), before);
        assert_eq!(catalogue.get("7tp").unwrap().morale, 9);
    }

    #[test]
    fn test_armour_rear_uses_side() {
        let armour = ArmourSpec {
            hull_front: 4,
            hull_side: 2,
            turret_front: 3,
            turret_side: 1,
        };
        assert_eq!(armour.value(Mount::Hull, Facing::Rear), 2);
        assert_eq!(armour.value(Mount::Turret, Facing::Front), 3);
    }

    #[test]
    fn test_calibre_keys() {
        let mut weapon = WeaponStats {
            name: "test".into(),
            kind: WeaponKind::Gun,
            calibre: Some(76),
            barrel: BarrelLength::ExtraLong,
            mount: Mount::Turret,
            max_range: 3,
            rof: 0.0,
            fp: 1,
            firing_group: None,
            ammo_types: vec![AmmoType::Ap],
            max_ammo: 10,
            rr_size: 0,
            operators: vec![],
            loaded: false,
            all_around: false,
        };
        assert_eq!(weapon.calibre_key().as_deref(), Some("76LL"));
        weapon.barrel = BarrelLength::Short;
        assert_eq!(weapon.calibre_key().as_deref(), Some("76S"));
        weapon.calibre = None;
        assert_eq!(weapon.calibre_key(), None);
    }
}
