//! Mounted weapons and their per-turn state

use serde::{Deserialize, Serialize};

use super::ammo::{AmmoSource, AmmoStores};
use crate::content::units::{AmmoType, WeaponKind, WeaponStats};
use crate::core::error::IllegalAction;
use crate::core::types::{Mount, UnitId};
use crate::hex::{all_around, covered_arc, HexCoord, ARC_RADIUS};

/// A target this weapon has already hit, and how well it is ranged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquiredTarget {
    pub target: UnitId,
    /// 0 after the first hit, 1 after any further hit
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub stats: WeaponStats,
    pub ammo: AmmoStores,
    pub selected_ammo: Option<AmmoType>,
    /// Draw from the ready rack first
    pub use_ready_rack: bool,
    pub fired: bool,
    pub maintained_rof: bool,
    pub selected_target: Option<UnitId>,
    pub acquired: Option<AcquiredTarget>,
    pub covered_hexes: Vec<HexCoord>,
}

impl Weapon {
    pub fn new(stats: WeaponStats) -> Self {
        let ammo = AmmoStores::new(stats.max_ammo, stats.rr_size);
        let selected_ammo = stats.ammo_types.first().copied();
        Self {
            use_ready_rack: stats.rr_size > 0,
            stats,
            ammo,
            selected_ammo,
            fired: false,
            maintained_rof: false,
            selected_target: None,
            acquired: None,
            covered_hexes: Vec::new(),
        }
    }

    /// New weapon with stores filled in the default mix
    pub fn stocked(stats: WeaponStats) -> Self {
        let mut weapon = Self::new(stats);
        let types = weapon.stats.ammo_types.clone();
        weapon.ammo.stock(&types);
        weapon
    }

    pub fn name(&self) -> &str {
        &self.stats.name
    }

    pub fn kind(&self) -> WeaponKind {
        self.stats.kind
    }

    pub fn is_point_fire(&self) -> bool {
        self.stats.kind.is_point_fire()
    }

    pub fn is_mg(&self) -> bool {
        self.stats.kind.is_mg()
    }

    pub fn mount(&self) -> Mount {
        self.stats.mount
    }

    pub fn calibre(&self) -> Option<u32> {
        self.stats.calibre
    }

    pub fn uses_ammo(&self) -> bool {
        self.stats.uses_ammo()
    }

    /// Facing the weapon points along, given the unit's facings
    pub fn facing(&self, hull_facing: Option<u8>, turret_facing: Option<u8>) -> Option<u8> {
        match self.stats.mount {
            Mount::Turret => turret_facing.or(hull_facing),
            Mount::Hull => hull_facing,
        }
    }

    /// Recompute the hexes this weapon can fire into
    pub fn update_covered_hexes(&mut self, origin: HexCoord, hull_facing: Option<u8>, turret_facing: Option<u8>) {
        let reach = self.stats.max_range.min(ARC_RADIUS);
        self.covered_hexes = match self.facing(hull_facing, turret_facing) {
            Some(facing) if !self.stats.all_around => covered_arc(origin, facing, reach),
            _ => all_around(origin, reach),
        };
    }

    pub fn covers(&self, hex: HexCoord) -> bool {
        self.covered_hexes.contains(&hex)
    }

    /// Select an ammo type this weapon can fire
    pub fn select_ammo(&mut self, ammo: AmmoType) -> Result<(), IllegalAction> {
        if !self.stats.ammo_types.contains(&ammo) {
            return Err(IllegalAction::WrongAmmoType);
        }
        self.selected_ammo = Some(ammo);
        Ok(())
    }

    pub fn toggle_ready_rack(&mut self) -> Result<bool, IllegalAction> {
        if self.stats.rr_size == 0 {
            return Err(IllegalAction::NoReadyRack);
        }
        self.use_ready_rack = !self.use_ready_rack;
        Ok(self.use_ready_rack)
    }

    /// Whether the next shot of `ammo` would come from the ready rack
    pub fn draws_from_ready_rack(&self, ammo: AmmoType) -> bool {
        self.use_ready_rack && self.ammo.ready_rack(ammo) > 0
    }

    /// Ammo check for a shot; weapons without ammunition always pass
    pub fn has_ammo_for(&self, ammo: Option<AmmoType>) -> Result<(), IllegalAction> {
        if !self.uses_ammo() {
            return Ok(());
        }
        let ammo = ammo.ok_or(IllegalAction::NoAmmoSelected)?;
        if !self.stats.ammo_types.contains(&ammo) {
            return Err(IllegalAction::WrongAmmoType);
        }
        if self.ammo.count(ammo) == 0 {
            return Err(IllegalAction::NoAmmo);
        }
        Ok(())
    }

    /// Spend one round of the selected type, if this weapon uses ammunition
    pub fn expend_round(&mut self, ammo: Option<AmmoType>) -> Result<Option<AmmoSource>, IllegalAction> {
        if !self.uses_ammo() {
            return Ok(None);
        }
        let ammo = ammo.ok_or(IllegalAction::NoAmmoSelected)?;
        let prefer_rack = self.use_ready_rack;
        self.ammo.consume(ammo, prefer_rack).map(Some)
    }

    /// Advance acquisition on `target` after a hit
    pub fn acquire(&mut self, target: UnitId) {
        self.acquired = Some(match self.acquired {
            Some(acq) if acq.target == target => AcquiredTarget {
                target,
                level: (acq.level + 1).min(1),
            },
            _ => AcquiredTarget { target, level: 0 },
        });
    }

    pub fn acquired_level(&self, target: UnitId) -> Option<u8> {
        self.acquired
            .filter(|acq| acq.target == target)
            .map(|acq| acq.level)
    }

    pub fn clear_acquired(&mut self) {
        self.acquired = None;
    }

    pub fn reset_for_turn(&mut self) {
        self.fired = false;
        self.maintained_rof = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::units::BarrelLength;

    fn gun() -> WeaponStats {
        WeaponStats {
            name: "7.5 cm KwK 40".into(),
            kind: WeaponKind::Gun,
            calibre: Some(75),
            barrel: BarrelLength::Long,
            mount: Mount::Turret,
            max_range: 3,
            rof: 20.0,
            fp: 1,
            firing_group: Some(0),
            ammo_types: vec![AmmoType::Ap, AmmoType::He],
            max_ammo: 60,
            rr_size: 6,
            operators: vec![],
            loaded: true,
            all_around: false,
        }
    }

    #[test]
    fn test_new_selects_first_ammo() {
        let weapon = Weapon::new(gun());
        assert_eq!(weapon.selected_ammo, Some(AmmoType::Ap));
        assert!(weapon.use_ready_rack);
        assert_eq!(weapon.ammo.total(), 0);
    }

    #[test]
    fn test_acquire_caps_at_one() {
        let mut weapon = Weapon::new(gun());
        let a = UnitId::new();
        let b = UnitId::new();
        weapon.acquire(a);
        assert_eq!(weapon.acquired_level(a), Some(0));
        weapon.acquire(a);
        weapon.acquire(a);
        assert_eq!(weapon.acquired_level(a), Some(1));
        weapon.acquire(b);
        assert_eq!(weapon.acquired_level(a), None);
        assert_eq!(weapon.acquired_level(b), Some(0));
    }

    #[test]
    fn test_covered_hexes_follow_turret() {
        let mut weapon = Weapon::new(gun());
        weapon.update_covered_hexes(HexCoord::ORIGIN, Some(0), Some(3));
        assert!(weapon.covers(HexCoord::new(0, 2)));
        assert!(!weapon.covers(HexCoord::new(0, -2)));
        assert!(weapon.covers(HexCoord::ORIGIN));
    }

    #[test]
    fn test_all_around_covers_everything_in_range() {
        let mut stats = gun();
        stats.all_around = true;
        stats.max_range = 2;
        let mut weapon = Weapon::new(stats);
        weapon.update_covered_hexes(HexCoord::ORIGIN, Some(0), None);
        assert_eq!(weapon.covered_hexes.len(), 19);
    }

    #[test]
    fn test_ammo_checks() {
        let mut weapon = Weapon::new(gun());
        assert_eq!(weapon.has_ammo_for(Some(AmmoType::Ap)), Err(IllegalAction::NoAmmo));
        assert_eq!(weapon.has_ammo_for(Some(AmmoType::Apcr)), Err(IllegalAction::WrongAmmoType));
        assert_eq!(weapon.has_ammo_for(None), Err(IllegalAction::NoAmmoSelected));
        weapon.ammo.load(AmmoType::Ap, 1).unwrap();
        assert!(weapon.has_ammo_for(Some(AmmoType::Ap)).is_ok());
        assert_eq!(weapon.expend_round(Some(AmmoType::Ap)), Ok(Some(AmmoSource::General)));
    }
}
