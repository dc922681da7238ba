//! Ammunition stores: general stowage plus a bounded ready rack
//!
//! Invariants held after every operation:
//! - general + ready rack across all types never exceeds `max_ammo`
//! - the ready rack total never exceeds `rr_size`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::content::units::AmmoType;
use crate::core::error::IllegalAction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AmmoStores {
    general: BTreeMap<AmmoType, u32>,
    ready_rack: BTreeMap<AmmoType, u32>,
    max_ammo: u32,
    rr_size: u32,
}

/// Where a consumed round came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmmoSource {
    ReadyRack,
    General,
}

impl AmmoStores {
    pub fn new(max_ammo: u32, rr_size: u32) -> Self {
        Self {
            general: BTreeMap::new(),
            ready_rack: BTreeMap::new(),
            max_ammo,
            rr_size,
        }
    }

    pub fn max_ammo(&self) -> u32 {
        self.max_ammo
    }

    pub fn rr_size(&self) -> u32 {
        self.rr_size
    }

    pub fn general(&self, ammo: AmmoType) -> u32 {
        self.general.get(&ammo).copied().unwrap_or(0)
    }

    pub fn ready_rack(&self, ammo: AmmoType) -> u32 {
        self.ready_rack.get(&ammo).copied().unwrap_or(0)
    }

    /// Rounds of one type in both stores
    pub fn count(&self, ammo: AmmoType) -> u32 {
        self.general(ammo) + self.ready_rack(ammo)
    }

    pub fn total(&self) -> u32 {
        self.general.values().sum::<u32>() + self.rr_total()
    }

    pub fn rr_total(&self) -> u32 {
        self.ready_rack.values().sum()
    }

    /// Add rounds to general stores, all or nothing
    pub fn load(&mut self, ammo: AmmoType, amount: u32) -> Result<(), IllegalAction> {
        if self.total().checked_add(amount).map_or(true, |t| t > self.max_ammo) {
            return Err(IllegalAction::AmmoCapacityExceeded);
        }
        *self.general.entry(ammo).or_insert(0) += amount;
        Ok(())
    }

    /// Remove rounds from general stores, all or nothing
    pub fn unload(&mut self, ammo: AmmoType, amount: u32) -> Result<(), IllegalAction> {
        let held = self.general(ammo);
        if held < amount {
            return Err(IllegalAction::StoresEmpty);
        }
        self.general.insert(ammo, held - amount);
        Ok(())
    }

    /// Move one round into (+1) or out of (-1) the ready rack
    pub fn manage_ready_rack(&mut self, ammo: AmmoType, delta: i32) -> Result<(), IllegalAction> {
        if self.rr_size == 0 {
            return Err(IllegalAction::NoReadyRack);
        }
        if delta > 0 {
            if self.rr_total() >= self.rr_size {
                return Err(IllegalAction::ReadyRackFull);
            }
            let held = self.general(ammo);
            if held == 0 {
                return Err(IllegalAction::StoresEmpty);
            }
            self.general.insert(ammo, held - 1);
            *self.ready_rack.entry(ammo).or_insert(0) += 1;
        } else if delta < 0 {
            let racked = self.ready_rack(ammo);
            if racked == 0 {
                return Err(IllegalAction::ReadyRackEmpty);
            }
            self.ready_rack.insert(ammo, racked - 1);
            *self.general.entry(ammo).or_insert(0) += 1;
        }
        Ok(())
    }

    /// Take one round, from the ready rack first when `prefer_rack` is set
    pub fn consume(&mut self, ammo: AmmoType, prefer_rack: bool) -> Result<AmmoSource, IllegalAction> {
        let order = if prefer_rack {
            [AmmoSource::ReadyRack, AmmoSource::General]
        } else {
            [AmmoSource::General, AmmoSource::ReadyRack]
        };
        for source in order {
            let store = match source {
                AmmoSource::ReadyRack => &mut self.ready_rack,
                AmmoSource::General => &mut self.general,
            };
            if let Some(count) = store.get_mut(&ammo) {
                if *count > 0 {
                    *count -= 1;
                    return Ok(source);
                }
            }
        }
        Err(IllegalAction::NoAmmo)
    }

    /// Fill general stores in a fixed mix, then top up the ready rack
    pub fn stock(&mut self, types: &[AmmoType]) {
        if types.is_empty() || self.max_ammo == 0 {
            return;
        }
        let share = |ammo: AmmoType| -> u32 {
            match (ammo, types.contains(&AmmoType::Apcr)) {
                (AmmoType::Apcr, _) => 10,
                (AmmoType::Ap, true) => 45,
                (AmmoType::Ap, false) => 50,
                (AmmoType::He, true) => 45,
                (AmmoType::He, false) => 50,
            }
        };
        let weight: u32 = types.iter().map(|a| share(*a)).sum();

        self.general.clear();
        self.ready_rack.clear();
        let mut remaining = self.max_ammo;
        for (i, ammo) in types.iter().enumerate() {
            let amount = if i + 1 == types.len() {
                remaining
            } else {
                (self.max_ammo * share(*ammo) / weight).min(remaining)
            };
            self.general.insert(*ammo, amount);
            remaining -= amount;
        }

        // rack in the same proportions, round-robin
        let mut moved = true;
        while moved && self.rr_total() < self.rr_size {
            moved = false;
            for ammo in types {
                if self.rr_total() < self.rr_size && self.manage_ready_rack(*ammo, 1).is_ok() {
                    moved = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_respects_capacity() {
        let mut stores = AmmoStores::new(60, 6);
        for _ in 0..6 {
            stores.load(AmmoType::Ap, 10).unwrap();
        }
        assert_eq!(stores.load(AmmoType::He, 1), Err(IllegalAction::AmmoCapacityExceeded));
        assert_eq!(stores.total(), 60);
    }

    #[test]
    fn test_ready_rack_fills_to_size() {
        let mut stores = AmmoStores::new(60, 6);
        for _ in 0..5 {
            stores.load(AmmoType::Ap, 10).unwrap();
        }
        for _ in 0..6 {
            assert!(stores.manage_ready_rack(AmmoType::Ap, 1).is_ok());
        }
        assert_eq!(
            stores.manage_ready_rack(AmmoType::Ap, 1),
            Err(IllegalAction::ReadyRackFull)
        );
        assert_eq!(stores.rr_total(), 6);
        assert_eq!(stores.count(AmmoType::Ap), 50);
    }

    #[test]
    fn test_unrack() {
        let mut stores = AmmoStores::new(10, 2);
        stores.load(AmmoType::He, 2).unwrap();
        stores.manage_ready_rack(AmmoType::He, 1).unwrap();
        stores.manage_ready_rack(AmmoType::He, -1).unwrap();
        assert_eq!(
            stores.manage_ready_rack(AmmoType::He, -1),
            Err(IllegalAction::ReadyRackEmpty)
        );
        assert_eq!(stores.general(AmmoType::He), 2);
    }

    #[test]
    fn test_consume_prefers_rack_then_falls_back() {
        let mut stores = AmmoStores::new(10, 2);
        stores.load(AmmoType::Ap, 2).unwrap();
        stores.manage_ready_rack(AmmoType::Ap, 1).unwrap();
        assert_eq!(stores.consume(AmmoType::Ap, true), Ok(AmmoSource::ReadyRack));
        assert_eq!(stores.consume(AmmoType::Ap, true), Ok(AmmoSource::General));
        assert_eq!(stores.consume(AmmoType::Ap, true), Err(IllegalAction::NoAmmo));
    }

    #[test]
    fn test_no_ready_rack() {
        let mut stores = AmmoStores::new(10, 0);
        stores.load(AmmoType::Ap, 2).unwrap();
        assert_eq!(
            stores.manage_ready_rack(AmmoType::Ap, 1),
            Err(IllegalAction::NoReadyRack)
        );
    }

    #[test]
    fn test_stock_fills_exactly() {
        let mut stores = AmmoStores::new(87, 8);
        stores.stock(&[AmmoType::Ap, AmmoType::He, AmmoType::Apcr]);
        assert_eq!(stores.total(), 87);
        assert_eq!(stores.rr_total(), 8);
        assert!(stores.count(AmmoType::Apcr) > 0);
        assert!(stores.ready_rack(AmmoType::Ap) > 0);
    }

    #[test]
    fn test_huge_load_is_refused() {
        let mut stores = AmmoStores::new(50, 6);
        stores.load(AmmoType::Ap, 1).unwrap();
        assert_eq!(
            stores.load(AmmoType::Ap, u32::MAX),
            Err(IllegalAction::AmmoCapacityExceeded)
        );
        assert_eq!(stores.total(), 1);
    }
}
