//! Weapon model: stores, targets and firing arcs

pub mod ammo;
#[allow(clippy::module_inception)]
pub mod weapon;

pub use ammo::{AmmoSource, AmmoStores};
pub use weapon::{AcquiredTarget, Weapon};
