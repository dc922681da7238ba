//! Armoured Command - turn-based hex tactical tank-combat engine

pub mod ai;
pub mod campaign;
pub mod combat;
pub mod content;
pub mod core;
pub mod crew;
pub mod hex;
pub mod scenario;
pub mod unit;
pub mod weapon;
