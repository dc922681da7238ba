//! Combat units and their mechanics

pub mod firepower;
pub mod hull_down;
pub mod movement;
#[allow(clippy::module_inception)]
pub mod unit;

pub use firepower::{infantry_destruction_chance, pin_chance, FirepowerOutcome};
pub use movement::{MoveDirection, MoveOutcome, MovementState};
pub use unit::{Unit, MAX_SMOKE};
