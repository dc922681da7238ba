pub mod config;
pub mod dice;
pub mod error;
pub mod types;

pub use config::EngineConfig;
pub use dice::{Dice, FixedDice, SeededDice};
pub use error::{ContentError, EngineError, IllegalAction, Result};
pub use types::{Mount, Nation, Side, UnitId};
