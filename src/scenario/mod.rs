//! A single tactical battle around the player's unit
//!
//! The scenario owns the hex map, every unit in play and the phase state
//! machine. Player input arrives through the phase-specific action methods;
//! automatic phases run when entered.

pub mod actions;
pub mod context;
pub mod events;
pub mod frame;
pub mod map;
pub mod phase;
pub mod report;
pub mod spawn;
pub mod spotting;
pub mod state;
pub mod turn;

pub use context::{Clock, DayHex, Mission, ScenarioContext, Support, MAX_STRENGTH, MIN_STRENGTH};
pub use events::{Notification, NotificationLog, SoundEvent};
pub use map::{MapHex, ScenarioMap, ACTIVE_RADIUS, MAP_RADIUS};
pub use phase::Phase;
pub use report::{victory_points, KillCounts, ScenarioOutcome, ScenarioReport};
pub use spawn::{enemy_count, spawn_hexes};
pub use spotting::spot_chance;
pub use state::{Scenario, PLAYER};
pub use turn::{random_event, RandomEvent};
