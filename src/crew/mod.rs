//! Crew model: positions, crewmen and their commands

pub mod command;
pub mod personnel;
pub mod position;

pub use command::{available_commands, default_command, CommandContext, CrewCommand};
pub use personnel::{exp_for_level, CrewStats, CrewStatus, Personnel, WoundResult, WoundSeverity};
pub use position::{Position, PositionKind, PositionTemplate};
