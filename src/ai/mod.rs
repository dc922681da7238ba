//! Computer-controlled units: what they mean to do and how they do it

pub mod autoplay;
pub mod disposition;
pub mod execute;
pub mod movement;
pub mod scoring;

pub use autoplay::{best_player_shot, play_input_phase};
pub use disposition::{roll_disposition, Disposition};
pub use execute::{activate, run_allied_action, run_enemy_action, Activation};
pub use movement::{choose_destination, legal_destinations, EXIT_RING};
pub use scoring::{best_attack, reorientation_for, score_attacks, Reorientation, ScoredAttack, TargetFilter};
