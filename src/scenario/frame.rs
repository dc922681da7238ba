//! Player-centred frame
//!
//! The player's unit never leaves the origin and its hull always faces
//! direction 0. When it moves, the rest of the map slides past it; when it
//! pivots, the rest of the map turns the other way.

use tracing::{debug, info};

use super::events::SoundEvent;
use super::map::MAP_RADIUS;
use super::phase::Phase;
use super::state::{Scenario, PLAYER};
use crate::core::dice::Dice;
use crate::core::error::IllegalAction;
use crate::core::types::UnitId;
use crate::crew::command::CrewCommand;
use crate::hex::{rotate_direction, HexCoord};
use crate::unit::{MoveDirection, MoveOutcome, Unit};

/// Turn a unit, its facings and its smoke with the frame
fn rotate_unit(unit: &mut Unit, steps: u8) {
    unit.hex = unit.hex.rotate(steps);
    unit.hull_facing = unit.hull_facing.map(|f| rotate_direction(f, steps));
    unit.turret_facing = unit.turret_facing.map(|f| rotate_direction(f, steps));
    rotate_smoke(&mut unit.smoke, steps);
    unit.rotate_hull_down(steps);
    unit.update_covered_hexes();
}

fn rotate_smoke(smoke: &mut [u8; 6], steps: u8) {
    let old = *smoke;
    for (i, level) in old.iter().enumerate() {
        smoke[rotate_direction(i as u8, steps) as usize] = *level;
    }
}

impl Scenario {
    /// Unit ids in map order, bottom of each stack first
    fn stacking_order(&self) -> Vec<UnitId> {
        self.map.hexes().flat_map(|h| h.stack.iter().copied()).collect()
    }

    /// Re-place every unit in its current hex, keeping stack order;
    /// units pushed off the map leave play
    fn restack(&mut self) {
        let order = self.stacking_order();
        self.map.clear();
        for id in order {
            let Some(index) = self.index_of(id) else {
                continue;
            };
            let hex = self.units[index].hex;
            if hex.distance(&HexCoord::ORIGIN) > MAP_RADIUS {
                let name = self.units[index].stats.name.clone();
                info!(unit = %name, "left the map");
                self.notifications.message(format!("{} is out of range", name), Some(id));
                self.units.remove(index);
                self.targets.retain(|t| *t != id);
                continue;
            }
            self.map.place(id, hex);
        }
    }

    /// Slide the map past the player after a move
    fn shift_frame(&mut self, direction: MoveDirection) {
        let toward = match direction {
            MoveDirection::Forward => 3,
            MoveDirection::Reverse => 0,
        };
        for unit in self.units.iter_mut().skip(1) {
            // squad units in the player's hex move with it
            if unit.squad_member && unit.hex == HexCoord::ORIGIN {
                continue;
            }
            unit.hex = unit.hex.adjacent(toward);
            unit.update_covered_hexes();
        }
        self.restack();
    }

    /// Turn the map `steps` clockwise around the player
    fn rotate_frame(&mut self, steps: u8) {
        for unit in self.units.iter_mut().skip(1) {
            rotate_unit(unit, steps);
        }
        rotate_smoke(&mut self.units[PLAYER].smoke, steps);
        self.restack();
    }

    fn require_driver(&self) -> Result<(), IllegalAction> {
        let player = self.player();
        if !player.crew_on(CrewCommand::Drive) {
            return Err(IllegalAction::CommandNotAvailable);
        }
        player.can_move()
    }

    /// Drive the player's unit one hex; ends the Movement phase
    pub fn move_player(&mut self, direction: MoveDirection, dice: &mut dyn Dice) -> Result<MoveOutcome, IllegalAction> {
        self.require_phase(Phase::Movement)?;
        self.require_driver()?;

        let ground = self.weather.ground;
        let outcome = self.player_mut().attempt_move(direction, dice)?;
        let id = self.player().id;
        match outcome {
            MoveOutcome::Moved { bogged } => {
                self.shift_frame(direction);
                let terrain = self.context.day_hex.terrain.roll_terrain(dice);
                let player = self.player_mut();
                player.terrain = terrain;
                player.recalculate_movement(ground);
                if !bogged {
                    player.passive_hull_down(dice);
                }
                self.notifications.sound(Some(id), SoundEvent::Moved);
                self.notifications.message("Moved to a new position", Some(id));
                if bogged {
                    self.notifications.sound(Some(id), SoundEvent::Bogged);
                    self.notifications.message("Bogged down!", Some(id));
                }
                debug!(?direction, ?terrain, bogged, "player moved");
            }
            MoveOutcome::Failed => {
                self.notifications.message("Move failed", Some(id));
            }
            MoveOutcome::BrokeDown => {
                self.notifications.message("Broke down!", Some(id));
                self.player_mut().revalidate_commands();
            }
        }
        self.advance_phase(dice)?;
        Ok(outcome)
    }

    /// Pivot the player's unit `steps` clockwise; the phase continues
    pub fn pivot_player(&mut self, steps: u8, dice: &mut dyn Dice) -> Result<bool, IllegalAction> {
        self.require_phase(Phase::Movement)?;
        self.require_driver()?;
        let steps = steps % 6;
        if steps == 0 {
            return Ok(false);
        }

        let player = self.player_mut();
        player.pivoted = true;
        player.hull_down.clear();
        for weapon in player.weapons.iter_mut() {
            weapon.clear_acquired();
        }
        self.rotate_frame(6 - steps);
        self.player_mut().update_covered_hexes();

        let bogged = self.player_mut().pivot_bog_check(dice);
        if bogged {
            let id = self.player().id;
            self.notifications.sound(Some(id), SoundEvent::Bogged);
            self.notifications.message("Bogged down while pivoting!", Some(id));
        }
        debug!(steps, bogged, "player pivoted");
        Ok(bogged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::units::Catalogue;
    use crate::core::config::EngineConfig;
    use crate::core::dice::{FixedDice, SeededDice};
    use crate::core::types::{Nation, Side};
    use crate::scenario::context::{DayHex, ScenarioContext};

    fn scenario() -> Scenario {
        let catalogue = Catalogue::builtin().unwrap();
        let mut dice = SeededDice::new(21);
        let player = Unit::new(catalogue.get("pzkpfw_iv_d").unwrap(), Side::Player, HexCoord::ORIGIN, 0, &mut dice);
        let context = ScenarioContext::new(DayHex::default(), Nation::Poland, catalogue.roster(Nation::Poland));
        let mut scenario = Scenario::with_player(context, player, EngineConfig::default()).unwrap();
        for (id, hex) in [("7tp", HexCoord::new(0, -2)), ("polish_rifle_squad", HexCoord::new(0, 4))] {
            let unit = Unit::new(catalogue.get(id).unwrap(), Side::Enemy, hex, 3, &mut dice);
            scenario.add_unit(unit);
        }
        scenario.phase = Phase::Movement;
        scenario
    }

    #[test]
    fn test_forward_move_slides_map_and_drops_rear_units() {
        let mut scenario = scenario();
        let tank = scenario.units[1].id;
        // 1 moves; the later 99s skip breakdown, bogging and hull-down
        let mut dice = FixedDice::scripted([1.0], 99.0);
        let outcome = scenario.move_player(MoveDirection::Forward, &mut dice).unwrap();
        assert!(matches!(outcome, MoveOutcome::Moved { .. }));
        assert_eq!(scenario.units.len(), 2);
        assert_eq!(scenario.units[1].hex, HexCoord::new(0, -2).adjacent(3));
        assert_eq!(scenario.map.locate(tank), Some(scenario.units[1].hex));
        assert_eq!(scenario.player().hex, HexCoord::ORIGIN);
        assert_ne!(scenario.phase, Phase::Movement);
    }

    #[test]
    fn test_failed_move_keeps_map() {
        let mut scenario = scenario();
        let mut dice = FixedDice::always(100.0);
        let outcome = scenario.move_player(MoveDirection::Forward, &mut dice).unwrap();
        assert_eq!(outcome, MoveOutcome::Failed);
        assert_eq!(scenario.units.len(), 3);
        assert_eq!(scenario.units[1].hex, HexCoord::new(0, -2));
    }

    #[test]
    fn test_pivot_turns_map_the_other_way() {
        let mut scenario = scenario();
        scenario.units[1].smoke = [1, 0, 0, 0, 0, 0];
        let mut dice = FixedDice::always(99.0);
        scenario.pivot_player(1, &mut dice).unwrap();
        let enemy = &scenario.units[1];
        assert_eq!(enemy.hex, HexCoord::new(0, -2).rotate(5));
        assert_eq!(enemy.hull_facing, Some(rotate_direction(3, 5)));
        assert_eq!(enemy.smoke[5], 1);
        assert_eq!(scenario.player().hull_facing, Some(0));
        assert!(scenario.player().pivoted);
        assert_eq!(scenario.phase, Phase::Movement);
    }

    #[test]
    fn test_move_outside_movement_phase_rejected() {
        let mut scenario = scenario();
        scenario.phase = Phase::Shooting;
        let mut dice = FixedDice::always(1.0);
        assert!(matches!(
            scenario.move_player(MoveDirection::Forward, &mut dice),
            Err(IllegalAction::WrongPhase(_))
        ));
    }
}
