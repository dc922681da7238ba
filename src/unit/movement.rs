//! Movement, bogging, unbogging and breakdown rolls
//!
//! The stored chances exclude the failed-attempt bonus; it is added when
//! a move is rolled.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::unit::Unit;
use crate::campaign::weather::GroundCondition;
use crate::content::skills::Skill;
use crate::content::tables::{
    clamp_chance, BASE_FORWARD_CHANCE, BASE_REVERSE_CHANCE, DIRECT_MOVEMENT_BUTTONED,
    DIRECT_MOVEMENT_OPEN, FAILED_MOVE_BONUS, PIVOT_BOG_WEIGHT, POWERFUL_ENGINE_BONUS,
    QUICK_SHIFTER_BONUS, REPOSITION_BOG_WEIGHT, TACTICIAN_BONUS, WIDE_TRACKS_BOG,
};
use crate::content::terrain::ground_effects;
use crate::content::units::MobilityUpgrade;
use crate::core::dice::Dice;
use crate::core::error::IllegalAction;
use crate::crew::command::CrewCommand;
use crate::crew::position::PositionKind;

const MUD_DOG_FACTOR: f32 = 0.5;
const RELIABLE_TRANSMISSION_FACTOR: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveDirection {
    Forward,
    Reverse,
}

/// Current movement chances and the failed-attempt bonuses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MovementState {
    pub forward_chance: f32,
    pub reverse_chance: f32,
    pub bog_chance: f32,
    pub forward_bonus: f32,
    pub reverse_bonus: f32,
}

impl MovementState {
    pub fn bonus(&self, direction: MoveDirection) -> f32 {
        match direction {
            MoveDirection::Forward => self.forward_bonus,
            MoveDirection::Reverse => self.reverse_bonus,
        }
    }

    /// Chance including the failed-attempt bonus
    pub fn chance(&self, direction: MoveDirection) -> f32 {
        let base = match direction {
            MoveDirection::Forward => self.forward_chance,
            MoveDirection::Reverse => self.reverse_chance,
        };
        if base <= 0.0 {
            return 0.0;
        }
        clamp_chance(base + self.bonus(direction))
    }

    fn reset_bonuses(&mut self) {
        self.forward_bonus = 0.0;
        self.reverse_bonus = 0.0;
    }
}

/// What happened on a move attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The unit relocates; it may have bogged on arrival
    Moved { bogged: bool },
    Failed,
    BrokeDown,
}

impl Unit {
    /// Movement chance before terrain, ground and crew are considered
    fn base_move_modifier(&self, ground: GroundCondition) -> Option<f32> {
        let (class_move, _) = self.stats.movement_class.modifiers()?;
        let mut modifier = class_move;
        if self.stats.has_upgrade(MobilityUpgrade::PowerfulEngine) {
            modifier += POWERFUL_ENGINE_BONUS;
        }
        modifier += self.terrain.effects().movement;
        modifier += ground_effects(ground).0;

        if let Some(position) = self.commander_position() {
            let directing = position.can_act()
                && position
                    .crewman
                    .as_ref()
                    .is_some_and(|c| c.command() == CrewCommand::DirectMovement);
            if directing {
                modifier += if position.hatch_open() {
                    DIRECT_MOVEMENT_OPEN
                } else {
                    DIRECT_MOVEMENT_BUTTONED
                };
                if self.crew_skill(position.kind, Skill::Tactician) {
                    modifier += TACTICIAN_BONUS;
                }
            }
        }
        if self.crew_skill(PositionKind::Driver, Skill::QuickShifter) {
            modifier += QUICK_SHIFTER_BONUS;
        }
        Some(modifier)
    }

    /// Recompute movement and bog chances for current terrain and ground
    pub fn recalculate_movement(&mut self, ground: GroundCondition) {
        let Some(modifier) = self.base_move_modifier(ground) else {
            self.movement.forward_chance = 0.0;
            self.movement.reverse_chance = 0.0;
            self.movement.bog_chance = 0.0;
            return;
        };
        let bog_chance = self.current_bog_chance(ground);
        let state = &mut self.movement;
        state.forward_chance = clamp_chance(BASE_FORWARD_CHANCE + modifier);
        state.reverse_chance = clamp_chance(BASE_REVERSE_CHANCE + modifier);
        state.bog_chance = bog_chance;
    }

    fn current_bog_chance(&self, ground: GroundCondition) -> f32 {
        let class_bog = match self.stats.movement_class.modifiers() {
            Some((_, bog)) if self.stats.movement_class.can_bog() => bog,
            _ => return 0.0,
        };
        let mut bog = self.terrain.effects().bog + ground_effects(ground).1 + class_bog;
        if self.stats.has_upgrade(MobilityUpgrade::WideTracks) {
            bog += WIDE_TRACKS_BOG;
        }
        if self.crew_skill(PositionKind::Driver, Skill::MudDog) {
            bog *= MUD_DOG_FACTOR;
        }
        bog.max(0.0)
    }

    pub fn can_move(&self) -> Result<(), IllegalAction> {
        if self.immobilized || !self.stats.is_mobile() {
            return Err(IllegalAction::Immobilized);
        }
        if self.bogged {
            return Err(IllegalAction::Bogged);
        }
        Ok(())
    }

    /// Roll a move; the caller relocates the unit on `Moved`
    pub fn attempt_move(&mut self, direction: MoveDirection, dice: &mut dyn Dice) -> Result<MoveOutcome, IllegalAction> {
        self.can_move()?;

        // switching direction forfeits the bonus built up the other way
        match direction {
            MoveDirection::Forward => self.movement.reverse_bonus = 0.0,
            MoveDirection::Reverse => self.movement.forward_bonus = 0.0,
        }

        let chance = self.movement.chance(direction);
        let roll = dice.percentile();
        if roll > chance {
            match direction {
                MoveDirection::Forward => self.movement.forward_bonus += FAILED_MOVE_BONUS,
                MoveDirection::Reverse => self.movement.reverse_bonus += FAILED_MOVE_BONUS,
            }
            debug!(unit = %self.stats.name, ?direction, roll, chance, "move failed");
            return Ok(MoveOutcome::Failed);
        }

        if self.breakdown_check(dice) {
            self.movement.reset_bonuses();
            return Ok(MoveOutcome::BrokeDown);
        }

        self.movement.reset_bonuses();
        self.moving = true;
        self.hull_down.clear();
        for weapon in self.weapons.iter_mut() {
            weapon.clear_acquired();
        }
        let bogged = self.bog_check(1.0, dice);
        debug!(unit = %self.stats.name, ?direction, roll, chance, bogged, "moved");
        Ok(MoveOutcome::Moved { bogged })
    }

    /// Mechanical breakdown roll after an otherwise successful move
    pub fn breakdown_check(&mut self, dice: &mut dyn Dice) -> bool {
        let mut chance = self.stats.breakdown_chance;
        if self.stats.has_upgrade(MobilityUpgrade::ReliableTransmission) {
            chance *= RELIABLE_TRANSMISSION_FACTOR;
        }
        if chance <= 0.0 || !dice.chance(chance) {
            return false;
        }
        self.immobilized = true;
        debug!(unit = %self.stats.name, "broke down");
        true
    }

    /// Bog roll at `weight` of the full chance
    pub fn bog_check(&mut self, weight: f32, dice: &mut dyn Dice) -> bool {
        let chance = self.movement.bog_chance * weight;
        if chance <= 0.0 || !dice.chance(chance) {
            return false;
        }
        self.bogged = true;
        self.revalidate_commands();
        debug!(unit = %self.stats.name, chance, "bogged down");
        true
    }

    pub fn pivot_bog_check(&mut self, dice: &mut dyn Dice) -> bool {
        self.bog_check(PIVOT_BOG_WEIGHT, dice)
    }

    pub fn reposition_bog_check(&mut self, dice: &mut dyn Dice) -> bool {
        self.bog_check(REPOSITION_BOG_WEIGHT, dice)
    }

    /// Try to free a bogged unit using the forward move chance
    pub fn attempt_unbog(&mut self, dice: &mut dyn Dice) -> Result<bool, IllegalAction> {
        if !self.bogged {
            return Ok(true);
        }
        if self.immobilized {
            return Err(IllegalAction::Immobilized);
        }
        let chance = self.movement.forward_chance;
        let freed = chance > 0.0 && dice.chance(chance);
        if freed {
            self.bogged = false;
            // the driver's AttemptUnbog is no longer legal
            self.revalidate_commands();
            self.assign_default_commands_where_idle();
        }
        debug!(unit = %self.stats.name, chance, freed, "unbog attempt");
        Ok(freed)
    }

    /// Reposition within the hex: loses hull-down and acquisitions, may bog
    pub fn reposition(&mut self, dice: &mut dyn Dice) -> Result<bool, IllegalAction> {
        self.can_move()?;
        self.hull_down.clear();
        for weapon in self.weapons.iter_mut() {
            weapon.clear_acquired();
        }
        Ok(self.reposition_bog_check(dice))
    }

    /// Crewmen left on `None` go back to their seat's default order
    pub fn assign_default_commands_where_idle(&mut self) {
        let idle: Vec<usize> = self
            .positions
            .iter()
            .enumerate()
            .filter(|(_, p)| p.crewman.as_ref().is_some_and(|c| c.command() == CrewCommand::None))
            .map(|(i, _)| i)
            .collect();
        for i in idle {
            let available = self.available_commands(i);
            let command = crate::crew::command::default_command(self.positions[i].kind, &available);
            if let Some(crewman) = self.positions[i].crewman.as_mut() {
                if let Err(e) = crewman.set_command(command) {
                    debug!(unit = %self.stats.name, position = i, error = %e, "no default command");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::terrain::Terrain;
    use crate::content::units::Catalogue;
    use crate::core::dice::{FixedDice, SeededDice};
    use crate::core::types::Side;
    use crate::hex::HexCoord;

    fn tank(type_id: &str) -> Unit {
        let catalogue = Catalogue::builtin().unwrap();
        let mut dice = SeededDice::new(11);
        let mut unit = Unit::new(catalogue.get(type_id).unwrap(), Side::Player, HexCoord::ORIGIN, 0, &mut dice);
        unit.terrain = Terrain::OpenGround;
        unit.recalculate_movement(GroundCondition::Dry);
        unit
    }

    #[test]
    fn test_open_ground_chances() {
        let unit = tank("pzkpfw_iii_e");
        // commander starts on Direct Fire, so no movement bonus
        assert_eq!(unit.movement.forward_chance, 50.0);
        assert_eq!(unit.movement.reverse_chance, 20.0);
        assert!((unit.movement.bog_chance - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_direct_movement_adds_bonus() {
        let mut unit = tank("pzkpfw_iii_e");
        let cmdr = unit.position_index(PositionKind::Commander).unwrap();
        unit.set_crew_command(cmdr, CrewCommand::DirectMovement).unwrap();
        unit.recalculate_movement(GroundCondition::Dry);
        assert_eq!(unit.movement.forward_chance, 65.0);
    }

    #[test]
    fn test_two_failures_build_forward_bonus() {
        let mut unit = tank("pzkpfw_iii_e");
        let mut dice = FixedDice::always(90.0);
        assert_eq!(unit.attempt_move(MoveDirection::Forward, &mut dice), Ok(MoveOutcome::Failed));
        assert_eq!(unit.attempt_move(MoveDirection::Forward, &mut dice), Ok(MoveOutcome::Failed));
        assert_eq!(unit.movement.forward_bonus, 2.0 * FAILED_MOVE_BONUS);
        assert_eq!(unit.movement.reverse_bonus, 0.0);
        assert_eq!(unit.movement.chance(MoveDirection::Forward), 80.0);
    }

    #[test]
    fn test_switching_direction_resets_bonus() {
        let mut unit = tank("pzkpfw_iii_e");
        let mut dice = FixedDice::always(90.0);
        unit.attempt_move(MoveDirection::Forward, &mut dice).unwrap();
        unit.attempt_move(MoveDirection::Reverse, &mut dice).unwrap();
        assert_eq!(unit.movement.forward_bonus, 0.0);
        assert_eq!(unit.movement.reverse_bonus, FAILED_MOVE_BONUS);
    }

    #[test]
    fn test_success_resets_bonus_and_may_break_down() {
        let mut unit = tank("pzkpfw_iii_e");
        unit.movement.forward_bonus = 30.0;
        // move roll 10 succeeds, breakdown roll 1 <= 2
        let mut dice = FixedDice::scripted([10.0, 1.0], 99.0);
        assert_eq!(unit.attempt_move(MoveDirection::Forward, &mut dice), Ok(MoveOutcome::BrokeDown));
        assert!(unit.immobilized);
        assert_eq!(unit.movement.forward_bonus, 0.0);
        assert_eq!(
            unit.attempt_move(MoveDirection::Forward, &mut dice),
            Err(IllegalAction::Immobilized)
        );
    }

    #[test]
    fn test_bog_after_move_blocks_movement() {
        let mut unit = tank("pzkpfw_iii_e");
        unit.terrain = Terrain::Marsh;
        unit.recalculate_movement(GroundCondition::Muddy);
        // move 1.0, breakdown 50, bog 0.0
        let mut dice = FixedDice::scripted([1.0, 50.0, 0.0], 99.0);
        assert_eq!(
            unit.attempt_move(MoveDirection::Forward, &mut dice),
            Ok(MoveOutcome::Moved { bogged: true })
        );
        assert!(unit.bogged);
        let driver = unit.position_index(PositionKind::Driver).unwrap();
        assert_eq!(unit.positions[driver].crewman.as_ref().unwrap().command(), CrewCommand::None);
        assert!(unit.available_commands(driver).contains(&CrewCommand::AttemptUnbog));
        assert_eq!(unit.pivot_in_place(1), Err(IllegalAction::Bogged));

        let mut dice = FixedDice::always(1.0);
        assert_eq!(unit.attempt_unbog(&mut dice), Ok(true));
        assert!(!unit.bogged);
        assert_eq!(unit.positions[driver].crewman.as_ref().unwrap().command(), CrewCommand::Drive);
    }

    #[test]
    fn test_pivot_bog_uses_quarter_weight() {
        let mut unit = tank("pzkpfw_iii_e");
        unit.movement.bog_chance = 8.0;
        let mut dice = FixedDice::always(2.5);
        assert!(!unit.pivot_bog_check(&mut dice));
        let mut dice = FixedDice::always(1.9);
        assert!(unit.pivot_bog_check(&mut dice));
    }

    #[test]
    fn test_immobile_units_never_move() {
        let catalogue = Catalogue::builtin().unwrap();
        let mut dice = SeededDice::new(2);
        let mut gun = Unit::new(catalogue.get("pak_36").unwrap(), Side::Enemy, HexCoord::new(0, -2), 3, &mut dice);
        gun.recalculate_movement(GroundCondition::Dry);
        assert_eq!(gun.movement.forward_chance, 0.0);
        assert_eq!(gun.movement.bog_chance, 0.0);
        assert_eq!(gun.attempt_move(MoveDirection::Forward, &mut dice), Err(IllegalAction::Immobilized));
    }
}
