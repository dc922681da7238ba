//! Resolution of accumulated firepower against a unit

use tracing::{debug, info};

use super::unit::Unit;
use crate::content::tables::{
    clamp_chance, soft_vehicle_destruction, FATIGUE_STEP, INFANTRY_DESTRUCTION_BASE,
    INFANTRY_DESTRUCTION_GROWTH, INFANTRY_DESTRUCTION_STEP, PIN_MORALE_STEP, PIN_TEST_PER_FP,
    UNPIN_BASE,
};
use crate::content::units::UnitCategory;
use crate::core::dice::Dice;
use crate::core::types::Side;
use crate::crew::personnel::WoundResult;

/// Open-hatch crew are exposed to incoming fire
const EXPOSED_CREW_MODIFIER: f32 = 10.0;

/// What a batch of firepower did
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FirepowerOutcome {
    pub fp: u32,
    pub destroyed: bool,
    pub abandoned: bool,
    pub pinned: bool,
    /// Crewman name and wound check for each exposed crewman
    pub wounds: Vec<(String, WoundResult)>,
}

impl FirepowerOutcome {
    pub fn is_empty(&self) -> bool {
        self.fp == 0
    }
}

/// Destruction chance for infantry and guns under `fp` firepower
pub fn infantry_destruction_chance(fp: u32, fatigue: u32) -> f32 {
    let volume: f32 = (1..=fp)
        .map(|n| INFANTRY_DESTRUCTION_STEP * INFANTRY_DESTRUCTION_GROWTH.powi(n as i32 - 1))
        .sum();
    clamp_chance(INFANTRY_DESTRUCTION_BASE + volume + FATIGUE_STEP * fatigue as f32)
}

/// Pin test chance; steadier units shrug off more fire
pub fn pin_chance(fp: u32, morale: u8) -> f32 {
    clamp_chance(fp as f32 * PIN_TEST_PER_FP - (morale as f32 - 5.0) * PIN_MORALE_STEP)
}

impl Unit {
    /// Resolve and clear `fp_to_resolve`
    pub fn resolve_firepower(&mut self, dice: &mut dyn Dice) -> FirepowerOutcome {
        let fp = std::mem::take(&mut self.fp_to_resolve);
        let mut outcome = FirepowerOutcome {
            fp,
            ..Default::default()
        };
        if fp == 0 || !self.alive {
            return outcome;
        }

        match self.category() {
            UnitCategory::Infantry | UnitCategory::Gun => {
                let chance = infantry_destruction_chance(fp, self.fatigue);
                if dice.chance(chance) {
                    outcome.destroyed = true;
                } else {
                    self.fatigue += 1;
                    if !self.pinned && dice.chance(pin_chance(fp, self.stats.morale)) {
                        self.pinned = true;
                        outcome.pinned = true;
                    }
                }
                debug!(unit = %self.stats.name, fp, chance, destroyed = outcome.destroyed, "firepower resolved");
            }
            _ if !self.is_armoured() => {
                let chance = soft_vehicle_destruction(fp);
                outcome.destroyed = chance > 0.0 && dice.chance(chance);
                debug!(unit = %self.stats.name, fp, chance, destroyed = outcome.destroyed, "firepower resolved");
            }
            _ => {
                for position in self.positions.iter_mut().filter(|p| p.hatch_open()) {
                    if let Some(crewman) = position.crewman.as_mut().filter(|c| c.is_alive()) {
                        let result = crewman.wound_check(fp, EXPOSED_CREW_MODIFIER, dice);
                        outcome.wounds.push((crewman.name.clone(), result));
                    }
                }
                self.revalidate_commands();
                // only AI crews bail out of an intact vehicle here
                if (self.side == Side::Enemy || self.squad_member) && self.crew_incapacitated() {
                    outcome.abandoned = true;
                    outcome.destroyed = true;
                }
            }
        }

        if outcome.destroyed {
            info!(unit = %self.stats.name, fp, abandoned = outcome.abandoned, "unit knocked out by firepower");
            self.destroy();
        }
        outcome
    }

    /// Pinned units try to recover at the end of the turn
    pub fn unpin_check(&mut self, dice: &mut dyn Dice) -> bool {
        if !self.pinned {
            return false;
        }
        let chance = clamp_chance(UNPIN_BASE + self.stats.morale as f32 * PIN_MORALE_STEP);
        if dice.chance(chance) {
            self.pinned = false;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::units::Catalogue;
    use crate::core::dice::{FixedDice, SeededDice};
    use crate::crew::personnel::CrewStatus;
    use crate::hex::HexCoord;

    fn unit(type_id: &str, side: Side) -> Unit {
        let catalogue = Catalogue::builtin().unwrap();
        let mut dice = SeededDice::new(21);
        Unit::new(catalogue.get(type_id).unwrap(), side, HexCoord::new(0, -1), 3, &mut dice)
    }

    #[test]
    fn test_infantry_chance_grows_with_fp_and_fatigue() {
        assert!((infantry_destruction_chance(1, 0) - 10.0).abs() < 1e-4);
        assert!((infantry_destruction_chance(2, 0) - 15.25).abs() < 1e-4);
        assert!(infantry_destruction_chance(2, 2) > infantry_destruction_chance(2, 0));
        assert_eq!(infantry_destruction_chance(100, 0), 97.0);
    }

    #[test]
    fn test_pin_chance_scales_with_morale() {
        assert_eq!(pin_chance(4, 5), 40.0);
        assert_eq!(pin_chance(4, 7), 30.0);
        assert_eq!(pin_chance(0, 9), 3.0);
    }

    #[test]
    fn test_infantry_survives_then_pins() {
        let mut squad = unit("polish_rifle_squad", Side::Enemy);
        squad.fp_to_resolve = 4;
        // destruction roll misses, pin roll 5 passes
        let mut dice = FixedDice::scripted([90.0, 5.0], 99.0);
        let outcome = squad.resolve_firepower(&mut dice);
        assert!(!outcome.destroyed);
        assert!(outcome.pinned);
        assert_eq!(squad.fatigue, 1);
        assert_eq!(squad.fp_to_resolve, 0);
        assert!(squad.alive);
    }

    #[test]
    fn test_infantry_destroyed() {
        let mut squad = unit("polish_rifle_squad", Side::Enemy);
        squad.fp_to_resolve = 4;
        let mut dice = FixedDice::always(1.0);
        assert!(squad.resolve_firepower(&mut dice).destroyed);
        assert!(!squad.alive);
    }

    #[test]
    fn test_soft_vehicle_table() {
        let mut truck = unit("polish_truck", Side::Enemy);
        truck.fp_to_resolve = 1;
        let mut dice = FixedDice::always(15.0);
        assert!(!truck.resolve_firepower(&mut dice).destroyed);
        truck.fp_to_resolve = 2;
        assert!(truck.resolve_firepower(&mut dice).destroyed);
    }

    #[test]
    fn test_armoured_vehicle_only_wounds_exposed_crew() {
        let mut tank = unit("pzkpfw_iii_e", Side::Player);
        for position in tank.positions.iter_mut() {
            if position.hatch.is_some() {
                position.hatch = Some(false);
            }
        }
        tank.fp_to_resolve = 6;
        let mut dice = FixedDice::always(99.0);
        let outcome = tank.resolve_firepower(&mut dice);
        assert!(outcome.wounds.is_empty());
        assert!(tank.alive);

        let cmdr = tank.position_index(crate::crew::position::PositionKind::Commander).unwrap();
        tank.positions[cmdr].hatch = Some(true);
        tank.fp_to_resolve = 6;
        let outcome = tank.resolve_firepower(&mut dice);
        assert_eq!(outcome.wounds.len(), 1);
        assert_eq!(outcome.wounds[0].1.status, CrewStatus::Dead);
        // the player's own tank is never abandoned by this path
        assert!(tank.alive);
    }

    #[test]
    fn test_unpin() {
        let mut squad = unit("polish_rifle_squad", Side::Enemy);
        squad.pinned = true;
        let mut dice = FixedDice::always(60.0);
        assert!(squad.unpin_check(&mut dice));
        assert!(!squad.pinned);
    }
}
