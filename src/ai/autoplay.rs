//! Stand-in commander for headless runs: plays the player's input phases

use tracing::debug;

use super::scoring::{best_attack, score_attacks, Reorientation, ScoredAttack, TargetFilter};
use crate::combat::attack::AttackOutcome;
use crate::core::dice::Dice;
use crate::core::error::IllegalAction;
use crate::scenario::phase::Phase;
use crate::scenario::state::{Scenario, PLAYER};

/// Shots the stand-in takes in one Shooting phase at most
const MAX_SHOTS_PER_PHASE: usize = 8;

/// Best shot the player can take without pivoting
pub fn best_player_shot(scenario: &Scenario) -> Option<ScoredAttack> {
    let options: Vec<ScoredAttack> = score_attacks(
        &scenario.units,
        PLAYER,
        TargetFilter::AnyHostile,
        &scenario.weather,
        scenario.config.ai_min_attack_score,
    )
    .into_iter()
    .filter(|o| scenario.units[o.target].spotted)
    .filter(|o| !matches!(o.reorientation, Reorientation::Pivot(s) if s > 0))
    .collect();
    best_attack(&options).copied()
}

fn take_shot(scenario: &mut Scenario, option: &ScoredAttack, dice: &mut dyn Dice) -> Result<AttackOutcome, IllegalAction> {
    if let Reorientation::RotateTurret(steps) = option.reorientation {
        scenario.rotate_player_turret(steps)?;
    }
    let target = scenario.units[option.target].id;
    scenario.select_weapon(option.weapon_index)?;
    if let Some(ammo) = option.ammo {
        scenario.select_ammo(ammo)?;
    }
    scenario.select_target(target)?;
    scenario.fire(dice)
}

fn shoot(scenario: &mut Scenario, dice: &mut dyn Dice) -> usize {
    let mut shots = 0;
    while shots < MAX_SHOTS_PER_PHASE {
        let Some(option) = best_player_shot(scenario) else {
            break;
        };
        match take_shot(scenario, &option, dice) {
            Ok(outcome) => {
                debug!(result = ?outcome.result(), rof = outcome.rof_maintained, "player fired");
                shots += 1;
            }
            Err(e) => {
                debug!(error = %e, "player shot abandoned");
                break;
            }
        }
    }
    shots
}

/// Play the current input phase with default choices, then run on to
/// the next phase that needs input
pub fn play_input_phase(scenario: &mut Scenario, dice: &mut dyn Dice) -> Result<Phase, IllegalAction> {
    if scenario.finished {
        return Err(IllegalAction::ScenarioFinished);
    }
    match scenario.phase {
        Phase::Shooting => {
            shoot(scenario, dice);
            scenario.end_shooting(dice)?;
        }
        Phase::Movement => {
            let player = scenario.player();
            if player.hull_down.is_empty() && player.hull_down_chance() > 0.0 {
                scenario.attempt_player_hull_down(dice)?;
            } else {
                scenario.end_movement(dice)?;
            }
        }
        Phase::CrewAction => {
            scenario.end_crew_actions(dice)?;
        }
        _ => {
            scenario.advance_phase(dice)?;
        }
    }
    if !scenario.finished && !scenario.phase_needs_input() {
        scenario.run_to_next_input(dice)?;
    }
    Ok(scenario.phase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::units::Catalogue;
    use crate::core::config::EngineConfig;
    use crate::core::dice::SeededDice;
    use crate::core::types::{Nation, Side};
    use crate::hex::HexCoord;
    use crate::scenario::context::{DayHex, ScenarioContext};
    use crate::unit::Unit;

    fn scenario() -> Scenario {
        let catalogue = Catalogue::builtin().unwrap();
        let mut dice = SeededDice::new(61);
        let player = Unit::new(catalogue.get("pzkpfw_iv_d").unwrap(), Side::Player, HexCoord::ORIGIN, 0, &mut dice);
        let context = ScenarioContext::new(DayHex::default(), Nation::Poland, catalogue.roster(Nation::Poland));
        let mut scenario = Scenario::with_player(context, player, EngineConfig::default()).unwrap();
        scenario.add_unit(Unit::new(catalogue.get("tks").unwrap(), Side::Enemy, HexCoord::new(0, -2), 3, &mut dice));
        scenario
    }

    #[test]
    fn test_no_shot_at_hidden_enemy() {
        let mut scenario = scenario();
        assert!(best_player_shot(&scenario).is_none());
        scenario.units[1].spotted = true;
        let shot = best_player_shot(&scenario).unwrap();
        assert_eq!(shot.target, 1);
    }

    #[test]
    fn test_autoplay_finishes_or_keeps_cycling() {
        let mut scenario = scenario();
        let mut dice = SeededDice::new(5);
        for _ in 0..40 {
            if scenario.finished {
                break;
            }
            play_input_phase(&mut scenario, &mut dice).unwrap();
        }
        assert!(scenario.finished || scenario.phase_needs_input());
    }
}
