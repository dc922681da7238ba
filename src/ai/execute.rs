//! Carrying out AI activations against a live scenario

use tracing::{debug, info};

use super::disposition::{roll_disposition, Disposition};
use super::movement::{choose_destination, EXIT_RING};
use super::scoring::{best_attack, score_attacks, Reorientation, ScoredAttack, TargetFilter};
use crate::combat::attack::{execute_attack, AttackOutcome};
use crate::core::dice::Dice;
use crate::core::types::UnitId;
use crate::hex::{steps_between, HexCoord};
use crate::scenario::events::SoundEvent;
use crate::scenario::state::{Scenario, PLAYER};
use crate::unit::{MoveDirection, MoveOutcome};

/// What one unit did with its activation
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    pub unit: UnitId,
    pub disposition: Disposition,
    pub moved_to: Option<HexCoord>,
    /// Withdrew or drove off the map
    pub left_play: bool,
    pub attacks: Vec<AttackOutcome>,
}

/// Activate every living squad unit, last first
pub fn run_allied_action(scenario: &mut Scenario, dice: &mut dyn Dice) {
    for index in scenario.squad_indices().into_iter().rev() {
        activate(scenario, index, dice);
    }
}

/// Activate every living enemy unit, last first
pub fn run_enemy_action(scenario: &mut Scenario, dice: &mut dyn Dice) {
    for index in scenario.enemy_indices().into_iter().rev() {
        activate(scenario, index, dice);
        if scenario.finished {
            break;
        }
    }
}

/// Roll a disposition for `scenario.units[index]` and act on it
pub fn activate(scenario: &mut Scenario, index: usize, dice: &mut dyn Dice) -> Option<Activation> {
    let unit = scenario.units.get(index)?;
    if index == PLAYER || !unit.alive || unit.abandoned {
        return None;
    }
    let distance = unit.hex.distance(&HexCoord::ORIGIN);
    let mut disposition = roll_disposition(unit, distance, dice);
    // pinned units hold their ground
    if disposition == Disposition::Movement && unit.pinned {
        disposition = Disposition::None;
    }

    let mut activation = Activation {
        unit: unit.id,
        disposition,
        moved_to: None,
        left_play: false,
        attacks: Vec::new(),
    };
    match disposition {
        Disposition::Withdraw => {
            withdraw(scenario, index);
            activation.left_play = true;
        }
        Disposition::Movement => {
            let (moved_to, left) = move_unit(scenario, index, dice);
            activation.moved_to = moved_to;
            activation.left_play = left;
        }
        Disposition::AttackPlayer => {
            activation.attacks = attack(scenario, index, TargetFilter::Only(PLAYER), dice);
        }
        Disposition::HarassPlayer => {
            activation.attacks = attack(scenario, index, TargetFilter::AreaOnly(PLAYER), dice);
        }
        Disposition::Combat => {
            activation.attacks = attack(scenario, index, TargetFilter::NearestExcept(PLAYER), dice);
        }
        Disposition::None => {}
    }
    Some(activation)
}

fn withdraw(scenario: &mut Scenario, index: usize) {
    if let Some(unit) = scenario.remove_unit(index) {
        info!(unit = %unit.stats.name, "withdrew");
        scenario
            .notifications
            .message(format!("{} withdraws", unit.stats.name), Some(unit.id));
    }
}

/// Try to move one hex; returns the new hex and whether the unit left play
fn move_unit(scenario: &mut Scenario, index: usize, dice: &mut dyn Dice) -> (Option<HexCoord>, bool) {
    let Some(destination) = choose_destination(&scenario.units, index, HexCoord::ORIGIN, dice) else {
        return (None, false);
    };
    let unit = &scenario.units[index];
    if let (Some(facing), Some(direction)) = (unit.hull_facing, unit.hex.direction_to(&destination)) {
        let steps = steps_between(facing, direction);
        if steps > 0 && !pivot(scenario, index, steps, dice) {
            return (None, false);
        }
    }
    let unit = &mut scenario.units[index];
    let outcome = match unit.attempt_move(MoveDirection::Forward, dice) {
        Ok(outcome) => outcome,
        Err(e) => {
            debug!(unit = %unit.stats.name, error = %e, "cannot move");
            return (None, false);
        }
    };
    let MoveOutcome::Moved { bogged } = outcome else {
        return (None, false);
    };

    let id = unit.id;
    if destination.distance(&HexCoord::ORIGIN) >= EXIT_RING {
        withdraw(scenario, index);
        return (Some(destination), true);
    }
    scenario.relocate_unit(index, destination);
    let terrain = scenario.context.day_hex.terrain.roll_terrain(dice);
    let ground = scenario.weather.ground;
    let unit = &mut scenario.units[index];
    unit.terrain = terrain;
    unit.recalculate_movement(ground);
    if unit.is_vehicle() && !bogged {
        unit.passive_hull_down(dice);
    }
    debug!(unit = %unit.stats.name, hx = destination.hx, hy = destination.hy, bogged, "ai moved");
    if unit.spotted {
        scenario.notifications.sound(Some(id), SoundEvent::Moved);
    }
    (Some(destination), false)
}

/// Pivot in place and roll for bogging; false when the unit cannot carry on
fn pivot(scenario: &mut Scenario, index: usize, steps: u8, dice: &mut dyn Dice) -> bool {
    let unit = &mut scenario.units[index];
    if let Err(e) = unit.pivot_in_place(steps) {
        debug!(unit = %unit.stats.name, error = %e, "cannot pivot");
        return false;
    }
    if !unit.pivot_bog_check(dice) {
        return true;
    }
    let (id, name, spotted) = (unit.id, unit.stats.name.clone(), unit.spotted);
    if spotted {
        scenario.notifications.sound(Some(id), SoundEvent::Bogged);
        scenario
            .notifications
            .message(format!("{} bogged down while pivoting", name), Some(id));
    }
    false
}

/// Face the weapon toward the target as the option requires
fn reorient(scenario: &mut Scenario, index: usize, option: &ScoredAttack, dice: &mut dyn Dice) -> bool {
    match option.reorientation {
        Reorientation::None => true,
        Reorientation::Pivot(steps) => pivot(scenario, index, steps, dice),
        Reorientation::RotateTurret(steps) => scenario.units[index].rotate_turret(steps).is_ok(),
    }
}

/// Fire the best option, then keep firing while rate of fire holds
fn attack(scenario: &mut Scenario, index: usize, filter: TargetFilter, dice: &mut dyn Dice) -> Vec<AttackOutcome> {
    let options = score_attacks(
        &scenario.units,
        index,
        filter,
        &scenario.weather,
        scenario.config.ai_min_attack_score,
    );
    let Some(option) = best_attack(&options).copied() else {
        return Vec::new();
    };
    if !reorient(scenario, index, &option, dice) {
        return Vec::new();
    }

    let mut outcomes = Vec::new();
    let max_shots = 1 + scenario.config.ai_max_follow_up_shots as usize;
    while outcomes.len() < max_shots {
        let outcome = match execute_attack(
            &mut scenario.units,
            index,
            option.weapon_index,
            option.target,
            option.ammo,
            &scenario.weather,
            &scenario.config,
            dice,
        ) {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!(error = %e, "ai attack stopped");
                break;
            }
        };
        announce(scenario, index, option.target, option.weapon_index, &outcome);
        let again = outcome.rof_maintained;
        outcomes.push(outcome);
        if !again {
            break;
        }
    }
    outcomes
}

fn announce(scenario: &mut Scenario, attacker: usize, target: usize, weapon: usize, outcome: &AttackOutcome) {
    let attacker_id = scenario.units[attacker].id;
    let target_id = scenario.units[target].id;
    scenario.map.promote_to_top(attacker_id);
    let sound = if scenario.units[attacker].weapons[weapon].is_mg() {
        SoundEvent::MgFired
    } else {
        SoundEvent::GunFired
    };
    scenario.notifications.sound(Some(attacker_id), sound);
    scenario
        .notifications
        .message(outcome.profile.describe(), Some(attacker_id));
    if outcome.result().is_some_and(|r| r.is_hit()) {
        scenario.notifications.sound(Some(target_id), SoundEvent::Hit);
    }
}
