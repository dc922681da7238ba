//! The scenario aggregate and its phase state machine
//!
//! The player's unit is always `units[0]`, at the origin of the map frame,
//! facing direction 0. Squad units and enemies follow it. Dead and departed
//! units are dropped from the list at resolution points; the player's unit
//! never is.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::context::{Clock, ScenarioContext};
use super::events::{NotificationLog, SoundEvent};
use super::map::{ScenarioMap, ACTIVE_RADIUS};
use super::phase::Phase;
use super::report::{ScenarioOutcome, ScenarioReport};
use crate::ai::execute::{run_allied_action, run_enemy_action};
use crate::campaign::weather::Weather;
use crate::combat::attack::{resolve_pending, Resolution};
use crate::combat::profile::PenetrationEffect;
use crate::core::config::EngineConfig;
use crate::core::dice::Dice;
use crate::core::error::{EngineError, IllegalAction, Result};
use crate::core::types::{Side, UnitId};
use crate::crew::command::CrewCommand;
use crate::crew::personnel::CrewStatus;
use crate::crew::position::PositionKind;
use crate::hex::HexCoord;
use crate::unit::Unit;

/// Index of the player's unit in `Scenario::units`
pub const PLAYER: usize = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub context: ScenarioContext,
    pub config: EngineConfig,
    pub map: ScenarioMap,
    pub units: Vec<Unit>,

    // === TURN STATE ===
    pub turn: u32,
    pub phase: Phase,
    pub active_side: Side,
    pub ambush: bool,
    pub weather: Weather,
    pub clock: Clock,
    /// Scenario minutes since the last weather check
    pub weather_minutes: u32,

    // === PLAYER SELECTION ===
    pub selected_weapon: Option<usize>,
    /// Spotted hostiles the selected weapon can engage
    pub targets: Vec<UnitId>,

    pub finished: bool,
    pub report: ScenarioReport,

    #[serde(skip)]
    pub notifications: NotificationLog,
}

impl Scenario {
    /// A scenario holding only the player's unit (and squad), nothing spawned
    pub fn with_player(context: ScenarioContext, mut player: Unit, config: EngineConfig) -> Result<Self> {
        context.validate()?;
        config.validate().map_err(EngineError::Config)?;

        player.side = Side::Player;
        player.hex = HexCoord::ORIGIN;
        player.hull_facing = player.hull_facing.map(|_| 0);
        player.spotted = true;
        player.update_covered_hexes();

        let weather = context.weather;
        let clock = context.start;
        let mut scenario = Self {
            context,
            config,
            map: ScenarioMap::new(),
            units: Vec::new(),
            turn: 1,
            phase: Phase::Command,
            active_side: Side::Player,
            ambush: false,
            weather,
            clock,
            weather_minutes: 0,
            selected_weapon: None,
            targets: Vec::new(),
            finished: false,
            report: ScenarioReport::default(),
            notifications: NotificationLog::new(),
        };
        scenario.add_unit(player);
        Ok(scenario)
    }

    /// Create a scenario: place the player and squad, spawn the enemy and
    /// roll for an ambush
    pub fn new(context: ScenarioContext, player: Unit, config: EngineConfig, dice: &mut dyn Dice) -> Result<Self> {
        let mut scenario = Self::with_player(context, player, config)?;

        let terrain = scenario.context.day_hex.terrain;
        let ground = scenario.weather.ground;
        let player = scenario.player_mut();
        player.terrain = terrain.roll_terrain(dice);
        player.recalculate_movement(ground);
        if player.is_vehicle() {
            player.passive_hull_down(dice);
        }

        scenario.spawn_squad(dice);
        let spawned = scenario.spawn_enemies(dice)?;
        info!(
            terrain = ?terrain,
            strength = scenario.context.day_hex.strength,
            spawned,
            "scenario started"
        );

        if scenario.roll_ambush(dice) {
            scenario.ambush = true;
            scenario.notifications.message("Ambush! The enemy opens fire first.", None);
            scenario.active_side = Side::Enemy;
            run_enemy_action(&mut scenario, dice);
            scenario.resolve_all(dice);
            scenario.active_side = Side::Player;
        }
        scenario.check_end();
        Ok(scenario)
    }

    // === UNITS ===

    pub fn player(&self) -> &Unit {
        &self.units[PLAYER]
    }

    pub fn player_mut(&mut self) -> &mut Unit {
        &mut self.units[PLAYER]
    }

    pub fn index_of(&self, id: UnitId) -> Option<usize> {
        self.units.iter().position(|u| u.id == id)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Put a unit into play in its current hex; returns its index, or
    /// `None` when the hex is off the map
    pub fn add_unit(&mut self, mut unit: Unit) -> Option<usize> {
        if !self.map.place(unit.id, unit.hex) {
            warn!(unit = %unit.stats.name, hx = unit.hex.hx, hy = unit.hex.hy, "refused unit off the map");
            return None;
        }
        unit.update_covered_hexes();
        self.units.push(unit);
        Some(self.units.len() - 1)
    }

    /// Take a unit out of play; the player's unit is never removed
    pub fn remove_unit(&mut self, index: usize) -> Option<Unit> {
        if index == PLAYER || index >= self.units.len() {
            return None;
        }
        let unit = self.units.remove(index);
        self.map.remove(unit.id);
        self.targets.retain(|t| *t != unit.id);
        Some(unit)
    }

    /// Move a unit to `hex`, keeping the map stacks in step
    pub fn relocate_unit(&mut self, index: usize, hex: HexCoord) -> bool {
        let id = self.units[index].id;
        if !self.map.relocate(id, hex) {
            return false;
        }
        let unit = &mut self.units[index];
        unit.hex = hex;
        unit.update_covered_hexes();
        true
    }

    /// Living enemy units within the active rings
    pub fn active_enemies(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| {
            u.alive && u.side == Side::Enemy && u.hex.distance(&HexCoord::ORIGIN) <= ACTIVE_RADIUS
        })
    }

    /// Indices of living enemy units, in list order
    pub fn enemy_indices(&self) -> Vec<usize> {
        (0..self.units.len())
            .filter(|&i| self.units[i].alive && self.units[i].side == Side::Enemy)
            .collect()
    }

    /// Indices of living squad units, in list order
    pub fn squad_indices(&self) -> Vec<usize> {
        (0..self.units.len())
            .filter(|&i| self.units[i].alive && self.units[i].squad_member)
            .collect()
    }

    // === PHASES ===

    /// Whether the current phase waits for player input
    pub fn phase_needs_input(&self) -> bool {
        if self.finished {
            return false;
        }
        let player = self.player();
        match self.phase {
            Phase::Command => true,
            Phase::CrewAction => player.crew_on(CrewCommand::ManageReadyRack),
            Phase::Movement => player.crew_on(CrewCommand::Drive) && player.can_move().is_ok(),
            Phase::Shooting => {
                player.crew_on(CrewCommand::OperateGun) || player.crew_on(CrewCommand::OperateMg)
            }
            _ => false,
        }
    }

    /// Leave the current phase and enter the next one
    ///
    /// Exactly one phase is advanced per call. Entering an automatic phase
    /// runs its work (spotting, crew actions, AI activations); the caller
    /// decides whether to keep advancing.
    pub fn advance_phase(&mut self, dice: &mut dyn Dice) -> std::result::Result<Phase, IllegalAction> {
        if self.finished {
            return Err(IllegalAction::ScenarioFinished);
        }
        self.resolve_all(dice);
        if self.check_end() {
            return Ok(self.phase);
        }

        let next = self.phase.next();
        if next == Phase::Command {
            self.turn += 1;
            self.end_of_turn(dice);
            if self.check_end() {
                return Ok(self.phase);
            }
        }
        self.phase = next;
        debug!(turn = self.turn, phase = next.name(), "phase");

        match next {
            Phase::Command => {
                self.active_side = Side::Player;
                self.player_mut().revalidate_commands();
            }
            Phase::Spotting => self.run_spotting(dice),
            Phase::CrewAction => self.run_crew_actions(dice),
            Phase::Movement => {
                self.player_mut().moving = false;
            }
            Phase::Shooting => self.refresh_targets(),
            Phase::CloseCombat => {}
            Phase::AlliedAction => run_allied_action(self, dice),
            Phase::EnemyAction => {
                self.active_side = Side::Enemy;
                run_enemy_action(self, dice);
            }
        }
        self.check_end();
        Ok(self.phase)
    }

    /// Advance through automatic phases until one waits for the player
    pub fn run_to_next_input(&mut self, dice: &mut dyn Dice) -> std::result::Result<Phase, IllegalAction> {
        loop {
            self.advance_phase(dice)?;
            if self.finished || self.phase_needs_input() {
                return Ok(self.phase);
            }
        }
    }

    pub fn require_phase(&self, phase: Phase) -> std::result::Result<(), IllegalAction> {
        if self.finished {
            return Err(IllegalAction::ScenarioFinished);
        }
        if self.phase != phase {
            return Err(IllegalAction::WrongPhase(self.phase.name().to_string()));
        }
        Ok(())
    }

    // === RESOLUTION ===

    /// Resolve queued armour hits and firepower on every unit, credit
    /// kills and drop the dead
    pub fn resolve_all(&mut self, dice: &mut dyn Dice) {
        let player_id = self.player().id;
        for i in (0..self.units.len()).rev() {
            let queued = !self.units[i].ap_hits_to_resolve.is_empty() || self.units[i].fp_to_resolve > 0;
            if !self.units[i].alive || !queued {
                continue;
            }
            let resolution = resolve_pending(&mut self.units[i], dice);
            self.report_resolution(i, &resolution);
            if !self.units[i].alive {
                self.record_loss(i, player_id);
            }
        }
        for i in (1..self.units.len()).rev() {
            if !self.units[i].alive {
                self.remove_unit(i);
            }
        }
    }

    fn report_resolution(&mut self, index: usize, resolution: &Resolution) {
        let unit = &self.units[index];
        let (id, name) = (unit.id, unit.stats.name.clone());
        for error in &resolution.content_errors {
            self.notifications
                .message(format!("Hit on {} could not be resolved: {}", name, error), Some(id));
        }
        for outcome in &resolution.armour {
            let text = match outcome.effect {
                None => format!("{}: no penetration", name),
                Some(effect) => format!("{}: penetrated, {}", name, effect.name()),
            };
            self.notifications.message(text, Some(id));
            if outcome.effect.is_some() {
                self.notifications.sound(Some(id), SoundEvent::Penetrated);
            }
            if index == PLAYER {
                for (crewman, wound) in &outcome.wounds {
                    self.notifications
                        .message(format!("{}: {}", crewman, wound.describe()), Some(id));
                }
                if outcome.effect == Some(PenetrationEffect::Immobilized) {
                    warn!(unit = %name, "player immobilized");
                }
            }
        }
        if let Some(fp) = &resolution.firepower {
            if fp.pinned {
                self.notifications.message(format!("{} is pinned down", name), Some(id));
            }
            if index == PLAYER {
                for (crewman, wound) in &fp.wounds {
                    self.notifications
                        .message(format!("{}: {}", crewman, wound.describe()), Some(id));
                }
            }
        }
    }

    /// Bookkeeping for a unit that has just been knocked out
    fn record_loss(&mut self, index: usize, player_id: UnitId) {
        let unit = &self.units[index];
        let (id, name) = (unit.id, unit.stats.name.clone());
        self.notifications.message(format!("{} destroyed", name), Some(id));
        self.notifications.sound(Some(id), SoundEvent::Destroyed);

        if unit.side == Side::Enemy {
            let credit = unit
                .last_hit_by
                .filter(|(attacker, _)| *attacker == player_id)
                .and_then(|(_, weapon)| self.units[PLAYER].operator_of(weapon).flatten());
            self.report.record_kill(&unit.stats, self.context.mission, credit);
            info!(unit = %name, vp = self.report.victory_points, "enemy destroyed");
        } else if unit.squad_member {
            self.report.friendly_losses += 1;
            info!(unit = %name, "squad unit lost");
        }
    }

    // === END CONDITIONS ===

    /// Check every end condition; true once the scenario is finished
    pub fn check_end(&mut self) -> bool {
        if self.finished {
            return true;
        }
        let player = self.player();
        let commander_dead = player
            .positions
            .iter()
            .find(|p| p.kind.is_commander())
            .and_then(|p| p.crewman.as_ref())
            .is_some_and(|c| c.status() == CrewStatus::Dead);

        let outcome = if commander_dead {
            Some(ScenarioOutcome::CommanderKilled)
        } else if player.crew_all_dead() {
            Some(ScenarioOutcome::CrewKilled)
        } else if player.abandoned {
            Some(ScenarioOutcome::PlayerAbandoned)
        } else if !player.alive {
            Some(ScenarioOutcome::PlayerDestroyed)
        } else if player.immobilized {
            Some(ScenarioOutcome::PlayerImmobilized)
        } else if self.active_enemies().next().is_none() {
            Some(ScenarioOutcome::Victory)
        } else {
            None
        };

        match outcome {
            Some(outcome) => {
                self.finish(outcome);
                true
            }
            None => false,
        }
    }

    fn finish(&mut self, outcome: ScenarioOutcome) {
        if outcome == ScenarioOutcome::CrewKilled {
            self.player_mut().destroy();
        }
        self.finished = true;
        self.report.outcome = Some(outcome);
        self.report.turns = self.turn;
        self.award_experience();
        self.notifications.message(outcome.message(), None);
        info!(
            outcome = ?outcome,
            turns = self.turn,
            vp = self.report.victory_points,
            "scenario finished"
        );
    }

    /// Experience for the player's crew: one point each for surviving,
    /// two more per kill for the crewman who made it
    fn award_experience(&mut self) {
        let credits = self.report.kill_credits.clone();
        let player = &mut self.units[PLAYER];
        for (i, position) in player.positions.iter_mut().enumerate() {
            let Some(crewman) = position.crewman.as_mut().filter(|c| c.is_alive()) else {
                continue;
            };
            let kills = credits.iter().filter(|c| **c == i).count() as u32;
            let base = 1 + 2 * kills;
            let levels = crewman.award_exp(base);
            self.report.experience.push((crewman.name.clone(), crewman.exp, levels));
        }
    }

    /// Whether the player's commander can still act
    pub fn commander_active(&self) -> bool {
        self.player()
            .positions
            .iter()
            .any(|p| matches!(p.kind, PositionKind::Commander | PositionKind::CommanderGunner) && p.can_act())
    }

    // === PERSISTENCE ===

    /// Serialize at a phase boundary; notifications are not saved
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut scenario: Scenario = serde_json::from_str(json)?;
        scenario.map.rebuild_index();
        Ok(scenario)
    }
}
