//! Player actions, grouped by the phase that allows them

use tracing::{debug, info};

use super::events::SoundEvent;
use super::phase::Phase;
use super::report::ScenarioOutcome;
use super::state::{Scenario, PLAYER};
use crate::combat::attack::{build_attack_profile, execute_attack, AttackOutcome};
use crate::combat::check::{check_attack, CheckOptions};
use crate::combat::point_fire::FireOverrides;
use crate::combat::profile::AttackProfile;
use crate::content::units::AmmoType;
use crate::core::dice::Dice;
use crate::core::error::IllegalAction;
use crate::core::types::UnitId;
use crate::crew::command::CrewCommand;
use crate::crew::position::PositionKind;

/// Hull-relative edges a smoke grenade screens
const GRENADE_EDGES: [u8; 3] = [5, 0, 1];
const MORTAR_EDGES: [u8; 6] = [0, 1, 2, 3, 4, 5];

impl Scenario {
    // === COMMAND PHASE ===

    /// Give a crewman an order
    pub fn set_crew_command(&mut self, position: usize, command: CrewCommand) -> Result<(), IllegalAction> {
        self.require_phase(Phase::Command)?;
        let ground = self.weather.ground;
        let player = self.player_mut();
        player.set_crew_command(position, command)?;
        player.recalculate_movement(ground);
        Ok(())
    }

    /// Open or close a crewman's hatch; returns whether it is now open
    pub fn toggle_hatch(&mut self, position: usize) -> Result<bool, IllegalAction> {
        self.require_phase(Phase::Command)?;
        let ground = self.weather.ground;
        let player = self.player_mut();
        let seat = player
            .positions
            .get_mut(position)
            .ok_or(IllegalAction::UnknownPosition(position))?;
        if seat.crewman.is_none() {
            return Err(IllegalAction::EmptyPosition);
        }
        let open = seat.toggle_hatch()?;
        // vision and crew actions depend on the hatch
        player.revalidate_commands();
        player.assign_default_commands_where_idle();
        player.recalculate_movement(ground);
        Ok(open)
    }

    // === CREW ACTION PHASE ===

    /// Carry out every crew action ordered for this turn
    pub fn run_crew_actions(&mut self, dice: &mut dyn Dice) {
        let orders: Vec<(usize, CrewCommand)> = self
            .player()
            .positions
            .iter()
            .enumerate()
            .filter(|(_, p)| p.can_act())
            .filter_map(|(i, p)| p.crewman.as_ref().map(|c| (i, c.command())))
            .filter(|(_, c)| c.is_crew_action())
            .collect();

        for (position, command) in orders {
            self.crew_action(position, command, dice);
            if self.finished || self.player().abandoned {
                break;
            }
        }
    }

    fn crew_action(&mut self, position: usize, command: CrewCommand, dice: &mut dyn Dice) {
        let id = self.player().id;
        let one_shot = matches!(
            command,
            CrewCommand::SmokeGrenade | CrewCommand::FireSmokeMortar | CrewCommand::Reposition
        );
        match command {
            CrewCommand::AbandonTank => {
                let player = self.player_mut();
                player.abandoned = true;
                info!(unit = %player.stats.name, "crew abandons tank");
                self.notifications.message(ScenarioOutcome::PlayerAbandoned.message(), Some(id));
            }
            CrewCommand::AttemptUnbog => match self.player_mut().attempt_unbog(dice) {
                Ok(true) => self.notifications.message("The tank is free!", Some(id)),
                Ok(false) => self.notifications.message("Still bogged down", Some(id)),
                Err(e) => self.notifications.message(e.to_string(), Some(id)),
            },
            CrewCommand::Reposition => match self.player_mut().reposition(dice) {
                Ok(true) => {
                    self.notifications.sound(Some(id), SoundEvent::Bogged);
                    self.notifications.message("Bogged down while repositioning!", Some(id));
                }
                Ok(false) => {
                    let facing = self.player().hull_facing.unwrap_or(0);
                    if self.player_mut().attempt_hull_down(facing, dice) {
                        self.notifications.message("Repositioned hull down", Some(id));
                    } else {
                        self.notifications.message("Repositioned", Some(id));
                    }
                }
                Err(e) => self.notifications.message(e.to_string(), Some(id)),
            },
            CrewCommand::SmokeGrenade => {
                let player = self.player_mut();
                if player.smoke_grenades > 0 {
                    player.smoke_grenades -= 1;
                    player.add_smoke(&GRENADE_EDGES);
                    self.notifications.sound(Some(id), SoundEvent::Smoke);
                    self.notifications.message("Smoke grenade thrown", Some(id));
                }
            }
            CrewCommand::FireSmokeMortar => {
                let player = self.player_mut();
                if player.smoke_mortar > 0 {
                    player.smoke_mortar -= 1;
                    player.add_smoke(&MORTAR_EDGES);
                    self.notifications.sound(Some(id), SoundEvent::Smoke);
                    self.notifications.message("Smoke mortar fired", Some(id));
                }
            }
            _ => {}
        }
        debug!(position, command = command.name(), "crew action");

        if one_shot {
            let player = self.player_mut();
            if let Some(crewman) = player.positions[position].crewman.as_mut() {
                if let Err(e) = crewman.set_command(CrewCommand::None) {
                    debug!(position, error = %e, "could not clear one-shot command");
                }
            }
            player.revalidate_commands();
            player.assign_default_commands_where_idle();
        }
    }

    /// Move one round of `ammo` into (+1) or out of (-1) the ready rack
    /// of weapon `weapon`
    pub fn manage_ready_rack(&mut self, weapon: usize, ammo: AmmoType, delta: i32) -> Result<(), IllegalAction> {
        self.require_phase(Phase::CrewAction)?;
        let player = self.player_mut();
        let loader_on_rack = player.positions.iter().any(|p| {
            p.kind == PositionKind::Loader
                && p.can_act()
                && p.crewman
                    .as_ref()
                    .is_some_and(|c| c.command() == CrewCommand::ManageReadyRack)
        });
        if !loader_on_rack {
            return Err(IllegalAction::CommandNotAvailable);
        }
        let weapon = player
            .weapons
            .get_mut(weapon)
            .ok_or(IllegalAction::UnknownWeapon(weapon))?;
        if !weapon.stats.ammo_types.contains(&ammo) {
            return Err(IllegalAction::WrongAmmoType);
        }
        weapon.ammo.manage_ready_rack(ammo, delta)
    }

    /// Finish crew actions and move on
    pub fn end_crew_actions(&mut self, dice: &mut dyn Dice) -> Result<Phase, IllegalAction> {
        self.require_phase(Phase::CrewAction)?;
        self.advance_phase(dice)
    }

    // === MOVEMENT PHASE ===

    /// Try for a hull-down position facing the front; ends the phase
    pub fn attempt_player_hull_down(&mut self, dice: &mut dyn Dice) -> Result<bool, IllegalAction> {
        self.require_phase(Phase::Movement)?;
        let player = self.player();
        if !player.crew_on(CrewCommand::Drive) {
            return Err(IllegalAction::CommandNotAvailable);
        }
        player.can_move()?;
        let id = player.id;
        let success = self.player_mut().attempt_hull_down(0, dice);
        if success {
            self.notifications.message("Hull down", Some(id));
        } else {
            self.notifications.message("No hull-down position found", Some(id));
        }
        self.advance_phase(dice)?;
        Ok(success)
    }

    pub fn end_movement(&mut self, dice: &mut dyn Dice) -> Result<Phase, IllegalAction> {
        self.require_phase(Phase::Movement)?;
        self.advance_phase(dice)
    }

    // === SHOOTING PHASE ===

    /// Rebuild the list of spotted enemies the selected weapon can engage
    pub fn refresh_targets(&mut self) {
        self.targets.clear();
        let Some(weapon_index) = self.selected_weapon else {
            return;
        };
        let player = &self.units[PLAYER];
        let Ok(weapon) = player.weapon(weapon_index) else {
            return;
        };
        let ammo = weapon.selected_ammo;
        self.targets = self.units[1..]
            .iter()
            .filter(|u| u.spotted)
            .filter(|u| check_attack(player, weapon_index, u, ammo, CheckOptions::default()).is_ok())
            .map(|u| u.id)
            .collect();
        let weapon_target = player.weapons[weapon_index].selected_target;
        if weapon_target.is_some_and(|t| !self.targets.contains(&t)) {
            self.units[PLAYER].weapons[weapon_index].selected_target = None;
        }
    }

    pub fn select_weapon(&mut self, weapon: usize) -> Result<(), IllegalAction> {
        self.require_phase(Phase::Shooting)?;
        let player = self.player();
        player.weapon(weapon)?;
        if !player.has_operator(weapon) {
            return Err(IllegalAction::NoOperator);
        }
        self.selected_weapon = Some(weapon);
        self.refresh_targets();
        Ok(())
    }

    fn selected_weapon_index(&self) -> Result<usize, IllegalAction> {
        self.selected_weapon.ok_or(IllegalAction::NoWeaponSelected)
    }

    pub fn select_target(&mut self, target: UnitId) -> Result<(), IllegalAction> {
        self.require_phase(Phase::Shooting)?;
        let weapon = self.selected_weapon_index()?;
        if !self.targets.contains(&target) {
            return Err(IllegalAction::TargetGone);
        }
        self.units[PLAYER].weapons[weapon].selected_target = Some(target);
        Ok(())
    }

    pub fn select_ammo(&mut self, ammo: AmmoType) -> Result<(), IllegalAction> {
        self.require_phase(Phase::Shooting)?;
        let weapon = self.selected_weapon_index()?;
        self.units[PLAYER].weapons[weapon].select_ammo(ammo)?;
        self.refresh_targets();
        Ok(())
    }

    pub fn toggle_ready_rack(&mut self) -> Result<bool, IllegalAction> {
        self.require_phase(Phase::Shooting)?;
        let weapon = self.selected_weapon_index()?;
        self.units[PLAYER].weapons[weapon].toggle_ready_rack()
    }

    /// Traverse the turret `steps` clockwise before firing
    pub fn rotate_player_turret(&mut self, steps: u8) -> Result<(), IllegalAction> {
        self.require_phase(Phase::Shooting)?;
        self.player_mut().rotate_turret(steps)?;
        self.refresh_targets();
        Ok(())
    }

    /// Target index and ammo for the current selection
    fn firing_solution(&self) -> Result<(usize, usize, Option<AmmoType>), IllegalAction> {
        let weapon_index = self.selected_weapon_index()?;
        let weapon = self.player().weapon(weapon_index)?;
        let target = weapon.selected_target.ok_or(IllegalAction::NoTargetSelected)?;
        let target_index = self.index_of(target).ok_or(IllegalAction::TargetGone)?;
        let ammo = if weapon.uses_ammo() { weapon.selected_ammo } else { None };
        Ok((weapon_index, target_index, ammo))
    }

    /// The to-hit profile the current selection would roll
    pub fn player_attack_profile(&self) -> Result<AttackProfile, IllegalAction> {
        let (weapon, target, ammo) = self.firing_solution()?;
        let player = self.player();
        check_attack(player, weapon, &self.units[target], ammo, CheckOptions::default())?;
        build_attack_profile(
            player,
            weapon,
            &self.units[target],
            ammo,
            &self.weather,
            FireOverrides::default(),
        )
    }

    /// Fire the selected weapon at the selected target
    ///
    /// A weapon that maintains its rate of fire may fire again this phase.
    pub fn fire(&mut self, dice: &mut dyn Dice) -> Result<AttackOutcome, IllegalAction> {
        self.require_phase(Phase::Shooting)?;
        let (weapon, target, ammo) = self.firing_solution()?;
        let outcome = execute_attack(
            &mut self.units,
            PLAYER,
            weapon,
            target,
            ammo,
            &self.weather,
            &self.config,
            dice,
        )?;

        let target_id = self.units[target].id;
        self.map.promote_to_top(target_id);
        let player_id = self.player().id;
        let sound = if self.player().weapons[weapon].is_mg() {
            SoundEvent::MgFired
        } else {
            SoundEvent::GunFired
        };
        self.notifications.sound(Some(player_id), sound);
        self.notifications.message(outcome.profile.describe(), Some(target_id));
        if outcome.result().is_some_and(|r| r.is_hit()) {
            self.notifications.sound(Some(target_id), SoundEvent::Hit);
        }
        if outcome.rof_maintained {
            self.notifications.message("Rate of fire maintained", Some(player_id));
        }
        self.refresh_targets();
        Ok(outcome)
    }

    pub fn end_shooting(&mut self, dice: &mut dyn Dice) -> Result<Phase, IllegalAction> {
        self.require_phase(Phase::Shooting)?;
        self.selected_weapon = None;
        self.targets.clear();
        self.advance_phase(dice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::units::Catalogue;
    use crate::core::config::EngineConfig;
    use crate::core::dice::{FixedDice, SeededDice};
    use crate::core::types::{Nation, Side};
    use crate::hex::HexCoord;
    use crate::scenario::context::{DayHex, ScenarioContext};
    use crate::unit::Unit;

    fn scenario(enemy: &str, hex: HexCoord) -> Scenario {
        let catalogue = Catalogue::builtin().unwrap();
        let mut dice = SeededDice::new(31);
        let player = Unit::new(catalogue.get("pzkpfw_iii_e").unwrap(), Side::Player, HexCoord::ORIGIN, 0, &mut dice);
        let context = ScenarioContext::new(DayHex::default(), Nation::Poland, catalogue.roster(Nation::Poland));
        let mut scenario = Scenario::with_player(context, player, EngineConfig::default()).unwrap();
        let unit = Unit::new(catalogue.get(enemy).unwrap(), Side::Enemy, hex, 3, &mut dice);
        scenario.add_unit(unit);
        scenario
    }

    fn loader_index(scenario: &Scenario) -> usize {
        scenario.player().position_index(PositionKind::Loader).unwrap()
    }

    #[test]
    fn test_orders_only_in_command_phase() {
        let mut scenario = scenario("7tp", HexCoord::new(0, -2));
        let loader = loader_index(&scenario);
        assert!(scenario.set_crew_command(loader, CrewCommand::ManageReadyRack).is_ok());
        scenario.phase = Phase::Movement;
        assert!(matches!(
            scenario.set_crew_command(loader, CrewCommand::Reload),
            Err(IllegalAction::WrongPhase(_))
        ));
    }

    #[test]
    fn test_unspotted_enemy_not_targetable() {
        let mut scenario = scenario("7tp", HexCoord::new(0, -2));
        scenario.phase = Phase::Shooting;
        scenario.select_weapon(0).unwrap();
        assert!(scenario.targets.is_empty());
        scenario.units[1].spotted = true;
        scenario.refresh_targets();
        assert_eq!(scenario.targets, vec![scenario.units[1].id]);
    }

    #[test]
    fn test_fire_promotes_target_and_spends_round() {
        let mut scenario = scenario("7tp", HexCoord::new(0, -2));
        let decoy = Unit::new(
            Catalogue::builtin().unwrap().get("tks").unwrap(),
            Side::Enemy,
            HexCoord::new(0, -2),
            3,
            &mut SeededDice::new(1),
        );
        scenario.add_unit(decoy);
        scenario.units[1].spotted = true;
        scenario.phase = Phase::Shooting;
        scenario.select_weapon(0).unwrap();
        let target = scenario.units[1].id;
        scenario.select_target(target).unwrap();
        scenario.select_ammo(AmmoType::Ap).unwrap();
        let before = scenario.player().weapons[0].ammo.count(AmmoType::Ap);

        let mut dice = FixedDice::always(50.0);
        scenario.fire(&mut dice).unwrap();
        assert_eq!(scenario.player().weapons[0].ammo.count(AmmoType::Ap), before - 1);
        assert_eq!(scenario.map.top(HexCoord::new(0, -2)), Some(target));
        assert_eq!(scenario.notifications.count_sounds(SoundEvent::GunFired), 1);
    }

    #[test]
    fn test_fire_without_selection() {
        let mut scenario = scenario("7tp", HexCoord::new(0, -2));
        scenario.phase = Phase::Shooting;
        let mut dice = FixedDice::always(50.0);
        assert_eq!(scenario.fire(&mut dice), Err(IllegalAction::NoWeaponSelected));
        scenario.select_weapon(0).unwrap();
        assert_eq!(scenario.fire(&mut dice), Err(IllegalAction::NoTargetSelected));
    }

    #[test]
    fn test_smoke_grenade_is_one_shot() {
        let mut scenario = scenario("7tp", HexCoord::new(0, -2));
        let commander = scenario.player().position_index(PositionKind::Commander).unwrap();
        scenario.set_crew_command(commander, CrewCommand::SmokeGrenade).unwrap();
        let grenades = scenario.player().smoke_grenades;
        let mut dice = FixedDice::always(99.0);
        scenario.run_crew_actions(&mut dice);
        let player = scenario.player();
        assert_eq!(player.smoke_grenades, grenades - 1);
        assert_eq!(player.smoke, [1, 1, 0, 0, 0, 1]);
        let order = player.positions[commander].crewman.as_ref().unwrap().command();
        assert_ne!(order, CrewCommand::SmokeGrenade);
        assert_eq!(scenario.notifications.count_sounds(SoundEvent::Smoke), 1);
    }

    #[test]
    fn test_abandon_ends_scenario() {
        let mut scenario = scenario("7tp", HexCoord::new(0, -2));
        let commander = scenario.player().position_index(PositionKind::Commander).unwrap();
        scenario.set_crew_command(commander, CrewCommand::AbandonTank).unwrap();
        let mut dice = FixedDice::always(99.0);
        scenario.advance_phase(&mut dice).unwrap();
        scenario.advance_phase(&mut dice).unwrap();
        assert!(scenario.finished);
        assert_eq!(scenario.report.outcome, Some(ScenarioOutcome::PlayerAbandoned));
    }

    #[test]
    fn test_ready_rack_needs_loader_order() {
        let mut scenario = scenario("7tp", HexCoord::new(0, -2));
        scenario.phase = Phase::CrewAction;
        assert_eq!(
            scenario.manage_ready_rack(0, AmmoType::Ap, 1),
            Err(IllegalAction::CommandNotAvailable)
        );
    }
}
