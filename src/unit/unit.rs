//! A single combat unit: tank, gun, vehicle or infantry team

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::movement::MovementState;
use crate::combat::profile::AttackProfile;
use crate::content::skills::Skill;
use crate::content::tables::{DIRECT_FIRE_BONUS, FIRE_DIRECTION_BONUS};
use crate::content::terrain::Terrain;
use crate::content::units::{Traverse, UnitCategory, UnitStats, WeaponKind};
use crate::core::dice::Dice;
use crate::core::error::IllegalAction;
use crate::core::types::{Mount, Side, UnitId};
use crate::crew::command::{available_commands, default_command, CommandContext, CrewCommand};
use crate::crew::personnel::{CrewStatus, Personnel, WoundSeverity};
use crate::crew::position::{Position, PositionKind};
use crate::hex::{rotate_direction, HexCoord};
use crate::weapon::Weapon;

/// Maximum smoke level on one hex edge
pub const MAX_SMOKE: u8 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub stats: UnitStats,
    pub side: Side,
    pub hex: HexCoord,
    pub hull_facing: Option<u8>,
    /// `None` exactly when the unit has no turret
    pub turret_facing: Option<u8>,
    pub terrain: Terrain,

    // === STATUS ===
    pub alive: bool,
    pub immobilized: bool,
    pub bogged: bool,
    pub pinned: bool,
    pub abandoned: bool,
    pub fp_to_resolve: u32,
    pub ap_hits_to_resolve: Vec<AttackProfile>,
    /// Smoke level per absolute hex edge
    pub smoke: [u8; 6],
    /// Absolute directions protected by a hull-down position
    pub hull_down: Vec<u8>,
    pub spotted: bool,
    pub hit_by_fp: bool,
    pub fatigue: u32,
    pub squad_member: bool,
    pub recalled: bool,
    /// Last unit and weapon to damage this unit, for kill credit
    pub last_hit_by: Option<(UnitId, usize)>,
    pub smoke_grenades: u32,
    pub smoke_mortar: u32,

    // === COLLECTIONS ===
    pub positions: Vec<Position>,
    pub weapons: Vec<Weapon>,

    // === PER TURN ===
    pub moving: bool,
    pub fired: bool,
    pub pivoted: bool,
    pub turret_rotated: bool,
    pub movement: MovementState,
}

impl Unit {
    /// Build a unit from its template with a generated crew and full stores
    pub fn new(stats: &UnitStats, side: Side, hex: HexCoord, facing: u8, dice: &mut dyn Dice) -> Self {
        let positions = stats
            .positions
            .iter()
            .map(|t| Position::crewed(t, stats.nation, dice))
            .collect();
        let weapons = stats.weapons.iter().cloned().map(Weapon::stocked).collect();

        let faced = stats.category != UnitCategory::Infantry;
        let hull_facing = faced.then_some(facing % 6);
        let turret_facing = stats.turret.map(|_| facing % 6);

        let mut unit = Self {
            id: UnitId::new(),
            stats: stats.clone(),
            side,
            hex,
            hull_facing,
            turret_facing,
            terrain: Terrain::OpenGround,
            alive: true,
            immobilized: false,
            bogged: false,
            pinned: false,
            abandoned: false,
            fp_to_resolve: 0,
            ap_hits_to_resolve: Vec::new(),
            smoke: [0; 6],
            hull_down: Vec::new(),
            spotted: side == Side::Player,
            hit_by_fp: false,
            fatigue: 0,
            squad_member: false,
            recalled: false,
            last_hit_by: None,
            smoke_grenades: stats.smoke_grenades,
            smoke_mortar: stats.smoke_mortar,
            positions,
            weapons,
            moving: false,
            fired: false,
            pivoted: false,
            turret_rotated: false,
            movement: MovementState::default(),
        };
        unit.assign_default_commands();
        unit.update_covered_hexes();
        unit
    }

    pub fn name(&self) -> &str {
        &self.stats.name
    }

    pub fn category(&self) -> UnitCategory {
        self.stats.category
    }

    pub fn is_vehicle(&self) -> bool {
        self.stats.is_vehicle()
    }

    pub fn is_armoured(&self) -> bool {
        self.stats.is_armoured()
    }

    pub fn has_turret(&self) -> bool {
        self.stats.turret.is_some()
    }

    pub fn traverse(&self) -> Option<Traverse> {
        self.stats.turret()
    }

    /// Units with no crew positions always count as crewed
    pub fn is_crewed(&self) -> bool {
        !self.positions.is_empty()
    }

    // === CREW ===

    pub fn position(&self, index: usize) -> Result<&Position, IllegalAction> {
        self.positions
            .get(index)
            .ok_or(IllegalAction::UnknownPosition(index))
    }

    pub fn position_index(&self, kind: PositionKind) -> Option<usize> {
        self.positions.iter().position(|p| p.kind == kind)
    }

    pub fn crewman(&self, kind: PositionKind) -> Option<&Personnel> {
        self.positions
            .iter()
            .find(|p| p.kind == kind)
            .and_then(|p| p.crewman.as_ref())
    }

    /// Position of whoever commands the unit
    pub fn commander_position(&self) -> Option<&Position> {
        self.positions.iter().find(|p| p.kind.is_commander())
    }

    /// Every crewman is dead
    pub fn crew_all_dead(&self) -> bool {
        self.is_crewed()
            && self
                .positions
                .iter()
                .all(|p| p.crewman.as_ref().map_or(true, |c| !c.is_alive()))
    }

    /// No crewman is able to act
    pub fn crew_incapacitated(&self) -> bool {
        self.is_crewed() && !self.positions.iter().any(|p| p.can_act())
    }

    /// An acting crewman in `kind` has `skill`
    pub fn crew_skill(&self, kind: PositionKind, skill: Skill) -> bool {
        self.positions
            .iter()
            .filter(|p| p.kind == kind && p.can_act())
            .filter_map(|p| p.crewman.as_ref())
            .any(|c| c.has_skill(skill))
    }

    /// Any acting crewman holds `command`
    pub fn crew_on(&self, command: CrewCommand) -> bool {
        self.positions
            .iter()
            .filter(|p| p.can_act())
            .filter_map(|p| p.crewman.as_ref())
            .any(|c| c.command() == command)
    }

    pub fn command_context(&self, index: usize) -> CommandContext {
        let Some(position) = self.positions.get(index) else {
            return CommandContext::default();
        };
        let kind = position.kind;
        CommandContext {
            operates_gun: self
                .weapons
                .iter()
                .any(|w| w.is_point_fire() && w.stats.operators.contains(&kind)),
            operates_mg: self
                .weapons
                .iter()
                .any(|w| !w.is_point_fire() && w.stats.operators.contains(&kind)),
            serves_gun: self.weapons.iter().any(|w| w.stats.loaded),
            has_ready_rack: self.weapons.iter().any(|w| w.stats.rr_size > 0),
            bogged: self.bogged,
            immobilized: self.immobilized || !self.stats.is_mobile(),
            hatch_open: position.hatch_open(),
            smoke_grenades: self.smoke_grenades,
            smoke_mortar: self.smoke_mortar,
        }
    }

    /// Legal commands for the crewman in position `index`
    pub fn available_commands(&self, index: usize) -> Vec<CrewCommand> {
        match self.positions.get(index) {
            Some(p) if p.can_act() => available_commands(p.kind, &self.command_context(index)),
            _ => vec![CrewCommand::None],
        }
    }

    pub fn set_crew_command(&mut self, index: usize, command: CrewCommand) -> Result<(), IllegalAction> {
        if !self.available_commands(index).contains(&command) {
            return Err(IllegalAction::CommandNotAvailable);
        }
        let crewman = self.positions[index]
            .crewman
            .as_mut()
            .ok_or(IllegalAction::EmptyPosition)?;
        crewman.set_command(command)
    }

    /// Give every crewman the default order for their seat
    pub fn assign_default_commands(&mut self) {
        for i in 0..self.positions.len() {
            let available = self.available_commands(i);
            let kind = self.positions[i].kind;
            let command = default_command(kind, &available);
            if let Some(crewman) = self.positions[i].crewman.as_mut() {
                if let Err(e) = crewman.set_command(command) {
                    debug!(unit = %self.stats.name, position = i, error = %e, "no default command");
                }
            }
        }
    }

    /// Drop commands that are no longer legal, e.g. Drive after bogging
    pub fn revalidate_commands(&mut self) {
        for i in 0..self.positions.len() {
            let available = self.available_commands(i);
            if let Some(crewman) = self.positions[i].crewman.as_mut() {
                if !available.contains(&crewman.command()) {
                    if let Err(e) = crewman.set_command(CrewCommand::None) {
                        debug!(unit = %self.stats.name, position = i, error = %e, "could not clear command");
                    }
                }
            }
        }
    }

    /// Seat a new crewman where the old one is dead or critically wounded
    pub fn replace_crewman(&mut self, index: usize, dice: &mut dyn Dice) -> Result<(), IllegalAction> {
        let nation = self.stats.nation;
        let position = self
            .positions
            .get_mut(index)
            .ok_or(IllegalAction::UnknownPosition(index))?;
        let replaceable = position.crewman.as_ref().map_or(true, |c| {
            c.status() == CrewStatus::Dead || c.wound() == WoundSeverity::Critical
        });
        if !replaceable {
            return Err(IllegalAction::CommandNotAvailable);
        }
        let crewman = Personnel::generate(nation, dice);
        debug!(unit = %self.stats.name, crewman = %crewman.name, "crewman replaced");
        position.crewman = Some(crewman);
        Ok(())
    }

    /// Direct Fire bonus from an acting commander
    pub fn direct_fire_bonus(&self) -> f32 {
        let Some(position) = self.commander_position() else {
            return 0.0;
        };
        let Some(crewman) = position.crewman.as_ref().filter(|_| position.can_act()) else {
            return 0.0;
        };
        if crewman.command() != CrewCommand::DirectFire {
            return 0.0;
        }
        let mut bonus = DIRECT_FIRE_BONUS;
        if crewman.has_skill(Skill::FireDirection) {
            bonus += FIRE_DIRECTION_BONUS;
        }
        bonus
    }

    // === WEAPONS ===

    pub fn weapon(&self, index: usize) -> Result<&Weapon, IllegalAction> {
        self.weapons.get(index).ok_or(IllegalAction::UnknownWeapon(index))
    }

    /// Position index operating weapon `index`; uncrewed units need none
    pub fn operator_of(&self, index: usize) -> Option<Option<usize>> {
        let weapon = self.weapons.get(index)?;
        if !self.is_crewed() {
            return Some(None);
        }
        let command = weapon.kind().operator_command();
        // a gunner on the main gun also works the coaxial MG
        let accepts = |c: CrewCommand| {
            c == command || (weapon.kind() == WeaponKind::CoaxMg && c == CrewCommand::OperateGun)
        };
        self.positions
            .iter()
            .enumerate()
            .find(|(_, p)| {
                weapon.stats.operators.contains(&p.kind)
                    && p.can_act()
                    && p.crewman.as_ref().is_some_and(|c| accepts(c.command()))
            })
            .map(|(i, _)| Some(i))
    }

    pub fn has_operator(&self, index: usize) -> bool {
        self.operator_of(index).is_some()
    }

    /// A loader is on Reload, or the unit has no loader seat
    pub fn loader_ready(&self) -> bool {
        match self.position_index(PositionKind::Loader) {
            None => true,
            Some(i) => {
                let p = &self.positions[i];
                p.can_act() && p.crewman.as_ref().is_some_and(|c| c.command() == CrewCommand::Reload)
            }
        }
    }

    pub fn update_covered_hexes(&mut self) {
        let (hex, hull, turret) = (self.hex, self.hull_facing, self.turret_facing);
        for weapon in self.weapons.iter_mut() {
            weapon.update_covered_hexes(hex, hull, turret);
        }
    }

    /// Turn the turret `steps` clockwise, clearing turret weapon acquisitions
    pub fn rotate_turret(&mut self, steps: u8) -> Result<(), IllegalAction> {
        let facing = self.turret_facing.ok_or(IllegalAction::NoTurret)?;
        if steps % 6 == 0 {
            return Ok(());
        }
        self.turret_facing = Some(rotate_direction(facing, steps));
        self.turret_rotated = true;
        for weapon in self.weapons.iter_mut().filter(|w| w.mount() == Mount::Turret) {
            weapon.clear_acquired();
        }
        self.update_covered_hexes();
        Ok(())
    }

    /// Turn the whole unit in place, clearing every acquisition
    pub fn pivot_in_place(&mut self, steps: u8) -> Result<(), IllegalAction> {
        if self.immobilized {
            return Err(IllegalAction::Immobilized);
        }
        if self.bogged {
            return Err(IllegalAction::Bogged);
        }
        let facing = self.hull_facing.ok_or(IllegalAction::Immobilized)?;
        self.hull_facing = Some(rotate_direction(facing, steps));
        if let Some(turret) = self.turret_facing {
            self.turret_facing = Some(rotate_direction(turret, steps));
        }
        self.pivoted = true;
        self.hull_down.clear();
        for weapon in self.weapons.iter_mut() {
            weapon.clear_acquired();
        }
        self.update_covered_hexes();
        Ok(())
    }

    // === SMOKE ===

    pub fn smoke_toward(&self, direction: Option<u8>) -> u8 {
        direction.map_or(0, |d| self.smoke[(d % 6) as usize])
    }

    /// Add one level of smoke on hull-relative edges
    pub fn add_smoke(&mut self, relative_edges: &[u8]) {
        let facing = self.hull_facing.unwrap_or(0);
        for edge in relative_edges {
            let abs = rotate_direction(*edge, facing) as usize;
            self.smoke[abs] = (self.smoke[abs] + 1).min(MAX_SMOKE);
        }
    }

    /// Each smoked edge may thin by one level
    pub fn disperse_smoke(&mut self, chance: f32, dice: &mut dyn Dice) {
        for level in self.smoke.iter_mut().filter(|l| **l > 0) {
            if dice.chance(chance) {
                *level -= 1;
            }
        }
    }

    // === LIFECYCLE ===

    pub fn is_hostile_to(&self, other: &Unit) -> bool {
        self.side != other.side
    }

    pub fn destroy(&mut self) {
        self.alive = false;
        self.fp_to_resolve = 0;
        self.ap_hits_to_resolve.clear();
    }

    pub fn reset_for_turn(&mut self) {
        self.moving = false;
        self.fired = false;
        self.pivoted = false;
        self.turret_rotated = false;
        self.hit_by_fp = false;
        for weapon in self.weapons.iter_mut() {
            weapon.reset_for_turn();
        }
    }

    /// Recovery checks for every crewman; returns who changed status
    pub fn crew_recovery(&mut self, dice: &mut dyn Dice) -> Vec<(String, CrewStatus)> {
        let mut changes = Vec::new();
        for position in self.positions.iter_mut() {
            if let Some(crewman) = position.crewman.as_mut() {
                if let Some(status) = crewman.recovery_check(dice) {
                    changes.push((crewman.name.clone(), status));
                }
            }
        }
        changes
    }
}
