//! Individual crewmen: stats, progression and the status state machine
//!
//! Status only moves toward `Dead` through `wound_check` or `kill`, and
//! back toward `GoodOrder` through `recovery_check`. `Dead` is absorbing.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::command::CrewCommand;
use super::position::PositionKind;
use crate::content::nations::random_name;
use crate::content::skills::Skill;
use crate::content::tables::{wound_fp_modifier, FATAL_WOUND_ROLL};
use crate::core::dice::Dice;
use crate::core::error::IllegalAction;
use crate::core::types::Nation;

pub const STAT_MIN: u8 = 1;
pub const STAT_MAX: u8 = 10;
const EXTRA_STAT_POINTS: u32 = 6;
const CRITICAL_WOUND_DEATH_CHANCE: f32 = 5.0;
const STEADY_NERVES_MODIFIER: f32 = -5.0;
const GRITTY_BONUS: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum CrewStatus {
    #[default]
    GoodOrder,
    Stunned,
    Unconscious,
    Dead,
}

impl CrewStatus {
    pub fn name(&self) -> &'static str {
        match self {
            CrewStatus::GoodOrder => "Good Order",
            CrewStatus::Stunned => "Stunned",
            CrewStatus::Unconscious => "Unconscious",
            CrewStatus::Dead => "Dead",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum WoundSeverity {
    #[default]
    None,
    Light,
    Serious,
    Critical,
}

impl WoundSeverity {
    fn escalated(&self) -> Option<WoundSeverity> {
        match self {
            WoundSeverity::None => Some(WoundSeverity::Light),
            WoundSeverity::Light => Some(WoundSeverity::Serious),
            WoundSeverity::Serious => Some(WoundSeverity::Critical),
            WoundSeverity::Critical => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewStats {
    pub perception: u8,
    pub morale: u8,
    pub grit: u8,
    pub knowledge: u8,
}

impl CrewStats {
    /// Random stats: 3..=5 each, plus extra points spread at random
    pub fn generate(dice: &mut dyn Dice) -> Self {
        let mut values = [0u8; 4];
        for value in values.iter_mut() {
            *value = dice.range(3, 5) as u8;
        }
        let mut spent = 0;
        let mut attempts = 0;
        while spent < EXTRA_STAT_POINTS && attempts < 100 {
            attempts += 1;
            let i = dice.index(4);
            if values[i] < STAT_MAX {
                values[i] += 1;
                spent += 1;
            }
        }
        Self {
            perception: values[0],
            morale: values[1],
            grit: values[2],
            knowledge: values[3],
        }
    }
}

impl Default for CrewStats {
    fn default() -> Self {
        Self {
            perception: 5,
            morale: 5,
            grit: 5,
            knowledge: 5,
        }
    }
}

/// Outcome of one wound check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WoundResult {
    pub roll: f32,
    pub modified: f32,
    pub wound: Option<WoundSeverity>,
    pub status: CrewStatus,
    pub changed: bool,
}

impl WoundResult {
    pub fn describe(&self) -> &'static str {
        if self.status == CrewStatus::Dead {
            return "Killed";
        }
        match self.wound {
            Some(WoundSeverity::Critical) => "Critically wounded",
            Some(WoundSeverity::Serious) => "Seriously wounded",
            Some(WoundSeverity::Light) => "Lightly wounded",
            _ if self.changed => "Stunned",
            _ => "No effect",
        }
    }
}

/// Experience needed to advance past `level`
pub fn exp_for_level(level: u32) -> u32 {
    10 * level * (level + 1) / 2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personnel {
    pub name: String,
    pub nation: Nation,
    pub stats: CrewStats,
    pub level: u32,
    pub exp: u32,
    pub adv_points: u32,
    pub skills: Vec<Skill>,
    status: CrewStatus,
    wound: WoundSeverity,
    command: CrewCommand,
}

impl Personnel {
    pub fn new(name: impl Into<String>, nation: Nation, stats: CrewStats) -> Self {
        Self {
            name: name.into(),
            nation,
            stats,
            level: 1,
            exp: 0,
            adv_points: 0,
            skills: Vec::new(),
            status: CrewStatus::GoodOrder,
            wound: WoundSeverity::None,
            command: CrewCommand::None,
        }
    }

    pub fn generate(nation: Nation, dice: &mut dyn Dice) -> Self {
        let name = random_name(nation, dice);
        let stats = CrewStats::generate(dice);
        Self::new(name, nation, stats)
    }

    pub fn status(&self) -> CrewStatus {
        self.status
    }

    pub fn wound(&self) -> WoundSeverity {
        self.wound
    }

    pub fn command(&self) -> CrewCommand {
        self.command
    }

    pub fn is_alive(&self) -> bool {
        self.status != CrewStatus::Dead
    }

    /// Good Order and Stunned crew may act
    pub fn can_act(&self) -> bool {
        matches!(self.status, CrewStatus::GoodOrder | CrewStatus::Stunned)
    }

    pub fn has_skill(&self, skill: Skill) -> bool {
        self.skills.contains(&skill)
    }

    /// Crewmen who cannot act hold no command but `None`
    pub fn set_command(&mut self, command: CrewCommand) -> Result<(), IllegalAction> {
        if !self.can_act() && command != CrewCommand::None {
            return Err(IllegalAction::CommandNotAvailable);
        }
        self.command = command;
        Ok(())
    }

    /// Explicit death, e.g. when the unit is destroyed with the crew inside
    pub fn kill(&mut self) {
        self.set_status(CrewStatus::Dead);
    }

    fn set_status(&mut self, status: CrewStatus) {
        if self.status == CrewStatus::Dead {
            return;
        }
        self.status = status;
        if !self.can_act() {
            self.command = CrewCommand::None;
        }
    }

    fn worsen(&mut self, status: CrewStatus) {
        if status > self.status {
            self.set_status(status);
        }
    }

    /// Roll for the effect of `fp` firepower on this crewman
    pub fn wound_check(&mut self, fp: u32, modifier: f32, dice: &mut dyn Dice) -> WoundResult {
        let before = (self.status, self.wound);
        if self.status == CrewStatus::Dead {
            return WoundResult {
                roll: 0.0,
                modified: 0.0,
                wound: None,
                status: self.status,
                changed: false,
            };
        }

        let roll = dice.percentile();
        let mut modified = roll + wound_fp_modifier(fp) + modifier;
        if self.has_skill(Skill::SteadyNerves) {
            modified += STEADY_NERVES_MODIFIER;
        }

        let mut wound = None;
        if roll >= FATAL_WOUND_ROLL || modified >= 97.0 {
            self.worsen(CrewStatus::Dead);
        } else if modified < 60.0 {
            // near miss
        } else if modified < 75.0 {
            let shake_off = self.stats.morale as f32 * 3.0;
            if !dice.chance(shake_off) {
                self.worsen(CrewStatus::Stunned);
            }
        } else {
            let (severity, knockout_chance, knockout) = if modified < 85.0 {
                (WoundSeverity::Light, 50.0, CrewStatus::Stunned)
            } else if modified < 92.0 {
                (WoundSeverity::Serious, 25.0, CrewStatus::Unconscious)
            } else {
                (WoundSeverity::Critical, 50.0, CrewStatus::Unconscious)
            };
            wound = Some(self.apply_wound(severity));
            if self.status != CrewStatus::Dead && dice.chance(knockout_chance) {
                self.worsen(knockout);
            }
        }

        let result = WoundResult {
            roll,
            modified,
            wound,
            status: self.status,
            changed: (self.status, self.wound) != before,
        };
        debug!(
            crewman = %self.name,
            roll,
            modified,
            outcome = result.describe(),
            "wound check"
        );
        result
    }

    /// A repeated wound of the same severity escalates one step
    fn apply_wound(&mut self, severity: WoundSeverity) -> WoundSeverity {
        let effective = if severity == self.wound {
            match severity.escalated() {
                Some(next) => next,
                None => {
                    self.worsen(CrewStatus::Dead);
                    return severity;
                }
            }
        } else {
            severity
        };
        if effective > self.wound {
            self.wound = effective;
        }
        effective
    }

    /// Attempt to step status back toward Good Order
    ///
    /// Returns the new status when it changed.
    pub fn recovery_check(&mut self, dice: &mut dyn Dice) -> Option<CrewStatus> {
        if self.status == CrewStatus::Dead {
            return None;
        }
        if self.wound == WoundSeverity::Critical && dice.chance(CRITICAL_WOUND_DEATH_CHANCE) {
            self.set_status(CrewStatus::Dead);
            return Some(CrewStatus::Dead);
        }

        let bonus = if self.has_skill(Skill::Gritty) {
            GRITTY_BONUS
        } else {
            0.0
        };
        let grit = self.stats.grit as f32;
        let next = match self.status {
            CrewStatus::Stunned if dice.chance(grit * 10.0 + bonus) => CrewStatus::GoodOrder,
            CrewStatus::Unconscious if dice.chance(grit * 5.0 + bonus) => CrewStatus::Stunned,
            _ => return None,
        };
        self.status = next;
        Some(next)
    }

    /// Award experience scaled by Knowledge; returns levels gained
    pub fn award_exp(&mut self, base: u32) -> u32 {
        if !self.is_alive() || base == 0 {
            return 0;
        }
        let scale = 1.0 + (self.stats.knowledge as f32 - 5.0) * 0.05;
        let amount = ((base as f32 * scale).floor() as u32).max(1);
        self.exp += amount;

        let mut gained = 0;
        while self.exp >= exp_for_level(self.level) {
            self.level += 1;
            self.adv_points += 1;
            gained += 1;
        }
        gained
    }

    /// Spend one advance point on `skill` for a crewman in `position`
    pub fn spend_advance(&mut self, skill: Skill, position: PositionKind) -> Result<(), IllegalAction> {
        if self.has_skill(skill) {
            return Err(IllegalAction::SkillKnown);
        }
        if self.adv_points == 0 {
            return Err(IllegalAction::NoAdvancePoints);
        }
        if !skill.allowed_for(position) {
            return Err(IllegalAction::SkillNotForPosition);
        }
        if let Some(pre) = skill.prerequisite() {
            if !self.has_skill(pre) {
                return Err(IllegalAction::MissingPrerequisite(pre.name().to_string()));
            }
        }
        self.adv_points -= 1;
        self.skills.push(skill);
        Ok(())
    }
}
