//! Crew skill catalogue

use serde::{Deserialize, Serialize};

use crate::crew::position::PositionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Skill {
    FireDirection,
    EagleEye,
    Tactician,
    CrackShot,
    TargetTracker,
    Sniper,
    KnowsWeakSpots,
    FastHands,
    ShellJuggler,
    QuickShifter,
    MudDog,
    HullDownExpert,
    SteadyNerves,
    Gritty,
    Observant,
}

const COMMANDERS: &[PositionKind] = &[PositionKind::Commander, PositionKind::CommanderGunner];
const GUNNERS: &[PositionKind] = &[PositionKind::Gunner, PositionKind::CommanderGunner];
const LOADERS: &[PositionKind] = &[PositionKind::Loader];
const DRIVERS: &[PositionKind] = &[PositionKind::Driver];

impl Skill {
    pub const ALL: [Skill; 15] = [
        Skill::FireDirection,
        Skill::EagleEye,
        Skill::Tactician,
        Skill::CrackShot,
        Skill::TargetTracker,
        Skill::Sniper,
        Skill::KnowsWeakSpots,
        Skill::FastHands,
        Skill::ShellJuggler,
        Skill::QuickShifter,
        Skill::MudDog,
        Skill::HullDownExpert,
        Skill::SteadyNerves,
        Skill::Gritty,
        Skill::Observant,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Skill::FireDirection => "Fire Direction",
            Skill::EagleEye => "Eagle Eye",
            Skill::Tactician => "Tactician",
            Skill::CrackShot => "Crack Shot",
            Skill::TargetTracker => "Target Tracker",
            Skill::Sniper => "Sniper",
            Skill::KnowsWeakSpots => "Knows Weak Spots",
            Skill::FastHands => "Fast Hands",
            Skill::ShellJuggler => "Shell Juggler",
            Skill::QuickShifter => "Quick Shifter",
            Skill::MudDog => "Mud Dog",
            Skill::HullDownExpert => "Hull Down Expert",
            Skill::SteadyNerves => "Steady Nerves",
            Skill::Gritty => "Gritty",
            Skill::Observant => "Observant",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Skill::FireDirection => "Direct Fire orders give an extra +5",
            Skill::EagleEye => "+5 to spotting",
            Skill::Tactician => "Direct Movement orders give an extra +5",
            Skill::CrackShot => "+3 to point fire",
            Skill::TargetTracker => "+7 to point fire against moving targets",
            Skill::Sniper => "+7 to point fire at long range",
            Skill::KnowsWeakSpots => "Critical hits on rolls up to 5.0",
            Skill::FastHands => "+5 to maintain rate of fire",
            Skill::ShellJuggler => "Rate of fire is not halved outside the ready rack",
            Skill::QuickShifter => "+5 to movement",
            Skill::MudDog => "Bog chance halved",
            Skill::HullDownExpert => "+10 to hull down attempts",
            Skill::SteadyNerves => "-5 to wound checks",
            Skill::Gritty => "+10 to recovery checks",
            Skill::Observant => "+5 to spotting",
        }
    }

    /// Skill that must be known first
    pub fn prerequisite(&self) -> Option<Skill> {
        match self {
            Skill::TargetTracker | Skill::Sniper | Skill::KnowsWeakSpots => Some(Skill::CrackShot),
            Skill::ShellJuggler => Some(Skill::FastHands),
            _ => None,
        }
    }

    /// Positions allowed to learn this skill, `None` for any
    pub fn positions(&self) -> Option<&'static [PositionKind]> {
        match self {
            Skill::FireDirection | Skill::EagleEye | Skill::Tactician => Some(COMMANDERS),
            Skill::CrackShot | Skill::TargetTracker | Skill::Sniper | Skill::KnowsWeakSpots => {
                Some(GUNNERS)
            }
            Skill::FastHands | Skill::ShellJuggler => Some(LOADERS),
            Skill::QuickShifter | Skill::MudDog | Skill::HullDownExpert => Some(DRIVERS),
            Skill::SteadyNerves | Skill::Gritty | Skill::Observant => None,
        }
    }

    pub fn allowed_for(&self, kind: PositionKind) -> bool {
        self.positions().map_or(true, |kinds| kinds.contains(&kind))
    }
}
