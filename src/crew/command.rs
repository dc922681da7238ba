//! Crew command vocabulary and which commands a position may hold

use serde::{Deserialize, Serialize};

use super::position::PositionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CrewCommand {
    #[default]
    None,
    Spot,
    OperateGun,
    OperateMg,
    Drive,
    DirectFire,
    DirectMovement,
    Reload,
    ManageReadyRack,
    AbandonTank,
    AttemptUnbog,
    Reposition,
    SmokeGrenade,
    FireSmokeMortar,
}

impl CrewCommand {
    pub fn name(&self) -> &'static str {
        match self {
            CrewCommand::None => "None",
            CrewCommand::Spot => "Spot",
            CrewCommand::OperateGun => "Operate Gun",
            CrewCommand::OperateMg => "Operate MG",
            CrewCommand::Drive => "Drive",
            CrewCommand::DirectFire => "Direct Fire",
            CrewCommand::DirectMovement => "Direct Movement",
            CrewCommand::Reload => "Reload",
            CrewCommand::ManageReadyRack => "Manage Ready Rack",
            CrewCommand::AbandonTank => "Abandon Tank",
            CrewCommand::AttemptUnbog => "Attempt Unbog",
            CrewCommand::Reposition => "Reposition",
            CrewCommand::SmokeGrenade => "Smoke Grenade",
            CrewCommand::FireSmokeMortar => "Fire Smoke Mortar",
        }
    }

    /// Commands resolved automatically during the Crew Action phase
    pub fn is_crew_action(&self) -> bool {
        matches!(
            self,
            CrewCommand::AbandonTank
                | CrewCommand::AttemptUnbog
                | CrewCommand::Reposition
                | CrewCommand::SmokeGrenade
                | CrewCommand::FireSmokeMortar
        )
    }
}

/// Unit state relevant to which commands a crewman may take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandContext {
    /// A point-fire weapon lists this position as an operator
    pub operates_gun: bool,
    /// An MG lists this position as an operator
    pub operates_mg: bool,
    /// A gun on the unit needs a loader
    pub serves_gun: bool,
    pub has_ready_rack: bool,
    pub bogged: bool,
    pub immobilized: bool,
    pub hatch_open: bool,
    pub smoke_grenades: u32,
    pub smoke_mortar: u32,
}

/// Legal commands for a crewman in `kind`, in menu order
pub fn available_commands(kind: PositionKind, ctx: &CommandContext) -> Vec<CrewCommand> {
    let mut commands = vec![CrewCommand::None, CrewCommand::Spot];

    if ctx.operates_gun {
        commands.push(CrewCommand::OperateGun);
    }
    if ctx.operates_mg {
        commands.push(CrewCommand::OperateMg);
    }

    match kind {
        PositionKind::Commander | PositionKind::CommanderGunner => {
            if kind == PositionKind::Commander {
                commands.push(CrewCommand::DirectFire);
            }
            if !ctx.immobilized {
                commands.push(CrewCommand::DirectMovement);
            }
            if ctx.smoke_grenades > 0 && ctx.hatch_open {
                commands.push(CrewCommand::SmokeGrenade);
            }
        }
        PositionKind::Loader => {
            if ctx.serves_gun {
                commands.push(CrewCommand::Reload);
                if ctx.has_ready_rack {
                    commands.push(CrewCommand::ManageReadyRack);
                }
            }
            if ctx.smoke_mortar > 0 {
                commands.push(CrewCommand::FireSmokeMortar);
            }
        }
        PositionKind::Driver => {
            if ctx.bogged && !ctx.immobilized {
                commands.push(CrewCommand::AttemptUnbog);
            } else if !ctx.immobilized {
                commands.push(CrewCommand::Drive);
                commands.push(CrewCommand::Reposition);
            }
        }
        PositionKind::Gunner | PositionKind::AssistantDriver => {}
    }

    commands.push(CrewCommand::AbandonTank);
    commands
}

/// Command a freshly crewed position starts with
pub fn default_command(kind: PositionKind, available: &[CrewCommand]) -> CrewCommand {
    let preferred: &[CrewCommand] = match kind {
        PositionKind::Commander => &[CrewCommand::DirectFire, CrewCommand::Spot],
        PositionKind::CommanderGunner | PositionKind::Gunner => {
            &[CrewCommand::OperateGun, CrewCommand::OperateMg, CrewCommand::Spot]
        }
        PositionKind::Loader => &[CrewCommand::Reload, CrewCommand::OperateMg, CrewCommand::Spot],
        PositionKind::Driver => &[CrewCommand::Drive, CrewCommand::AttemptUnbog, CrewCommand::Spot],
        PositionKind::AssistantDriver => &[CrewCommand::OperateMg, CrewCommand::Spot],
    };
    preferred
        .iter()
        .copied()
        .find(|c| available.contains(c))
        .unwrap_or(CrewCommand::None)
}
