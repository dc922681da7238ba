//! Turn phases in their fixed cyclic order

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Command,
    Spotting,
    CrewAction,
    Movement,
    Shooting,
    CloseCombat,
    AlliedAction,
    EnemyAction,
}

impl Phase {
    pub const ALL: [Phase; 8] = [
        Phase::Command,
        Phase::Spotting,
        Phase::CrewAction,
        Phase::Movement,
        Phase::Shooting,
        Phase::CloseCombat,
        Phase::AlliedAction,
        Phase::EnemyAction,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Command => "Command",
            Phase::Spotting => "Spotting",
            Phase::CrewAction => "Crew Action",
            Phase::Movement => "Movement",
            Phase::Shooting => "Shooting",
            Phase::CloseCombat => "Close Combat",
            Phase::AlliedAction => "Allied Action",
            Phase::EnemyAction => "Enemy Action",
        }
    }

    /// The following phase; Enemy Action wraps to Command
    pub fn next(&self) -> Phase {
        match self {
            Phase::Command => Phase::Spotting,
            Phase::Spotting => Phase::CrewAction,
            Phase::CrewAction => Phase::Movement,
            Phase::Movement => Phase::Shooting,
            Phase::Shooting => Phase::CloseCombat,
            Phase::CloseCombat => Phase::AlliedAction,
            Phase::AlliedAction => Phase::EnemyAction,
            Phase::EnemyAction => Phase::Command,
        }
    }

    /// Phases that wait for the player
    pub fn awaits_player(&self) -> bool {
        matches!(self, Phase::Command | Phase::Movement | Phase::Shooting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_returns_to_command() {
        let mut phase = Phase::Command;
        for expected in Phase::ALL.iter().skip(1) {
            phase = phase.next();
            assert_eq!(phase, *expected);
        }
        assert_eq!(phase.next(), Phase::Command);
    }
}
