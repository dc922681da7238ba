//! Disposition: what an AI unit means to do this activation

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::content::units::{UnitCategory, WeaponKind};
use crate::core::dice::Dice;
use crate::unit::Unit;

/// Furthest ring from the player at which AI units will fight
pub const ENGAGEMENT_RING: u32 = 3;
/// Recalled units roll at or under this to leave play outright
pub const RECALL_WITHDRAW_CHANCE: f32 = 5.0;
/// Recalled units roll at or under this (after withdrawal) to move
pub const RECALL_MOVE_CHANCE: f32 = 85.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disposition {
    AttackPlayer,
    /// Area fire on the player only
    HarassPlayer,
    /// Fight the nearest hostile that is not the player
    Combat,
    Movement,
    Withdraw,
    None,
}

impl Disposition {
    pub fn is_attack(&self) -> bool {
        matches!(
            self,
            Disposition::AttackPlayer | Disposition::HarassPlayer | Disposition::Combat
        )
    }
}

/// Upper roll bounds for each category's dispositions, checked in order
fn disposition_table(category: UnitCategory, armed: bool) -> &'static [(f32, Disposition)] {
    match category {
        UnitCategory::Infantry => &[
            (15.0, Disposition::Movement),
            (35.0, Disposition::AttackPlayer),
            (60.0, Disposition::HarassPlayer),
            (70.0, Disposition::Combat),
        ],
        UnitCategory::Gun => &[(50.0, Disposition::AttackPlayer), (60.0, Disposition::Combat)],
        UnitCategory::Vehicle => &[
            (20.0, Disposition::Movement),
            (60.0, Disposition::AttackPlayer),
            (75.0, Disposition::Combat),
        ],
        UnitCategory::TrainCar if armed => {
            &[(50.0, Disposition::Movement), (70.0, Disposition::AttackPlayer)]
        }
        UnitCategory::TrainCar => &[(50.0, Disposition::Movement)],
        UnitCategory::NonCombat => &[(60.0, Disposition::Movement)],
    }
}

/// Table lookup for one roll
pub fn table_disposition(category: UnitCategory, armed: bool, roll: f32) -> Disposition {
    disposition_table(category, armed)
        .iter()
        .find(|(upper, _)| roll <= *upper)
        .map_or(Disposition::None, |(_, d)| *d)
}

/// Roll a disposition for `unit`, `player_distance` hexes from the player
pub fn roll_disposition(unit: &Unit, player_distance: u32, dice: &mut dyn Dice) -> Disposition {
    let mut disposition = if unit.recalled {
        let roll = dice.percentile();
        if roll <= RECALL_WITHDRAW_CHANCE {
            Disposition::Withdraw
        } else if roll <= RECALL_MOVE_CHANCE {
            Disposition::Movement
        } else {
            table_disposition(unit.category(), unit.stats.is_armed(), dice.percentile())
        }
    } else {
        table_disposition(unit.category(), unit.stats.is_armed(), dice.percentile())
    };

    // only small arms and MGs harass
    if disposition == Disposition::HarassPlayer
        && !unit.weapons.iter().any(|w| w.kind() == WeaponKind::SmallArms || w.is_mg())
    {
        disposition = Disposition::AttackPlayer;
    }
    if unit.squad_member
        && matches!(disposition, Disposition::AttackPlayer | Disposition::HarassPlayer)
    {
        disposition = Disposition::Combat;
    }
    if disposition.is_attack() && player_distance > ENGAGEMENT_RING {
        disposition = Disposition::Movement;
    }
    if disposition == Disposition::Movement && unit.can_move().is_err() {
        disposition = Disposition::None;
    }
    debug!(unit = %unit.stats.name, ?disposition, "disposition");
    disposition
}
