//! Attack legality

use crate::content::units::AmmoType;
use crate::core::error::IllegalAction;
use crate::core::types::Mount;
use crate::hex::bearing;
use crate::unit::Unit;

/// Checks that callers may relax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckOptions {
    /// Skip the covered-arc test; the AI may pivot or rotate first
    pub ignore_facing: bool,
}

/// Whether `attacker` may fire weapon `weapon_index` at `target` with `ammo`
///
/// Returns the reason the attack is illegal; the text is shown to the
/// player as is.
pub fn check_attack(
    attacker: &Unit,
    weapon_index: usize,
    target: &Unit,
    ammo: Option<AmmoType>,
    options: CheckOptions,
) -> Result<(), IllegalAction> {
    if !target.alive {
        return Err(IllegalAction::TargetGone);
    }
    if !attacker.is_hostile_to(target) {
        return Err(IllegalAction::FriendlyTarget);
    }
    let weapon = attacker.weapon(weapon_index)?;
    if weapon.fired {
        return Err(IllegalAction::AlreadyFired);
    }
    if !attacker.has_operator(weapon_index) {
        return Err(IllegalAction::NoOperator);
    }
    if attacker.hex.distance(&target.hex) > weapon.stats.max_range {
        return Err(IllegalAction::OutOfRange);
    }
    if !options.ignore_facing && !weapon.covers(target.hex) {
        return Err(IllegalAction::OutsideCoveredArc);
    }
    weapon.has_ammo_for(ammo)?;

    if let Some(group) = weapon.stats.firing_group {
        let group_fired = attacker
            .weapons
            .iter()
            .enumerate()
            .any(|(i, w)| i != weapon_index && w.fired && w.stats.firing_group == Some(group));
        if group_fired {
            return Err(IllegalAction::FiringGroupFired);
        }
    }

    if weapon.mount() == Mount::Hull && !attacker.hull_down.is_empty() {
        let blocked = bearing(attacker.hex, target.hex).is_some_and(|d| attacker.hull_down.contains(&d));
        if blocked {
            return Err(IllegalAction::BlockedByHullDown);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::units::Catalogue;
    use crate::core::dice::SeededDice;
    use crate::core::types::Side;
    use crate::crew::command::CrewCommand;
    use crate::crew::position::PositionKind;
    use crate::hex::HexCoord;

    fn setup() -> (Unit, Unit) {
        let catalogue = Catalogue::builtin().unwrap();
        let mut dice = SeededDice::new(8);
        let tank = Unit::new(catalogue.get("pzkpfw_iii_e").unwrap(), Side::Player, HexCoord::ORIGIN, 0, &mut dice);
        let enemy = Unit::new(catalogue.get("7tp").unwrap(), Side::Enemy, HexCoord::new(0, -2), 3, &mut dice);
        (tank, enemy)
    }

    #[test]
    fn test_legal_gun_shot() {
        let (tank, enemy) = setup();
        assert!(check_attack(&tank, 0, &enemy, Some(AmmoType::Ap), CheckOptions::default()).is_ok());
    }

    #[test]
    fn test_reasons() {
        let (mut tank, mut enemy) = setup();
        assert_eq!(
            check_attack(&tank, 0, &enemy, None, CheckOptions::default()),
            Err(IllegalAction::NoAmmoSelected)
        );
        assert_eq!(
            check_attack(&tank, 9, &enemy, Some(AmmoType::Ap), CheckOptions::default()),
            Err(IllegalAction::UnknownWeapon(9))
        );

        enemy.hex = HexCoord::new(0, 2);
        assert_eq!(
            check_attack(&tank, 0, &enemy, Some(AmmoType::Ap), CheckOptions::default()),
            Err(IllegalAction::OutsideCoveredArc)
        );
        assert!(check_attack(&tank, 0, &enemy, Some(AmmoType::Ap), CheckOptions { ignore_facing: true }).is_ok());

        enemy.hex = HexCoord::new(0, -2);
        tank.weapons[1].fired = true;
        assert_eq!(
            check_attack(&tank, 0, &enemy, Some(AmmoType::Ap), CheckOptions::default()),
            Err(IllegalAction::FiringGroupFired)
        );
        tank.weapons[0].fired = true;
        assert_eq!(
            check_attack(&tank, 0, &enemy, Some(AmmoType::Ap), CheckOptions::default()),
            Err(IllegalAction::AlreadyFired)
        );
    }

    #[test]
    fn test_needs_operator() {
        let (mut tank, enemy) = setup();
        let gunner = tank.position_index(PositionKind::Gunner).unwrap();
        tank.set_crew_command(gunner, CrewCommand::Spot).unwrap();
        assert_eq!(
            check_attack(&tank, 0, &enemy, Some(AmmoType::Ap), CheckOptions::default()),
            Err(IllegalAction::NoOperator)
        );
    }

    #[test]
    fn test_mg_range_and_hull_down_block() {
        let (mut tank, mut enemy) = setup();
        enemy.hex = HexCoord::new(0, -3);
        assert_eq!(
            check_attack(&tank, 2, &enemy, None, CheckOptions::default()),
            Err(IllegalAction::OutOfRange)
        );
        enemy.hex = HexCoord::new(0, -1);
        tank.hull_down = vec![5, 0, 1];
        assert_eq!(
            check_attack(&tank, 2, &enemy, None, CheckOptions::default()),
            Err(IllegalAction::BlockedByHullDown)
        );
        // the turret gun fires over the crest
        assert!(check_attack(&tank, 0, &enemy, Some(AmmoType::He), CheckOptions::default()).is_ok());
    }

    #[test]
    fn test_friendly_and_dead_targets() {
        let (tank, mut enemy) = setup();
        enemy.side = Side::Player;
        assert_eq!(
            check_attack(&tank, 0, &enemy, Some(AmmoType::Ap), CheckOptions::default()),
            Err(IllegalAction::FriendlyTarget)
        );
        enemy.alive = false;
        assert_eq!(
            check_attack(&tank, 0, &enemy, Some(AmmoType::Ap), CheckOptions::default()),
            Err(IllegalAction::TargetGone)
        );
    }
}
