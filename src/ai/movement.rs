//! Where an AI unit tries to move

use crate::core::dice::Dice;
use crate::hex::HexCoord;
use crate::unit::Unit;

/// Ring beyond which a unit has left the scenario
pub const EXIT_RING: u32 = 4;
/// Chance to reject a move that opens the range by one ring
pub const REJECT_FARTHER: f32 = 40.0;
/// Chance to reject a move into the exit ring
pub const REJECT_EXIT: f32 = 90.0;
/// Chance to reject a move that closes the range
pub const REJECT_CLOSER: f32 = 20.0;

/// Adjacent hexes `units[actor]` may enter
///
/// Never the player's hex, never a hex holding a hostile unit.
pub fn legal_destinations(units: &[Unit], actor: usize, player_hex: HexCoord) -> Vec<HexCoord> {
    let me = &units[actor];
    me.hex
        .neighbors()
        .into_iter()
        .filter(|hex| *hex != player_hex)
        .filter(|hex| {
            !units
                .iter()
                .any(|u| u.alive && u.hex == *hex && me.is_hostile_to(u))
        })
        .collect()
}

/// Pick a destination, pruning moves by how they change the range
///
/// Recalled units are not pruned; they are trying to leave.
pub fn choose_destination(
    units: &[Unit],
    actor: usize,
    player_hex: HexCoord,
    dice: &mut dyn Dice,
) -> Option<HexCoord> {
    let me = &units[actor];
    let current = me.hex.distance(&player_hex);
    let candidates: Vec<HexCoord> = legal_destinations(units, actor, player_hex)
        .into_iter()
        .filter(|hex| {
            if me.recalled {
                return true;
            }
            let next = hex.distance(&player_hex);
            let reject = if next >= EXIT_RING {
                REJECT_EXIT
            } else if next > current {
                REJECT_FARTHER
            } else if next < current {
                REJECT_CLOSER
            } else {
                0.0
            };
            reject <= 0.0 || !dice.chance(reject)
        })
        .collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[dice.index(candidates.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::units::Catalogue;
    use crate::core::dice::{FixedDice, SeededDice};
    use crate::core::types::Side;

    fn units() -> Vec<Unit> {
        let catalogue = Catalogue::builtin().unwrap();
        let mut dice = SeededDice::new(19);
        let player = Unit::new(catalogue.get("pzkpfw_iii_e").unwrap(), Side::Player, HexCoord::ORIGIN, 0, &mut dice);
        let enemy = Unit::new(catalogue.get("polish_rifle_squad").unwrap(), Side::Enemy, HexCoord::new(0, -1), 3, &mut dice);
        vec![player, enemy]
    }

    #[test]
    fn test_player_hex_excluded() {
        let units = units();
        let hexes = legal_destinations(&units, 1, HexCoord::ORIGIN);
        assert_eq!(hexes.len(), 5);
        assert!(!hexes.contains(&HexCoord::ORIGIN));
    }

    #[test]
    fn test_hostile_hex_excluded() {
        let mut units = units();
        units[0].hex = HexCoord::new(0, -2);
        let hexes = legal_destinations(&units, 1, HexCoord::ORIGIN);
        assert!(!hexes.contains(&HexCoord::new(0, -2)));
        assert!(!hexes.contains(&HexCoord::ORIGIN));
        assert_eq!(hexes.len(), 4);
    }

    #[test]
    fn test_high_rolls_keep_every_candidate() {
        let units = units();
        // 98 passes every rejection roll; the final pick is the last index
        let mut dice = FixedDice::always(98.0);
        let hex = choose_destination(&units, 1, HexCoord::ORIGIN, &mut dice).unwrap();
        assert_eq!(hex, legal_destinations(&units, 1, HexCoord::ORIGIN)[4]);
    }

    #[test]
    fn test_low_rolls_reject_all_but_sideways() {
        let units = units();
        let mut dice = FixedDice::always(1.0);
        let hex = choose_destination(&units, 1, HexCoord::ORIGIN, &mut dice).unwrap();
        assert_eq!(hex.distance(&HexCoord::ORIGIN), 1);
    }
}
