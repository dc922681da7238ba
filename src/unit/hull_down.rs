//! Hull-down positions

use tracing::debug;

use super::unit::Unit;
use crate::content::skills::Skill;
use crate::content::tables::{clamp_chance, HULL_DOWN_EXPERT_BONUS};
use crate::core::dice::Dice;
use crate::crew::position::PositionKind;
use crate::hex::{bearing, rotate_direction, HexCoord};

impl Unit {
    /// Chance to find a hull-down position in the current terrain
    pub fn hull_down_chance(&self) -> f32 {
        if !self.is_vehicle() {
            return 0.0;
        }
        let base = self.terrain.effects().hull_down;
        if base <= 0.0 {
            return 0.0;
        }
        let mut chance = base + self.stats.size.hull_down_modifier();
        if self.crew_skill(PositionKind::Driver, Skill::HullDownExpert) {
            chance += HULL_DOWN_EXPERT_BONUS;
        }
        clamp_chance(chance)
    }

    /// Roll for hull-down facing `direction` (absolute)
    ///
    /// On success the protected arc is the direction plus its neighbours.
    pub fn attempt_hull_down(&mut self, direction: u8, dice: &mut dyn Dice) -> bool {
        let chance = self.hull_down_chance();
        if chance <= 0.0 || !dice.chance(chance) {
            debug!(unit = %self.stats.name, chance, "no hull-down position");
            return false;
        }
        let d = direction % 6;
        self.hull_down = vec![rotate_direction(d, 5), d, rotate_direction(d, 1)];
        debug!(unit = %self.stats.name, direction = d, "hull down");
        true
    }

    /// Passive acquisition on spawn or arrival, toward a random direction
    pub fn passive_hull_down(&mut self, dice: &mut dyn Dice) -> bool {
        let direction = dice.range(0, 5) as u8;
        self.attempt_hull_down(direction, dice)
    }

    /// Whether a shot from `from` strikes the protected arc
    pub fn hull_down_against(&self, from: HexCoord) -> bool {
        match bearing(self.hex, from) {
            Some(d) => self.hull_down.contains(&d),
            None => false,
        }
    }

    /// Rotate the protected arc with the map frame
    pub fn rotate_hull_down(&mut self, steps: u8) {
        for d in self.hull_down.iter_mut() {
            *d = rotate_direction(*d, steps);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::terrain::Terrain;
    use crate::content::units::Catalogue;
    use crate::core::dice::{FixedDice, SeededDice};
    use crate::core::types::Side;

    fn unit(type_id: &str) -> Unit {
        let catalogue = Catalogue::builtin().unwrap();
        let mut dice = SeededDice::new(4);
        Unit::new(catalogue.get(type_id).unwrap(), Side::Player, HexCoord::ORIGIN, 0, &mut dice)
    }

    #[test]
    fn test_hills_chance_by_size() {
        let mut small = unit("pzkpfw_35t");
        small.terrain = Terrain::Hills;
        assert_eq!(small.hull_down_chance(), 50.0);
        let mut large = unit("pzkpfw_iv_d");
        large.terrain = Terrain::Hills;
        assert_eq!(large.hull_down_chance(), 30.0);
    }

    #[test]
    fn test_marsh_and_infantry_never_hull_down() {
        let mut tank = unit("pzkpfw_iii_e");
        tank.terrain = Terrain::Marsh;
        assert_eq!(tank.hull_down_chance(), 0.0);
        let squad = unit("german_rifle_squad");
        assert_eq!(squad.hull_down_chance(), 0.0);
    }

    #[test]
    fn test_success_protects_three_directions() {
        let mut tank = unit("pzkpfw_iii_e");
        tank.terrain = Terrain::Hills;
        let mut dice = FixedDice::always(1.0);
        assert!(tank.attempt_hull_down(0, &mut dice));
        assert_eq!(tank.hull_down, vec![5, 0, 1]);
        assert!(tank.hull_down_against(HexCoord::new(0, -2)));
        assert!(!tank.hull_down_against(HexCoord::new(0, 2)));
        assert!(!tank.hull_down_against(HexCoord::ORIGIN));
    }

    #[test]
    fn test_rotate_arc() {
        let mut tank = unit("pzkpfw_iii_e");
        tank.hull_down = vec![5, 0, 1];
        tank.rotate_hull_down(2);
        assert_eq!(tank.hull_down, vec![1, 2, 3]);
    }
}
