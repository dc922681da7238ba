//! Populating a new scenario

use tracing::debug;

use super::map::ACTIVE_RADIUS;
use super::state::{Scenario, PLAYER};
use crate::content::units::{UnitCategory, UnitStats};
use crate::core::dice::Dice;
use crate::core::error::{ContentError, Result};
use crate::core::types::Side;
use crate::hex::{bearing, HexCoord};
use crate::unit::Unit;

/// Innermost ring vehicles spawn in
const VEHICLE_MIN_RING: u32 = 2;
const CLOSE_TERRAIN_FOOT_WEIGHT: f32 = 2.0;
const OPEN_TERRAIN_VEHICLE_WEIGHT: f32 = 1.5;

/// Number of enemy units for a day hex of `strength`
pub fn enemy_count(strength: u8, max_units: u32, dice: &mut dyn Dice) -> u32 {
    let extra = dice.range(0, 3) as u32;
    (1 + (strength as u32 + extra) / 3).clamp(1, max_units.max(1))
}

/// Hexes a unit of `category` may spawn in
pub fn spawn_hexes(category: UnitCategory) -> Vec<HexCoord> {
    let inner = match category {
        UnitCategory::Infantry | UnitCategory::Gun => 1,
        _ => VEHICLE_MIN_RING,
    };
    (inner..=ACTIVE_RADIUS)
        .flat_map(|r| HexCoord::ORIGIN.ring(r))
        .collect()
}

impl Scenario {
    /// Roster weight adjusted for the day hex terrain
    fn spawn_weight(&self, stats: &UnitStats) -> f32 {
        let terrain = self.context.day_hex.terrain;
        let mut weight = stats.weight;
        match stats.category {
            UnitCategory::Infantry | UnitCategory::Gun if terrain.is_close() => {
                weight *= CLOSE_TERRAIN_FOOT_WEIGHT
            }
            _ if stats.is_vehicle() && terrain.is_open() => weight *= OPEN_TERRAIN_VEHICLE_WEIGHT,
            _ => {}
        }
        weight
    }

    /// Weighted pick from the enemy roster
    pub fn pick_enemy_type(&self, dice: &mut dyn Dice) -> Result<UnitStats> {
        let weights: Vec<f32> = self
            .context
            .roster
            .iter()
            .map(|s| self.spawn_weight(s))
            .collect();
        let total: f32 = weights.iter().sum();
        if total <= 0.0 {
            return Err(ContentError::Invalid("enemy roster is empty".into()).into());
        }
        let mut pick = dice.percentile() / 100.0 * total;
        for (stats, weight) in self.context.roster.iter().zip(&weights) {
            if *weight <= 0.0 {
                continue;
            }
            if pick <= *weight {
                return Ok(stats.clone());
            }
            pick -= weight;
        }
        // rounding can leave a sliver past the last entry
        self.context
            .roster
            .iter()
            .zip(&weights)
            .rev()
            .find(|(_, w)| **w > 0.0)
            .map(|(s, _)| s.clone())
            .ok_or_else(|| ContentError::Invalid("enemy roster is empty".into()).into())
    }

    /// Create an enemy unit of `stats` in `hex`, facing the player
    pub fn spawn_enemy(&mut self, stats: &UnitStats, hex: HexCoord, dice: &mut dyn Dice) -> Option<usize> {
        let facing = bearing(hex, HexCoord::ORIGIN).unwrap_or(0);
        let mut unit = Unit::new(stats, Side::Enemy, hex, facing, dice);
        unit.terrain = self.context.day_hex.terrain.roll_terrain(dice);
        unit.recalculate_movement(self.weather.ground);
        if unit.is_vehicle() {
            unit.passive_hull_down(dice);
        }
        debug!(unit = %unit.stats.name, hx = hex.hx, hy = hex.hy, facing, "enemy spawned");
        self.add_unit(unit)
    }

    /// Spawn the enemy force for the day hex; returns how many arrived
    pub fn spawn_enemies(&mut self, dice: &mut dyn Dice) -> Result<u32> {
        let count = enemy_count(
            self.context.day_hex.strength,
            self.config.max_enemy_units,
            dice,
        );
        for _ in 0..count {
            let stats = self.pick_enemy_type(dice)?;
            let hexes = spawn_hexes(stats.category);
            let hex = hexes[dice.index(hexes.len())];
            self.spawn_enemy(&stats, hex, dice);
        }
        Ok(count)
    }

    /// Copies of the player's unit sharing its hex
    pub fn spawn_squad(&mut self, dice: &mut dyn Dice) {
        let stats = self.units[PLAYER].stats.clone();
        let terrain = self.units[PLAYER].terrain;
        for _ in 0..self.context.squad_size {
            let mut unit = Unit::new(&stats, Side::Player, HexCoord::ORIGIN, 0, dice);
            unit.squad_member = true;
            unit.spotted = true;
            unit.terrain = terrain;
            unit.recalculate_movement(self.weather.ground);
            self.add_unit(unit);
        }
    }

    /// Chance the enemy opens with an ambush
    pub fn ambush_chance(&self) -> f32 {
        let mut chance = self.context.mission.ambush_base();
        if self.context.day_hex.terrain.is_close() {
            chance += self.config.ambush_cover_bonus;
        }
        chance
    }

    pub fn roll_ambush(&self, dice: &mut dyn Dice) -> bool {
        let chance = self.ambush_chance();
        chance > 0.0 && dice.chance(chance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::terrain::CampaignTerrain;
    use crate::content::units::Catalogue;
    use crate::core::config::EngineConfig;
    use crate::core::dice::{FixedDice, SeededDice};
    use crate::core::types::Nation;
    use crate::scenario::context::{DayHex, Mission, ScenarioContext};
    use crate::scenario::map::MAP_RADIUS;

    fn scenario(terrain: CampaignTerrain, strength: u8) -> Scenario {
        let catalogue = Catalogue::builtin().unwrap();
        let mut dice = SeededDice::new(11);
        let player = Unit::new(catalogue.get("pzkpfw_35t").unwrap(), Side::Player, HexCoord::ORIGIN, 0, &mut dice);
        let day_hex = DayHex {
            terrain,
            strength,
            ..DayHex::default()
        };
        let context = ScenarioContext::new(day_hex, Nation::Poland, catalogue.roster(Nation::Poland));
        Scenario::with_player(context, player, EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_enemy_count_bounds() {
        let mut low = FixedDice::always(1.0);
        assert_eq!(enemy_count(1, 6, &mut low), 1);
        let mut high = FixedDice::always(100.0);
        assert_eq!(enemy_count(10, 6, &mut high), 5);
        assert_eq!(enemy_count(10, 3, &mut high), 3);
    }

    #[test]
    fn test_vehicles_stay_out_of_first_ring() {
        assert!(spawn_hexes(UnitCategory::Vehicle).iter().all(|h| {
            let d = h.distance(&HexCoord::ORIGIN);
            (2..=3).contains(&d)
        }));
        assert_eq!(spawn_hexes(UnitCategory::Infantry).len(), 6 + 12 + 18);
    }

    #[test]
    fn test_spawned_enemies_face_player() {
        let mut scenario = scenario(CampaignTerrain::Flat, 7);
        let mut dice = SeededDice::new(3);
        let count = scenario.spawn_enemies(&mut dice).unwrap();
        assert_eq!(scenario.units.len() as u32, count + 1);
        for unit in &scenario.units[1..] {
            assert_eq!(unit.side, Side::Enemy);
            assert!(unit.hex.distance(&HexCoord::ORIGIN) <= ACTIVE_RADIUS);
            assert!(unit.hex.distance(&HexCoord::ORIGIN) < MAP_RADIUS);
            if let Some(facing) = unit.hull_facing {
                assert_eq!(Some(facing), bearing(unit.hex, HexCoord::ORIGIN));
            }
            assert_eq!(scenario.map.occurrences(unit.id), 1);
        }
    }

    #[test]
    fn test_squad_shares_player_hex() {
        let mut scenario = scenario(CampaignTerrain::Flat, 3);
        scenario.context.squad_size = 2;
        let mut dice = SeededDice::new(4);
        scenario.spawn_squad(&mut dice);
        assert_eq!(scenario.squad_indices(), vec![1, 2]);
        assert_eq!(scenario.map.stack(HexCoord::ORIGIN).len(), 3);
    }

    #[test]
    fn test_ambush_chance_by_mission_and_cover() {
        let mut scenario = scenario(CampaignTerrain::Forest, 3);
        scenario.context.mission = Mission::Patrol;
        assert_eq!(scenario.ambush_chance(), 60.0);
        scenario.context.mission = Mission::HillDefence;
        scenario.context.day_hex.terrain = CampaignTerrain::Flat;
        let mut dice = FixedDice::always(1.0);
        assert!(!scenario.roll_ambush(&mut dice));
    }
}
