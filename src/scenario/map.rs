//! Scenario hex map and unit stacks
//!
//! Every unit in play sits in exactly one stack. The last entry of a stack
//! is its top: the unit targeted and drawn first.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::UnitId;
use crate::hex::HexCoord;

/// Rings around the player in which fighting happens
pub const ACTIVE_RADIUS: u32 = 3;
/// Outer ring kept for units entering and leaving play
pub const MAP_RADIUS: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapHex {
    pub hex: HexCoord,
    /// Bottom first, top last
    pub stack: Vec<UnitId>,
}

impl MapHex {
    pub fn new(hex: HexCoord) -> Self {
        Self {
            hex,
            stack: Vec::new(),
        }
    }

    pub fn top(&self) -> Option<UnitId> {
        self.stack.last().copied()
    }

    /// Move `unit` to the top of this stack; false if it is not here
    pub fn promote_to_top(&mut self, unit: UnitId) -> bool {
        let Some(i) = self.stack.iter().position(|u| *u == unit) else {
            return false;
        };
        let id = self.stack.remove(i);
        self.stack.push(id);
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioMap {
    hexes: Vec<MapHex>,
    #[serde(skip)]
    index: AHashMap<HexCoord, usize>,
}

impl PartialEq for ScenarioMap {
    fn eq(&self, other: &Self) -> bool {
        self.hexes == other.hexes
    }
}

impl Default for ScenarioMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioMap {
    /// The player hex, three active rings and the outer ring
    pub fn new() -> Self {
        let hexes = HexCoord::ORIGIN
            .spiral(MAP_RADIUS)
            .into_iter()
            .map(MapHex::new)
            .collect();
        let mut map = Self {
            hexes,
            index: AHashMap::new(),
        };
        map.rebuild_index();
        map
    }

    /// Restore the coordinate index after deserializing
    pub fn rebuild_index(&mut self) {
        self.index = self
            .hexes
            .iter()
            .enumerate()
            .map(|(i, h)| (h.hex, i))
            .collect();
    }

    pub fn contains(&self, hex: HexCoord) -> bool {
        self.index.contains_key(&hex)
    }

    pub fn get(&self, hex: HexCoord) -> Option<&MapHex> {
        self.index.get(&hex).map(|&i| &self.hexes[i])
    }

    pub fn get_mut(&mut self, hex: HexCoord) -> Option<&mut MapHex> {
        self.index.get(&hex).copied().map(move |i| &mut self.hexes[i])
    }

    pub fn hexes(&self) -> impl Iterator<Item = &MapHex> {
        self.hexes.iter()
    }

    /// Units in `hex`, bottom first
    pub fn stack(&self, hex: HexCoord) -> &[UnitId] {
        self.get(hex).map_or(&[], |h| h.stack.as_slice())
    }

    pub fn top(&self, hex: HexCoord) -> Option<UnitId> {
        self.get(hex).and_then(|h| h.top())
    }

    /// Hex whose stack holds `unit`
    pub fn locate(&self, unit: UnitId) -> Option<HexCoord> {
        self.hexes
            .iter()
            .find(|h| h.stack.contains(&unit))
            .map(|h| h.hex)
    }

    /// Put `unit` on top of the stack in `hex`; false when off the map
    pub fn place(&mut self, unit: UnitId, hex: HexCoord) -> bool {
        match self.get_mut(hex) {
            Some(map_hex) => {
                map_hex.stack.push(unit);
                true
            }
            None => false,
        }
    }

    /// Take `unit` out of whatever stack holds it
    pub fn remove(&mut self, unit: UnitId) -> Option<HexCoord> {
        for map_hex in self.hexes.iter_mut() {
            if let Some(i) = map_hex.stack.iter().position(|u| *u == unit) {
                map_hex.stack.remove(i);
                return Some(map_hex.hex);
            }
        }
        None
    }

    /// Move `unit` to the top of the stack in `to`
    pub fn relocate(&mut self, unit: UnitId, to: HexCoord) -> bool {
        if !self.contains(to) {
            return false;
        }
        self.remove(unit);
        self.place(unit, to)
    }

    pub fn promote_to_top(&mut self, unit: UnitId) -> bool {
        self.hexes.iter_mut().any(|h| h.promote_to_top(unit))
    }

    /// Empty every stack
    pub fn clear(&mut self) {
        for map_hex in self.hexes.iter_mut() {
            map_hex.stack.clear();
        }
    }

    /// Number of stacks holding `unit`
    pub fn occurrences(&self, unit: UnitId) -> usize {
        self.hexes
            .iter()
            .map(|h| h.stack.iter().filter(|u| **u == unit).count())
            .sum()
    }
}
