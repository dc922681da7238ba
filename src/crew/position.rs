//! Crew positions inside a unit and what each can see

use serde::{Deserialize, Serialize};

use super::personnel::Personnel;
use crate::core::dice::Dice;
use crate::core::error::IllegalAction;
use crate::core::types::{Mount, Nation};
use crate::hex::{covered_arcs, HexCoord, ARC_RADIUS};

/// Buttoned-up crew see a shorter cone
pub const BUTTONED_VISION_RADIUS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionKind {
    Commander,
    CommanderGunner,
    Gunner,
    Loader,
    Driver,
    AssistantDriver,
}

impl PositionKind {
    pub fn name(&self) -> &'static str {
        match self {
            PositionKind::Commander => "Commander",
            PositionKind::CommanderGunner => "Commander/Gunner",
            PositionKind::Gunner => "Gunner",
            PositionKind::Loader => "Loader",
            PositionKind::Driver => "Driver",
            PositionKind::AssistantDriver => "Assistant Driver",
        }
    }

    /// Positions whose crewman commands the unit
    pub fn is_commander(&self) -> bool {
        matches!(self, PositionKind::Commander | PositionKind::CommanderGunner)
    }

    /// Vision directions (hatch open, buttoned up), relative to mount facing
    pub fn default_vision(&self) -> (Vec<u8>, Vec<u8>) {
        match self {
            PositionKind::Commander => (vec![0, 1, 2, 3, 4, 5], vec![5, 0, 1]),
            PositionKind::CommanderGunner => (vec![0, 1, 2, 3, 4, 5], vec![0]),
            PositionKind::Gunner => (vec![0], vec![0]),
            PositionKind::Loader => (vec![2, 3, 4], vec![]),
            PositionKind::Driver => (vec![5, 0, 1], vec![0]),
            PositionKind::AssistantDriver => (vec![5, 0, 1], vec![1]),
        }
    }
}

/// Template entry for building a position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionTemplate {
    pub kind: PositionKind,
    #[serde(default)]
    pub location: Mount,
    #[serde(default = "default_hatch")]
    pub hatch: bool,
}

fn default_hatch() -> bool {
    true
}

/// A seat in a unit, optionally holding a crewman
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub kind: PositionKind,
    pub location: Mount,
    /// `Some(open)` if the position has a hatch
    pub hatch: Option<bool>,
    pub open_vision: Vec<u8>,
    pub closed_vision: Vec<u8>,
    pub crewman: Option<Personnel>,
}

impl Position {
    pub fn new(template: &PositionTemplate) -> Self {
        let (open_vision, closed_vision) = template.kind.default_vision();
        Self {
            kind: template.kind,
            location: template.location,
            hatch: template.hatch.then_some(true),
            open_vision,
            closed_vision,
            crewman: None,
        }
    }

    /// Build a position and seat a freshly generated crewman
    pub fn crewed(template: &PositionTemplate, nation: Nation, dice: &mut dyn Dice) -> Self {
        let mut position = Self::new(template);
        position.crewman = Some(Personnel::generate(nation, dice));
        position
    }

    pub fn hatch_open(&self) -> bool {
        self.hatch.unwrap_or(false)
    }

    pub fn toggle_hatch(&mut self) -> Result<bool, IllegalAction> {
        let hatch = self.hatch.as_mut().ok_or(IllegalAction::NoHatch)?;
        *hatch = !*hatch;
        Ok(*hatch)
    }

    /// Whether the seated crewman is fit to act
    pub fn can_act(&self) -> bool {
        self.crewman.as_ref().is_some_and(|c| c.can_act())
    }

    /// Vision directions relative to the mount facing
    pub fn vision_directions(&self) -> &[u8] {
        if self.hatch_open() {
            &self.open_vision
        } else {
            &self.closed_vision
        }
    }

    pub fn vision_radius(&self) -> u32 {
        if self.hatch_open() {
            ARC_RADIUS
        } else {
            BUTTONED_VISION_RADIUS
        }
    }

    /// Hexes this position can see from `origin`
    ///
    /// `mount_facing` is the turret facing for turret seats and the hull
    /// facing otherwise. Empty when the crewman cannot act.
    pub fn visible_hexes(&self, origin: HexCoord, mount_facing: u8) -> Vec<HexCoord> {
        if !self.can_act() || self.vision_directions().is_empty() {
            return Vec::new();
        }
        let dirs: Vec<u8> = self
            .vision_directions()
            .iter()
            .map(|d| (d + mount_facing) % 6)
            .collect();
        covered_arcs(origin, &dirs, self.vision_radius())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::SeededDice;

    fn template(kind: PositionKind, hatch: bool) -> PositionTemplate {
        PositionTemplate {
            kind,
            location: Mount::Turret,
            hatch,
        }
    }

    #[test]
    fn test_toggle_hatch() {
        let mut pos = Position::new(&template(PositionKind::Commander, true));
        assert!(pos.hatch_open());
        assert_eq!(pos.toggle_hatch(), Ok(false));
        assert!(!pos.hatch_open());
    }

    #[test]
    fn test_no_hatch_cannot_toggle() {
        let mut pos = Position::new(&template(PositionKind::Gunner, false));
        assert_eq!(pos.toggle_hatch(), Err(IllegalAction::NoHatch));
        assert!(!pos.hatch_open());
    }

    #[test]
    fn test_open_commander_sees_all_around() {
        let mut dice = SeededDice::new(1);
        let pos = Position::crewed(&template(PositionKind::Commander, true), Nation::Germany, &mut dice);
        let seen = pos.visible_hexes(HexCoord::ORIGIN, 0);
        assert_eq!(seen.len(), 37);
    }

    #[test]
    fn test_buttoned_vision_is_short() {
        let mut dice = SeededDice::new(1);
        let mut pos = Position::crewed(&template(PositionKind::Commander, true), Nation::Germany, &mut dice);
        pos.toggle_hatch().unwrap();
        let seen = pos.visible_hexes(HexCoord::ORIGIN, 0);
        assert!(seen.iter().all(|h| h.distance(&HexCoord::ORIGIN) <= 2));
        assert!(seen.contains(&HexCoord::new(0, -2)));
        assert!(!seen.contains(&HexCoord::new(0, 2)));
    }

    #[test]
    fn test_empty_position_sees_nothing() {
        let pos = Position::new(&template(PositionKind::Driver, true));
        assert!(pos.visible_hexes(HexCoord::ORIGIN, 0).is_empty());
    }
}
