//! Attack profiles: an explainable list of modifiers and the roll result

use serde::{Deserialize, Serialize};

use crate::content::tables::{clamp_chance, CRITICAL_THRESHOLD};
use crate::content::units::{AmmoType, Facing, WeaponStats};
use crate::core::types::{round_chance, Mount, UnitId};
use crate::hex::HexCoord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    PointFire,
    AreaFire,
    Armour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackResult {
    Miss,
    Hit,
    CriticalHit,
    BlockedByHullDown,
    NoEffect,
    PartialEffect,
    FullEffect,
    CriticalEffect,
    NoPenetration,
    Penetrated,
}

impl AttackResult {
    pub fn name(&self) -> &'static str {
        match self {
            AttackResult::Miss => "MISS",
            AttackResult::Hit => "HIT",
            AttackResult::CriticalHit => "CRITICAL HIT",
            AttackResult::BlockedByHullDown => "MISS - Blocked by Hull Down",
            AttackResult::NoEffect => "NO EFFECT",
            AttackResult::PartialEffect => "PARTIAL EFFECT",
            AttackResult::FullEffect => "FULL EFFECT",
            AttackResult::CriticalEffect => "CRITICAL EFFECT",
            AttackResult::NoPenetration => "NO PENETRATION",
            AttackResult::Penetrated => "PENETRATED",
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, AttackResult::Hit | AttackResult::CriticalHit)
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, AttackResult::CriticalHit | AttackResult::CriticalEffect)
    }

    /// Area-fire results that deliver firepower
    pub fn has_effect(&self) -> bool {
        matches!(
            self,
            AttackResult::PartialEffect | AttackResult::FullEffect | AttackResult::CriticalEffect
        )
    }
}

/// Penetration outcome on the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PenetrationEffect {
    Minor,
    Immobilized,
    Spalling,
    Destroyed,
}

impl PenetrationEffect {
    pub fn name(&self) -> &'static str {
        match self {
            PenetrationEffect::Minor => "Minor damage",
            PenetrationEffect::Immobilized => "Immobilized",
            PenetrationEffect::Spalling => "Spalling",
            PenetrationEffect::Destroyed => "Destroyed",
        }
    }
}

/// A named additive modifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub label: String,
    pub value: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackProfile {
    pub kind: AttackKind,
    pub attacker: UnitId,
    pub attacker_name: String,
    pub attacker_hex: HexCoord,
    pub weapon_index: usize,
    pub weapon: WeaponStats,
    pub target: UnitId,
    pub target_name: String,
    pub ammo: Option<AmmoType>,
    pub distance: u32,
    pub base_chance: f32,
    pub modifiers: Vec<Modifier>,
    pub final_chance: f32,
    pub critical_threshold: f32,
    pub roll: Option<f32>,
    pub result: Option<AttackResult>,
    /// Firepower delivered by an area-fire result
    pub effective_fp: u32,
    pub location: Option<Mount>,
    pub facing: Option<Facing>,
}

impl AttackProfile {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: AttackKind,
        attacker: UnitId,
        attacker_name: &str,
        attacker_hex: HexCoord,
        weapon_index: usize,
        weapon: &WeaponStats,
        target: UnitId,
        target_name: &str,
        ammo: Option<AmmoType>,
        distance: u32,
        base_chance: f32,
    ) -> Self {
        Self {
            kind,
            attacker,
            attacker_name: attacker_name.to_string(),
            attacker_hex,
            weapon_index,
            weapon: weapon.clone(),
            target,
            target_name: target_name.to_string(),
            ammo,
            distance,
            base_chance,
            modifiers: Vec::new(),
            final_chance: base_chance,
            critical_threshold: CRITICAL_THRESHOLD,
            roll: None,
            result: None,
            effective_fp: 0,
            location: None,
            facing: None,
        }
    }

    /// Record a modifier; zero values are left out of the list
    pub fn add(&mut self, label: impl Into<String>, value: f32) {
        if value != 0.0 {
            self.modifiers.push(Modifier {
                label: label.into(),
                value,
            });
        }
    }

    /// Base chance plus every modifier, unclamped
    pub fn raw_total(&self) -> f32 {
        self.base_chance + self.modifiers.iter().map(|m| m.value).sum::<f32>()
    }

    /// Sum modifiers into `final_chance`, clamped to the roll window
    pub fn finalize(&mut self) -> f32 {
        self.final_chance = round_chance(clamp_chance(self.raw_total()));
        self.final_chance
    }

    pub fn is_critical(&self) -> bool {
        self.result.is_some_and(|r| r.is_critical())
    }

    /// Multi-line description for a message log
    pub fn describe(&self) -> String {
        let mut lines = vec![format!(
            "{} -> {} with {} ({:?}), range {}",
            self.attacker_name, self.target_name, self.weapon.name, self.kind, self.distance
        )];
        lines.push(format!("  Base chance: {:+.1}", self.base_chance));
        for m in &self.modifiers {
            lines.push(format!("  {}: {:+.1}", m.label, m.value));
        }
        lines.push(format!("  Final chance: {:.1}", self.final_chance));
        if let (Some(roll), Some(result)) = (self.roll, self.result) {
            lines.push(format!("  Roll: {:.1} - {}", roll, result.name()));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::units::{BarrelLength, WeaponKind};

    fn profile(base: f32) -> AttackProfile {
        let weapon = WeaponStats {
            name: "MG".into(),
            kind: WeaponKind::CoaxMg,
            calibre: None,
            barrel: BarrelLength::Normal,
            mount: Mount::Turret,
            max_range: 2,
            rof: 0.0,
            fp: 2,
            firing_group: None,
            ammo_types: vec![],
            max_ammo: 0,
            rr_size: 0,
            operators: vec![],
            loaded: false,
            all_around: false,
        };
        AttackProfile::new(
            AttackKind::AreaFire,
            UnitId::new(),
            "Attacker",
            HexCoord::ORIGIN,
            0,
            &weapon,
            UnitId::new(),
            "Target",
            None,
            1,
            base,
        )
    }

    #[test]
    fn test_zero_modifiers_skipped() {
        let mut p = profile(50.0);
        p.add("Nothing", 0.0);
        p.add("Smoke", -25.0);
        assert_eq!(p.modifiers.len(), 1);
        assert_eq!(p.finalize(), 25.0);
    }

    #[test]
    fn test_finalize_clamps() {
        let mut p = profile(98.0);
        p.add("Acquired", 35.0);
        assert_eq!(p.finalize(), 97.0);
        p.add("Moving", -300.0);
        assert_eq!(p.finalize(), 3.0);
    }

    #[test]
    fn test_describe_lists_modifiers() {
        let mut p = profile(40.0);
        p.add("Target Moving", -30.0);
        p.finalize();
        let text = p.describe();
        assert!(text.contains("Target Moving: -30.0"));
        assert!(text.contains("Final chance: 10.0"));
    }
}
