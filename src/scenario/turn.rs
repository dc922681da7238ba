//! End of turn: time, weather, smoke, recovery and random events

use tracing::{debug, info};

use super::events::SoundEvent;
use super::map::ACTIVE_RADIUS;
use super::state::Scenario;
use crate::campaign::weather::CloudCover;
use crate::combat::profile::{AttackKind, AttackProfile, AttackResult};
use crate::content::units::{AmmoType, BarrelLength, WeaponKind, WeaponStats};
use crate::core::dice::Dice;
use crate::core::types::{Mount, UnitId};
use crate::hex::HexCoord;

/// Firepower of an artillery strike on a soft target
const ARTILLERY_FP: u32 = 6;
/// Firepower of an air strike on a soft target
const AIR_STRIKE_FP: u32 = 8;
/// Bomb calibre used for the armour hit an air strike scores
const AIR_STRIKE_CALIBRE: u32 = 100;
const MAX_RECALLED: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomEvent {
    Reinforcement,
    Recall,
    Artillery,
    AirStrike,
}

/// Which event a d100 roll calls for
pub fn random_event(roll: f32) -> RandomEvent {
    if roll <= 30.0 {
        RandomEvent::Reinforcement
    } else if roll <= 55.0 {
        RandomEvent::Recall
    } else if roll <= 80.0 {
        RandomEvent::Artillery
    } else {
        RandomEvent::AirStrike
    }
}

impl Scenario {
    /// Housekeeping between the Enemy Action phase and the next Command
    pub fn end_of_turn(&mut self, dice: &mut dyn Dice) {
        self.clock.advance(self.config.turn_minutes);
        self.weather_minutes += self.config.turn_minutes;
        if self.weather_minutes >= self.config.weather_check_minutes {
            self.weather_minutes = 0;
            if self.weather.check(dice) {
                info!(weather = ?self.weather, "weather changed");
                self.notifications.message("The weather has changed", None);
            }
        }

        let mut dispersal = self.config.smoke_dispersal_chance;
        if self.weather.precipitation.is_falling() {
            dispersal += self.config.smoke_dispersal_precip_bonus;
        }
        let ground = self.weather.ground;
        for unit in self.units.iter_mut() {
            unit.disperse_smoke(dispersal, dice);
            unit.reset_for_turn();
            if unit.pinned {
                unit.unpin_check(dice);
            }
            unit.recalculate_movement(ground);
        }

        let player_id = self.player().id;
        let changes = self.player_mut().crew_recovery(dice);
        for (name, status) in changes {
            self.notifications
                .message(format!("{} is now {}", name, status.name()), Some(player_id));
        }
        let player = self.player_mut();
        player.revalidate_commands();
        player.assign_default_commands_where_idle();

        if dice.chance(self.config.random_event_chance) {
            let event = random_event(dice.percentile());
            debug!(?event, turn = self.turn, "random event");
            self.random_event(event, dice);
        }
        self.resolve_all(dice);
    }

    pub fn random_event(&mut self, event: RandomEvent, dice: &mut dyn Dice) {
        match event {
            RandomEvent::Reinforcement => self.reinforce(dice),
            RandomEvent::Recall => self.recall_enemies(dice),
            RandomEvent::Artillery => {
                if dice.chance(self.context.support.artillery) {
                    self.support_strike(ARTILLERY_FP, SoundEvent::Artillery, dice);
                }
            }
            RandomEvent::AirStrike => {
                let flyable = self.weather.clouds != CloudCover::Overcast;
                if flyable && dice.chance(self.context.support.air) {
                    self.support_strike(AIR_STRIKE_FP, SoundEvent::AirStrike, dice);
                }
            }
        }
    }

    fn reinforce(&mut self, dice: &mut dyn Dice) {
        let Ok(stats) = self.pick_enemy_type(dice) else {
            return;
        };
        let ring = HexCoord::ORIGIN.ring(ACTIVE_RADIUS);
        let hex = ring[dice.index(ring.len())];
        let Some(index) = self.spawn_enemy(&stats, hex, dice) else {
            return;
        };
        info!(unit = %stats.name, "enemy reinforcement");
        let id = self.units[index].id;
        self.notifications
            .message(format!("Enemy reinforcements: {}", stats.name), Some(id));
    }

    fn recall_enemies(&mut self, dice: &mut dyn Dice) {
        let mut candidates: Vec<usize> = self
            .enemy_indices()
            .into_iter()
            .filter(|&i| !self.units[i].recalled)
            .collect();
        let count = dice.range(1, MAX_RECALLED) as usize;
        for _ in 0..count.min(candidates.len()) {
            let pick = candidates.remove(dice.index(candidates.len()));
            self.units[pick].recalled = true;
        }
        if count > 0 && !self.enemy_indices().is_empty() {
            self.notifications.message("Enemy units are pulling back", None);
        }
    }

    /// Friendly support fire on a random enemy in the active rings
    fn support_strike(&mut self, fp: u32, sound: SoundEvent, dice: &mut dyn Dice) {
        let candidates: Vec<usize> = self
            .enemy_indices()
            .into_iter()
            .filter(|&i| self.units[i].hex.distance(&HexCoord::ORIGIN) <= ACTIVE_RADIUS)
            .collect();
        if candidates.is_empty() {
            return;
        }
        let index = candidates[dice.index(candidates.len())];
        let target = &mut self.units[index];
        let (id, name) = (target.id, target.stats.name.clone());
        // support kills are not credited to the player's crew
        target.last_hit_by = None;

        if sound == SoundEvent::AirStrike && target.is_armoured() {
            target.ap_hits_to_resolve.push(air_strike_hit(target.hex, id, &name));
        } else {
            target.fp_to_resolve += fp;
            target.hit_by_fp = true;
        }
        info!(target = %name, ?sound, "support strike");
        self.notifications.sound(Some(id), sound);
        let text = match sound {
            SoundEvent::AirStrike => format!("Air strike on {}", name),
            _ => format!("Artillery falls on {}", name),
        };
        self.notifications.message(text, Some(id));
    }
}

/// A bomb hit on an armoured target, struck from an unknown direction
fn air_strike_hit(hex: HexCoord, target: UnitId, target_name: &str) -> AttackProfile {
    let bomb = WeaponStats {
        name: "Aerial bomb".into(),
        kind: WeaponKind::Gun,
        calibre: Some(AIR_STRIKE_CALIBRE),
        barrel: BarrelLength::Normal,
        mount: Mount::Hull,
        max_range: 0,
        rof: 0.0,
        fp: AIR_STRIKE_FP,
        firing_group: None,
        ammo_types: vec![AmmoType::He],
        max_ammo: 0,
        rr_size: 0,
        operators: Vec::new(),
        loaded: false,
        all_around: true,
    };
    // fired from the target's own hex, so the struck facing is rolled
    let mut profile = AttackProfile::new(
        AttackKind::PointFire,
        UnitId::new(),
        "Air support",
        hex,
        0,
        &bomb,
        target,
        target_name,
        Some(AmmoType::He),
        0,
        0.0,
    );
    profile.result = Some(AttackResult::Hit);
    profile
}
