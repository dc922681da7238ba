//! End-of-scenario results

use serde::{Deserialize, Serialize};

use super::context::Mission;
use crate::content::units::{UnitCategory, UnitStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioOutcome {
    /// No enemy left in the active rings
    Victory,
    PlayerDestroyed,
    PlayerAbandoned,
    PlayerImmobilized,
    CrewKilled,
    /// Ends the campaign, not just the scenario
    CommanderKilled,
}

impl ScenarioOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            ScenarioOutcome::Victory => "The area is clear of enemy forces.",
            ScenarioOutcome::PlayerDestroyed => "Your tank has been destroyed.",
            ScenarioOutcome::PlayerAbandoned => "Your crew has abandoned the tank.",
            ScenarioOutcome::PlayerImmobilized => "Your tank is immobilized and out of the fight.",
            ScenarioOutcome::CrewKilled => "Your entire crew has been killed.",
            ScenarioOutcome::CommanderKilled => "Your commander has been killed.",
        }
    }

    pub fn is_victory(&self) -> bool {
        *self == ScenarioOutcome::Victory
    }
}

/// Enemy units destroyed, by kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KillCounts {
    pub infantry: u32,
    pub guns: u32,
    pub vehicles: u32,
}

impl KillCounts {
    pub fn total(&self) -> u32 {
        self.infantry + self.guns + self.vehicles
    }
}

/// Unscaled victory points for destroying a unit of this template
pub fn victory_points(stats: &UnitStats) -> f32 {
    match stats.category {
        UnitCategory::Infantry => 1.0,
        UnitCategory::Gun => 2.0,
        UnitCategory::Vehicle if stats.armour.is_some() => 3.0,
        UnitCategory::Vehicle | UnitCategory::NonCombat => 2.0,
        UnitCategory::TrainCar => 4.0,
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub outcome: Option<ScenarioOutcome>,
    pub turns: u32,
    pub victory_points: u32,
    /// Unrounded, mission-scaled total
    raw_points: f32,
    pub kills: KillCounts,
    /// Player crew position index credited with each kill
    pub kill_credits: Vec<usize>,
    pub friendly_losses: u32,
    /// Crewman name, experience after award, levels gained
    pub experience: Vec<(String, u32, u32)>,
}

impl ScenarioReport {
    pub fn record_kill(&mut self, stats: &UnitStats, mission: Mission, credit: Option<usize>) {
        match stats.category {
            UnitCategory::Infantry => self.kills.infantry += 1,
            UnitCategory::Gun => self.kills.guns += 1,
            _ => self.kills.vehicles += 1,
        }
        self.raw_points += victory_points(stats) * mission.vp_multiplier();
        self.victory_points = self.raw_points.round() as u32;
        if let Some(position) = credit {
            self.kill_credits.push(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::units::Catalogue;

    #[test]
    fn test_kills_scale_by_mission() {
        let catalogue = Catalogue::builtin().unwrap();
        let mut report = ScenarioReport::default();
        report.record_kill(catalogue.get("7tp").unwrap(), Mission::HillDefence, Some(1));
        report.record_kill(catalogue.get("polish_rifle_squad").unwrap(), Mission::HillDefence, None);
        assert_eq!(report.kills.vehicles, 1);
        assert_eq!(report.kills.infantry, 1);
        assert_eq!(report.kills.total(), 2);
        // (3 + 1) * 1.5
        assert_eq!(report.victory_points, 6);
        assert_eq!(report.kill_credits, vec![1]);
    }

    #[test]
    fn test_patrol_rounds_accumulated_points() {
        let catalogue = Catalogue::builtin().unwrap();
        let squad = catalogue.get("polish_rifle_squad").unwrap();
        let mut report = ScenarioReport::default();
        report.record_kill(squad, Mission::Patrol, None);
        report.record_kill(squad, Mission::Patrol, None);
        assert_eq!(report.victory_points, 2);
    }
}
