//! Terrain types and their combat effects
//!
//! `Terrain` is what a single unit occupies; `CampaignTerrain` is the
//! campaign-day hex a scenario is fought in and decides the odds of each.

use serde::{Deserialize, Serialize};

use crate::campaign::weather::GroundCondition;
use crate::core::dice::Dice;

/// Terrain a unit sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Terrain {
    #[default]
    OpenGround,
    BrokenGround,
    Brush,
    Woods,
    WoodenBuildings,
    StoneBuildings,
    Hills,
    Fields,
    Marsh,
}

/// One row of the terrain effects table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainEffects {
    pub point_fire_vehicle: f32,
    pub point_fire_other: f32,
    pub area_fire: f32,
    pub hull_down: f32,
    pub bog: f32,
    pub movement: f32,
    pub spotting: f32,
}

impl Terrain {
    pub const ALL: [Terrain; 9] = [
        Terrain::OpenGround,
        Terrain::BrokenGround,
        Terrain::Brush,
        Terrain::Woods,
        Terrain::WoodenBuildings,
        Terrain::StoneBuildings,
        Terrain::Hills,
        Terrain::Fields,
        Terrain::Marsh,
    ];

    pub fn effects(&self) -> TerrainEffects {
        let (pfv, pfo, area, hd, bog, mv, spot) = match self {
            Terrain::OpenGround => (0.0, 0.0, 10.0, 5.0, 0.5, 0.0, 0.0),
            Terrain::BrokenGround => (-5.0, -10.0, -5.0, 15.0, 2.0, -10.0, -5.0),
            Terrain::Brush => (-5.0, -15.0, -10.0, 10.0, 1.0, -5.0, -10.0),
            Terrain::Woods => (-15.0, -25.0, -20.0, 20.0, 3.0, -20.0, -20.0),
            Terrain::WoodenBuildings => (-15.0, -20.0, -10.0, 25.0, 2.0, -15.0, -15.0),
            Terrain::StoneBuildings => (-20.0, -30.0, -25.0, 30.0, 2.0, -15.0, -20.0),
            Terrain::Hills => (-10.0, -15.0, -10.0, 40.0, 1.5, -10.0, -10.0),
            Terrain::Fields => (0.0, -5.0, 0.0, 5.0, 1.0, -5.0, -5.0),
            Terrain::Marsh => (-5.0, -5.0, 0.0, 0.0, 8.0, -25.0, -5.0),
        };
        TerrainEffects {
            point_fire_vehicle: pfv,
            point_fire_other: pfo,
            area_fire: area,
            hull_down: hd,
            bog,
            movement: mv,
            spotting: spot,
        }
    }

    /// Point fire modifier against a target in this terrain
    pub fn point_fire_modifier(&self, vehicle_target: bool) -> f32 {
        let effects = self.effects();
        if vehicle_target {
            effects.point_fire_vehicle
        } else {
            effects.point_fire_other
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Terrain::OpenGround => "Open Ground",
            Terrain::BrokenGround => "Broken Ground",
            Terrain::Brush => "Brush",
            Terrain::Woods => "Woods",
            Terrain::WoodenBuildings => "Wooden Buildings",
            Terrain::StoneBuildings => "Stone Buildings",
            Terrain::Hills => "Hills",
            Terrain::Fields => "Fields",
            Terrain::Marsh => "Marsh",
        }
    }
}

/// Ground condition effects: (movement, bog)
pub fn ground_effects(ground: GroundCondition) -> (f32, f32) {
    match ground {
        GroundCondition::Dry => (0.0, 0.0),
        GroundCondition::Wet => (-5.0, 1.0),
        GroundCondition::Muddy => (-15.0, 3.0),
        GroundCondition::Snow => (-10.0, 1.0),
        GroundCondition::DeepSnow => (-25.0, 4.0),
    }
}

/// Terrain of a campaign-day map hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CampaignTerrain {
    #[default]
    Flat,
    Grassland,
    Forest,
    Hills,
    Villages,
    Marsh,
}

impl CampaignTerrain {
    /// Weighted odds of each unit terrain in a hex of this kind
    pub fn terrain_odds(&self) -> &'static [(Terrain, u32)] {
        match self {
            CampaignTerrain::Flat => &[
                (Terrain::OpenGround, 50),
                (Terrain::BrokenGround, 15),
                (Terrain::Brush, 10),
                (Terrain::Fields, 15),
                (Terrain::WoodenBuildings, 5),
                (Terrain::Woods, 5),
            ],
            CampaignTerrain::Grassland => &[
                (Terrain::OpenGround, 40),
                (Terrain::Fields, 30),
                (Terrain::Brush, 15),
                (Terrain::BrokenGround, 10),
                (Terrain::Woods, 5),
            ],
            CampaignTerrain::Forest => &[
                (Terrain::Woods, 60),
                (Terrain::Brush, 20),
                (Terrain::OpenGround, 10),
                (Terrain::BrokenGround, 10),
            ],
            CampaignTerrain::Hills => &[
                (Terrain::Hills, 45),
                (Terrain::BrokenGround, 25),
                (Terrain::OpenGround, 15),
                (Terrain::Woods, 10),
                (Terrain::Brush, 5),
            ],
            CampaignTerrain::Villages => &[
                (Terrain::WoodenBuildings, 40),
                (Terrain::StoneBuildings, 15),
                (Terrain::OpenGround, 20),
                (Terrain::Fields, 15),
                (Terrain::Brush, 10),
            ],
            CampaignTerrain::Marsh => &[
                (Terrain::Marsh, 60),
                (Terrain::Brush, 20),
                (Terrain::OpenGround, 10),
                (Terrain::Woods, 10),
            ],
        }
    }

    /// Roll a unit terrain from this hex's odds
    pub fn roll_terrain(&self, dice: &mut dyn Dice) -> Terrain {
        let odds = self.terrain_odds();
        let total: u32 = odds.iter().map(|(_, w)| w).sum();
        let mut pick = dice.range(1, total as i32) as u32;
        for (terrain, weight) in odds {
            if pick <= *weight {
                return *terrain;
            }
            pick -= weight;
        }
        odds[0].0
    }

    /// Forest and villages favour infantry, guns and ambushes
    pub fn is_close(&self) -> bool {
        matches!(self, CampaignTerrain::Forest | CampaignTerrain::Villages)
    }

    /// Flat and grassland favour vehicles
    pub fn is_open(&self) -> bool {
        matches!(self, CampaignTerrain::Flat | CampaignTerrain::Grassland)
    }
}
