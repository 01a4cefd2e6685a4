//! Gamified plant indicators.
//!
//! Two independent views over the same score source:
//! - `HealthSimulator` accumulates a health value on a fixed tick and derives a
//!   growth stage from it (foreground).
//! - `PlantMood` is the six-word state shown on the monitor badge (background).
//!
//! Both are memory-less functions of their input, unlike the coach tiers.

use serde::{Deserialize, Serialize};

pub const INITIAL_HEALTH: f64 = 50.0;
pub const MAX_HEALTH: f64 = 100.0;

/// Health change per tick for a given score.
pub fn health_delta(score: f64) -> f64 {
    if score >= 75.0 {
        1.0
    } else if score >= 50.0 {
        -0.8
    } else if score >= 30.0 {
        -2.0
    } else {
        -3.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GrowthStage {
    Seed = 1,
    Sprout = 2,
    Growing = 3,
    Flowering = 4,
    FullBloom = 5,
}

impl GrowthStage {
    pub fn from_health(health: f64) -> Self {
        if health >= 80.0 {
            GrowthStage::FullBloom
        } else if health >= 60.0 {
            GrowthStage::Flowering
        } else if health >= 40.0 {
            GrowthStage::Growing
        } else if health >= 20.0 {
            GrowthStage::Sprout
        } else {
            GrowthStage::Seed
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantHealth {
    pub health: f64,
    pub stage: GrowthStage,
}

/// Plant health stat advanced once per tick by the latest score.
#[derive(Debug, Clone)]
pub struct HealthSimulator {
    health: f64,
}

impl Default for HealthSimulator {
    fn default() -> Self {
        Self::new(INITIAL_HEALTH)
    }
}

impl HealthSimulator {
    pub fn new(health: f64) -> Self {
        Self {
            health: health.clamp(0.0, MAX_HEALTH),
        }
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn snapshot(&self) -> PlantHealth {
        PlantHealth {
            health: self.health,
            stage: GrowthStage::from_health(self.health),
        }
    }

    pub fn tick(&mut self, score: f64) -> PlantHealth {
        self.health = (self.health + health_delta(score)).clamp(0.0, MAX_HEALTH);
        self.snapshot()
    }
}

/// Badge word for the monitor's plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantMood {
    Dormant,
    Wilting,
    Sprout,
    Growing,
    Flowering,
    Bloom,
}

impl PlantMood {
    pub fn derive(is_monitoring: bool, score: f64) -> Self {
        if !is_monitoring {
            PlantMood::Dormant
        } else if score >= 85.0 {
            PlantMood::Bloom
        } else if score >= 70.0 {
            PlantMood::Flowering
        } else if score >= 50.0 {
            PlantMood::Growing
        } else if score >= 30.0 {
            PlantMood::Sprout
        } else {
            PlantMood::Wilting
        }
    }
}

/// Toolbar badge: empty while idle, otherwise the rounded score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub text: String,
    pub color: Option<&'static str>,
}

impl Badge {
    pub const GREEN: &'static str = "#10B981";
    pub const AMBER: &'static str = "#F59E0B";
    pub const RED: &'static str = "#EF4444";

    pub fn derive(is_monitoring: bool, score: f64) -> Self {
        if !is_monitoring {
            return Self {
                text: String::new(),
                color: None,
            };
        }

        let color = if score >= 70.0 {
            Self::GREEN
        } else if score >= 50.0 {
            Self::AMBER
        } else {
            Self::RED
        };
        Self {
            text: format!("{}", score.round() as i64),
            color: Some(color),
        }
    }
}
