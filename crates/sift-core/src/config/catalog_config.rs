use serde::{Deserialize, Serialize};

use super::defaults;

/// Weights of the composite intent score. Must be non-negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub volume: f64,
    pub resolution: f64,
    pub repetition: f64,
    pub acceptance: f64,
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.volume + self.resolution + self.repetition + self.acceptance
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            volume: defaults::DEFAULT_WEIGHT_VOLUME,
            resolution: defaults::DEFAULT_WEIGHT_RESOLUTION,
            repetition: defaults::DEFAULT_WEIGHT_REPETITION,
            acceptance: defaults::DEFAULT_WEIGHT_ACCEPTANCE,
        }
    }
}

/// Multipliers applied per risk level. Riskier intents are less suited to suggestions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskMultipliers {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for RiskMultipliers {
    fn default() -> Self {
        Self {
            low: defaults::DEFAULT_RISK_MULTIPLIER_LOW,
            medium: defaults::DEFAULT_RISK_MULTIPLIER_MEDIUM,
            high: defaults::DEFAULT_RISK_MULTIPLIER_HIGH,
        }
    }
}

/// Intent Catalog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Share of an intent's previous members that must land in one new cluster to rebind.
    pub relink_overlap_threshold: f64,
    /// Recompute cycles an active intent may stay unbound before it is deactivated.
    pub inactive_after_cycles: u32,
    /// Volume at which the normalized volume term reaches 0.5.
    pub volume_half_saturation: f64,
    /// Resolution time at which the inverse-resolution term reaches 0.5.
    pub resolution_half_life_hours: f64,
    pub weights: ScoreWeights,
    pub risk_multipliers: RiskMultipliers,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            relink_overlap_threshold: defaults::DEFAULT_RELINK_OVERLAP_THRESHOLD,
            inactive_after_cycles: defaults::DEFAULT_INACTIVE_AFTER_CYCLES,
            volume_half_saturation: defaults::DEFAULT_VOLUME_HALF_SATURATION,
            resolution_half_life_hours: defaults::DEFAULT_RESOLUTION_HALF_LIFE_HOURS,
            weights: ScoreWeights::default(),
            risk_multipliers: RiskMultipliers::default(),
        }
    }
}
