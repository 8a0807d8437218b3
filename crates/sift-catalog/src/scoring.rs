//! Composite intent score.
//!
//! `risk * (w_v * V + w_r * R + w_rep * rep + w_acc * acc) / sum(w)` where
//! `V = v / (v + half_saturation)` and `R = 1 / (1 + hours / half_life)`.
//! Each term is non-decreasing in its input, so the score is monotonic in volume,
//! repetition and acceptance, and non-increasing in resolution time.

use std::collections::HashMap;

use sift_core::config::CatalogConfig;
use sift_core::models::IntentFeedbackStats;
use sift_core::{ClusterSnapshot, Intent, RiskLevel};

/// Raw inputs of the composite score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    pub volume: u64,
    /// `None` when no member ticket was solved yet; contributes nothing.
    pub avg_resolution_hours: Option<f64>,
    pub repetition_score: f64,
    pub acceptance_rate: f64,
    pub risk_level: RiskLevel,
}

impl ScoreInputs {
    pub fn of(intent: &Intent) -> Self {
        Self {
            volume: intent.volume,
            avg_resolution_hours: intent.avg_resolution_hours,
            repetition_score: intent.repetition_score,
            acceptance_rate: intent.acceptance_rate,
            risk_level: intent.risk_level,
        }
    }
}

pub fn composite_score(inputs: &ScoreInputs, config: &CatalogConfig) -> f64 {
    let w = &config.weights;
    let total = w.total();
    if total <= 0.0 {
        return 0.0;
    }

    let v = inputs.volume as f64;
    let volume_term = v / (v + config.volume_half_saturation);
    let resolution_term = inputs
        .avg_resolution_hours
        .filter(|h| h.is_finite())
        .map(|h| 1.0 / (1.0 + h.max(0.0) / config.resolution_half_life_hours))
        .unwrap_or(0.0);
    let weighted = w.volume * volume_term
        + w.resolution * resolution_term
        + w.repetition * inputs.repetition_score.clamp(0.0, 1.0)
        + w.acceptance * inputs.acceptance_rate.clamp(0.0, 1.0);

    risk_multiplier(inputs.risk_level, config) * weighted / total
}

pub fn risk_multiplier(risk: RiskLevel, config: &CatalogConfig) -> f64 {
    let m = &config.risk_multipliers;
    match risk {
        RiskLevel::Low => m.low,
        RiskLevel::Medium => m.medium,
        RiskLevel::High => m.high,
    }
}

/// Refresh score inputs from the snapshot, resolution times and feedback metrics,
/// then recompute the composite score. Unbound intents get volume 0.
pub fn rescore(
    intent: &mut Intent,
    snapshot: &ClusterSnapshot,
    resolution_hours: &HashMap<u32, f64>,
    metrics: &HashMap<String, IntentFeedbackStats>,
    config: &CatalogConfig,
) {
    match intent.cluster_id {
        Some(cluster_id) => {
            intent.volume = snapshot
                .centroid(cluster_id)
                .map(|c| c.size as u64)
                .unwrap_or(0);
            intent.avg_resolution_hours = resolution_hours.get(&cluster_id).copied();
        }
        None => intent.volume = 0,
    }
    if let Some(stats) = metrics.get(&intent.intent_id) {
        intent.repetition_score = stats.repetition_score;
        intent.acceptance_rate = stats.acceptance_rate;
    }
    intent.composite_score = composite_score(&ScoreInputs::of(intent), config);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(volume: u64) -> ScoreInputs {
        ScoreInputs {
            volume,
            avg_resolution_hours: Some(12.0),
            repetition_score: 0.4,
            acceptance_rate: 0.6,
            risk_level: RiskLevel::Low,
        }
    }

    #[test]
    fn score_is_bounded_by_risk_multiplier() {
        let config = CatalogConfig::default();
        let max = ScoreInputs {
            volume: u64::MAX / 2,
            avg_resolution_hours: Some(0.0),
            repetition_score: 1.0,
            acceptance_rate: 1.0,
            risk_level: RiskLevel::High,
        };
        let score = composite_score(&max, &config);
        assert!(score <= config.risk_multipliers.high + 1e-9);
        assert!(score > 0.0);
    }

    #[test]
    fn faster_resolution_scores_higher() {
        let config = CatalogConfig::default();
        let mut slow = inputs(50);
        slow.avg_resolution_hours = Some(72.0);
        assert!(composite_score(&inputs(50), &config) > composite_score(&slow, &config));
    }

    #[test]
    fn riskier_intents_score_lower() {
        let config = CatalogConfig::default();
        let mut risky = inputs(50);
        risky.risk_level = RiskLevel::High;
        assert!(composite_score(&inputs(50), &config) > composite_score(&risky, &config));
    }
}
