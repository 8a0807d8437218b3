use serde::{Deserialize, Serialize};

use super::defaults;

/// Feedback Aggregator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Pseudo-events pulling sparse intent metrics toward `prior_score`.
    pub prior_weight: f64,
    pub prior_score: f64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            prior_weight: defaults::DEFAULT_FEEDBACK_PRIOR_WEIGHT,
            prior_score: defaults::DEFAULT_FEEDBACK_PRIOR_SCORE,
        }
    }
}
