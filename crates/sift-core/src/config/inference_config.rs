use serde::{Deserialize, Serialize};

use super::defaults;

/// Confidence band thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub high_threshold: f64,
    pub medium_threshold: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            high_threshold: defaults::DEFAULT_HIGH_THRESHOLD,
            medium_threshold: defaults::DEFAULT_MEDIUM_THRESHOLD,
        }
    }
}
