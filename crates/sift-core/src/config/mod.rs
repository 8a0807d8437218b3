//! Configuration: TOML file → `SIFT_*` environment overrides → validation.

mod catalog_config;
mod clustering_config;
pub mod defaults;
mod embedding_config;
mod feedback_config;
mod generation_config;
mod inference_config;
mod observability_config;
mod storage_config;
mod suggestion_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use catalog_config::{CatalogConfig, RiskMultipliers, ScoreWeights};
pub use clustering_config::{ClusteringConfig, ProjectionConfig, ProjectionMetric};
pub use embedding_config::EmbeddingConfig;
pub use feedback_config::FeedbackConfig;
pub use generation_config::GenerationConfig;
pub use inference_config::InferenceConfig;
pub use observability_config::ObservabilityConfig;
pub use storage_config::StorageConfig;
pub use suggestion_config::SuggestionConfig;

use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub clustering: ClusteringConfig,
    pub catalog: CatalogConfig,
    pub inference: InferenceConfig,
    pub suggestion: SuggestionConfig,
    pub feedback: FeedbackConfig,
    pub generation: GenerationConfig,
    pub observability: ObservabilityConfig,
}

impl SiftConfig {
    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: SiftConfig = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, apply `SIFT_*` environment overrides, and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let mut config: SiftConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup. Takes a closure so tests need not touch
    /// the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SIFT_DB_PATH") {
            self.storage.db_path = v;
        }
        if let Some(v) = lookup("SIFT_EMBEDDING_MODEL") {
            self.embedding.model_version = v;
        }
        if let Some(v) = lookup("SIFT_HIGH_THRESHOLD") {
            self.inference.high_threshold = parse_env("SIFT_HIGH_THRESHOLD", &v)?;
        }
        if let Some(v) = lookup("SIFT_MEDIUM_THRESHOLD") {
            self.inference.medium_threshold = parse_env("SIFT_MEDIUM_THRESHOLD", &v)?;
        }
        if let Some(v) = lookup("SIFT_GENERATION_MODEL") {
            self.generation.model = v;
        }
        if let Some(v) = lookup("SIFT_GENERATION_TIMEOUT_SECS") {
            self.suggestion.generation_timeout_secs =
                parse_env("SIFT_GENERATION_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("SIFT_LOG_JSON") {
            self.observability.json = parse_env("SIFT_LOG_JSON", &v)?;
        }
        Ok(())
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let inference = &self.inference;
        for (field, value) in [
            ("inference.high_threshold", inference.high_threshold),
            ("inference.medium_threshold", inference.medium_threshold),
            (
                "catalog.relink_overlap_threshold",
                self.catalog.relink_overlap_threshold,
            ),
            (
                "clustering.min_cluster_size_fraction",
                self.clustering.min_cluster_size_fraction,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, "must be between 0.0 and 1.0"));
            }
        }
        if inference.medium_threshold > inference.high_threshold {
            return Err(invalid(
                "inference.medium_threshold",
                "must not exceed inference.high_threshold",
            ));
        }

        let weights = &self.catalog.weights;
        if [
            weights.volume,
            weights.resolution,
            weights.repetition,
            weights.acceptance,
        ]
        .iter()
        .any(|w| *w < 0.0 || !w.is_finite())
        {
            return Err(invalid("catalog.weights", "weights must be finite and non-negative"));
        }
        if weights.total() <= 0.0 {
            return Err(invalid("catalog.weights", "at least one weight must be positive"));
        }
        let risk = &self.catalog.risk_multipliers;
        if [risk.low, risk.medium, risk.high].iter().any(|m| *m < 0.0) {
            return Err(invalid("catalog.risk_multipliers", "must be non-negative"));
        }
        if self.catalog.volume_half_saturation <= 0.0 {
            return Err(invalid("catalog.volume_half_saturation", "must be positive"));
        }
        if self.catalog.resolution_half_life_hours <= 0.0 {
            return Err(invalid("catalog.resolution_half_life_hours", "must be positive"));
        }

        let clustering = &self.clustering;
        if clustering.min_samples == 0 {
            return Err(invalid("clustering.min_samples", "must be greater than 0"));
        }
        if clustering.min_cluster_size_floor < 2 {
            return Err(invalid("clustering.min_cluster_size_floor", "must be at least 2"));
        }
        if clustering.projection.n_components == 0 {
            return Err(invalid("clustering.projection.n_components", "must be greater than 0"));
        }
        if clustering.projection.n_neighbors < 2 {
            return Err(invalid("clustering.projection.n_neighbors", "must be at least 2"));
        }
        if clustering.projection.min_dist < 0.0
            || clustering.projection.min_dist > clustering.projection.spread
        {
            return Err(invalid(
                "clustering.projection.min_dist",
                "must be between 0.0 and spread",
            ));
        }

        if self.embedding.batch_size == 0 {
            return Err(invalid("embedding.batch_size", "must be greater than 0"));
        }
        if self.suggestion.generation_timeout_secs == 0 {
            return Err(invalid("suggestion.generation_timeout_secs", "must be greater than 0"));
        }
        if self.feedback.prior_weight < 0.0 || !(0.0..=1.0).contains(&self.feedback.prior_score) {
            return Err(invalid(
                "feedback",
                "prior_weight must be non-negative and prior_score within [0, 1]",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::ValidationFailed {
        field: key.to_string(),
        message: format!("cannot parse {value:?}"),
    })
}
