use std::collections::HashMap;
use std::io::Write;

use sift_core::config::*;
use sift_core::errors::ConfigError;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = SiftConfig::from_toml("").unwrap();

    // Storage defaults
    assert_eq!(config.storage.db_path, "sift.db");
    assert_eq!(config.storage.busy_timeout_ms, 5_000);
    assert_eq!(config.storage.read_pool_size, 4);

    // Embedding defaults
    assert_eq!(config.embedding.model_version, "text-embedding-3-small");
    assert_eq!(config.embedding.dimensions, 1536);
    assert_eq!(config.embedding.batch_size, 100);

    // Clustering defaults
    assert_eq!(config.clustering.min_cluster_size_floor, 20);
    assert_eq!(config.clustering.min_samples, 5);
    assert_eq!(config.clustering.projection.n_neighbors, 15);
    assert_eq!(config.clustering.projection.n_components, 25);
    assert_eq!(config.clustering.projection.seed, 42);
    assert_eq!(config.clustering.projection.metric, ProjectionMetric::Cosine);

    // Inference defaults
    assert_eq!(config.inference.high_threshold, 0.75);
    assert_eq!(config.inference.medium_threshold, 0.5);

    // Catalog defaults
    assert_eq!(config.catalog.relink_overlap_threshold, 0.5);
    assert_eq!(config.catalog.inactive_after_cycles, 3);

    // Suggestion defaults
    assert_eq!(config.suggestion.generation_timeout_secs, 30);
    assert_eq!(config.suggestion.examples_per_prompt, 3);

    // Observability defaults
    assert_eq!(config.observability.log_level, "info");
    assert!(!config.observability.json);
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[inference]
high_threshold = 0.8

[clustering.projection]
enabled = false
"#;
    let config = SiftConfig::from_toml(toml).unwrap();
    assert_eq!(config.inference.high_threshold, 0.8);
    // Non-overridden fields keep defaults
    assert_eq!(config.inference.medium_threshold, 0.5);
    assert!(!config.clustering.projection.enabled);
    assert_eq!(config.clustering.projection.n_neighbors, 15);
}

#[test]
fn config_serde_roundtrip() {
    let config = SiftConfig::default();
    let toml_str = toml::to_string(&config).unwrap();
    let roundtripped = SiftConfig::from_toml(&toml_str).unwrap();
    assert_eq!(roundtripped.storage.db_path, config.storage.db_path);
    assert_eq!(
        roundtripped.catalog.weights.volume,
        config.catalog.weights.volume
    );
}

#[test]
fn min_cluster_size_uses_floor_or_fraction() {
    let config = ClusteringConfig::default();
    assert_eq!(config.min_cluster_size(100), 20);
    assert_eq!(config.min_cluster_size(1_000), 30);
    assert_eq!(config.min_cluster_size(10_000), 300);
}

#[test]
fn validation_rejects_medium_above_high() {
    let toml = r#"
[inference]
high_threshold = 0.4
medium_threshold = 0.6
"#;
    let err = SiftConfig::from_toml(toml).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "inference.medium_threshold"));
}

#[test]
fn validation_rejects_threshold_out_of_range() {
    let err = SiftConfig::from_toml("[inference]\nhigh_threshold = 1.5\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { .. }));
}

#[test]
fn validation_rejects_negative_and_all_zero_weights() {
    let negative = "[catalog.weights]\nvolume = -0.1\n";
    assert!(SiftConfig::from_toml(negative).is_err());

    let zero = "[catalog.weights]\nvolume = 0.0\nresolution = 0.0\nrepetition = 0.0\nacceptance = 0.0\n";
    assert!(SiftConfig::from_toml(zero).is_err());
}

#[test]
fn validation_rejects_zero_components_and_min_samples() {
    assert!(SiftConfig::from_toml("[clustering.projection]\nn_components = 0\n").is_err());
    assert!(SiftConfig::from_toml("[clustering]\nmin_samples = 0\n").is_err());
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = SiftConfig::from_toml("[inference\nhigh").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn env_overrides_apply_before_validation() {
    let vars: HashMap<&str, &str> = [
        ("SIFT_DB_PATH", "/tmp/override.db"),
        ("SIFT_HIGH_THRESHOLD", "0.9"),
        ("SIFT_LOG_JSON", "true"),
    ]
    .into_iter()
    .collect();
    let mut config = SiftConfig::default();
    config
        .apply_env_overrides(|k| vars.get(k).map(|v| v.to_string()))
        .unwrap();
    assert_eq!(config.storage.db_path, "/tmp/override.db");
    assert_eq!(config.inference.high_threshold, 0.9);
    assert!(config.observability.json);
    config.validate().unwrap();
}

#[test]
fn unparsable_env_override_is_rejected() {
    let mut config = SiftConfig::default();
    let err = config
        .apply_env_overrides(|k| (k == "SIFT_MEDIUM_THRESHOLD").then(|| "lots".to_string()))
        .unwrap_err();
    assert!(err.to_string().contains("SIFT_MEDIUM_THRESHOLD"));
}

#[test]
fn load_reads_file_and_reports_missing() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[feedback]\nprior_weight = 2.0").unwrap();
    let config = SiftConfig::load(file.path()).unwrap();
    assert_eq!(config.feedback.prior_weight, 2.0);

    let missing = SiftConfig::load(std::path::Path::new("/definitely/not/here.toml"));
    assert!(matches!(missing, Err(ConfigError::FileNotFound { .. })));
}
