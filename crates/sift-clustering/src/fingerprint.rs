//! Content fingerprint of a recompute input.
//!
//! Two runs over the same vectors with the same parameters produce the same
//! fingerprint, which lets the caller skip publishing an identical snapshot.

use sift_core::config::ClusteringConfig;
use sift_core::EmbeddingRecord;

/// blake3 over model version, parameters, then every `(ticket_id, vector)` in input order.
pub fn fingerprint(model_version: &str, config: &ClusteringConfig, records: &[EmbeddingRecord]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(model_version.as_bytes());
    hasher.update(&[0]);
    // Parameters serialise deterministically: struct fields keep declaration order.
    let params = serde_json::to_vec(config).unwrap_or_default();
    hasher.update(&params);
    hasher.update(&[0]);
    for record in records {
        hasher.update(record.ticket_id.as_bytes());
        hasher.update(&[0]);
        for value in &record.vector {
            hasher.update(&value.to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_with_vectors_and_parameters() {
        let config = ClusteringConfig::default();
        let a = vec![EmbeddingRecord::new("t1", vec![1.0, 2.0], "m")];
        let b = vec![EmbeddingRecord::new("t1", vec![1.0, 2.5], "m")];
        assert_eq!(fingerprint("m", &config, &a), fingerprint("m", &config, &a));
        assert_ne!(fingerprint("m", &config, &a), fingerprint("m", &config, &b));

        let mut tuned = config.clone();
        tuned.min_samples += 1;
        assert_ne!(fingerprint("m", &config, &a), fingerprint("m", &tuned, &a));
        assert_ne!(fingerprint("m", &config, &a), fingerprint("m2", &config, &a));
    }
}
