//! ClusterEngine: validates input, runs the pipeline, enforces the recompute guard.

use sift_core::config::ClusteringConfig;
use sift_core::constants::MIN_PUBLISHABLE_CLUSTERS;
use sift_core::errors::ClusteringError;
use sift_core::{ClusterSnapshot, EmbeddingRecord, SiftResult, SnapshotVersion};
use tracing::{info, warn};

use crate::fingerprint;
use crate::lock::{RecomputeGuard, RecomputeLock};
use crate::pipeline;

/// Produces immutable snapshots from a full set of embeddings.
///
/// The engine never persists anything; the caller publishes the snapshot and
/// holds the guard returned by [`ClusterEngine::try_begin`] until it has.
pub struct ClusterEngine {
    config: ClusteringConfig,
    lock: RecomputeLock,
}

impl ClusterEngine {
    pub fn new(config: ClusteringConfig) -> Self {
        Self {
            config,
            lock: RecomputeLock::new(),
        }
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.lock.is_running()
    }

    /// Acquire the single-execution guard without waiting.
    pub fn try_begin(&self) -> Result<RecomputeGuard, ClusteringError> {
        self.lock.try_acquire()
    }

    /// Fingerprint of the input after canonical ordering.
    pub fn fingerprint(&self, records: &[EmbeddingRecord]) -> String {
        let sorted = sorted_records(records);
        let model = sorted.first().map(|r| r.model_version.as_str()).unwrap_or("");
        fingerprint::fingerprint(model, &self.config, &sorted)
    }

    /// Run the pipeline. The caller holds the guard from [`ClusterEngine::try_begin`].
    pub fn compute(
        &self,
        records: &[EmbeddingRecord],
        version: SnapshotVersion,
    ) -> SiftResult<ClusterSnapshot> {
        let sorted = sorted_records(records);
        validate(&sorted, &self.config)?;

        let model = sorted[0].model_version.clone();
        let fp = fingerprint::fingerprint(&model, &self.config, &sorted);
        info!(
            tickets = sorted.len(),
            model = %model,
            version = %version,
            "cluster recompute started"
        );

        let snapshot = pipeline::run_pipeline(&sorted, &self.config, version, fp)?;
        if snapshot.metrics.n_clusters < MIN_PUBLISHABLE_CLUSTERS {
            warn!(
                clusters = snapshot.metrics.n_clusters,
                "recompute produced too few clusters"
            );
            return Err(ClusteringError::InsufficientClusters {
                found: snapshot.metrics.n_clusters,
                required: MIN_PUBLISHABLE_CLUSTERS,
            }
            .into());
        }

        info!(
            clusters = snapshot.metrics.n_clusters,
            noise_ratio = snapshot.metrics.noise_ratio,
            silhouette = snapshot.metrics.silhouette,
            "cluster recompute finished"
        );
        Ok(snapshot)
    }

}

fn sorted_records(records: &[EmbeddingRecord]) -> Vec<EmbeddingRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| a.ticket_id.cmp(&b.ticket_id));
    sorted.dedup_by(|a, b| a.ticket_id == b.ticket_id);
    sorted
}

fn validate(records: &[EmbeddingRecord], config: &ClusteringConfig) -> SiftResult<()> {
    let Some(first) = records.first() else {
        return Err(ClusteringError::InsufficientClusters {
            found: 0,
            required: MIN_PUBLISHABLE_CLUSTERS,
        }
        .into());
    };

    let dims = first.dimensions();
    for record in records {
        if record.model_version != first.model_version {
            return Err(ClusteringError::ClusteringFailed {
                reason: format!(
                    "mixed model versions: {} and {}",
                    first.model_version, record.model_version
                ),
            }
            .into());
        }
        if record.dimensions() != dims {
            return Err(ClusteringError::DimensionMismatch {
                expected: dims,
                actual: record.dimensions(),
            }
            .into());
        }
    }
    if dims == 0 {
        return Err(ClusteringError::ClusteringFailed {
            reason: "empty embedding vectors".to_string(),
        }
        .into());
    }

    // Fewer points than two minimum-size clusters can never publish.
    let min_size = config.min_cluster_size(records.len());
    if records.len() < min_size * MIN_PUBLISHABLE_CLUSTERS {
        return Err(ClusteringError::InsufficientClusters {
            found: 0,
            required: MIN_PUBLISHABLE_CLUSTERS,
        }
        .into());
    }
    Ok(())
}
