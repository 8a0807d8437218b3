//! Four-phase recompute pipeline.
//!
//! Phase 1: Projection → Phase 2: Clustering → Phase 3: Centroids →
//! Phase 4: Calibration

pub mod phase1_projection;
pub mod phase2_clustering;
pub mod phase3_centroids;
pub mod phase4_calibration;

use chrono::Utc;
use sift_core::config::ClusteringConfig;
use sift_core::models::ClusterMetrics;
use sift_core::{ClusterSnapshot, EmbeddingRecord, SiftResult, SnapshotVersion};
use tracing::{debug, info};

use crate::algorithms::silhouette::mean_silhouette;

/// Run all phases over records sorted by ticket id.
pub fn run_pipeline(
    records: &[EmbeddingRecord],
    config: &ClusteringConfig,
    version: SnapshotVersion,
    fingerprint: String,
) -> SiftResult<ClusterSnapshot> {
    let vectors: Vec<Vec<f32>> = records.iter().map(|r| r.vector.clone()).collect();

    // Phase 1: Projection.
    let projected = phase1_projection::project(&vectors, &config.projection)?;
    debug!(
        points = projected.len(),
        dims = projected.first().map(Vec::len).unwrap_or(0),
        "Phase 1: projection complete"
    );

    // Phase 2: Clustering.
    let min_cluster_size = config.min_cluster_size(records.len());
    let labels = phase2_clustering::cluster(&projected, min_cluster_size, config.min_samples)?;
    let n_clusters = phase2_clustering::cluster_count(&labels);
    let noise_count = labels.iter().filter(|l| **l < 0).count();
    info!(
        clusters = n_clusters,
        noise = noise_count,
        min_cluster_size,
        "Phase 2: clustering complete"
    );

    // Phase 3: Centroids and assignments.
    let (centroids, assignments) =
        phase3_centroids::build(records, &vectors, &labels, n_clusters, version);

    // Phase 4: Calibration.
    let calibration = phase4_calibration::calibrate(&assignments);
    debug!(
        midpoint = calibration.midpoint,
        steepness = calibration.steepness,
        "Phase 4: calibration complete"
    );

    let metrics = ClusterMetrics {
        n_clusters,
        noise_count,
        noise_ratio: noise_count as f64 / records.len().max(1) as f64,
        silhouette: mean_silhouette(&projected, &labels),
    };

    Ok(ClusterSnapshot {
        version,
        model_version: records
            .first()
            .map(|r| r.model_version.clone())
            .unwrap_or_default(),
        created_at: Utc::now(),
        fingerprint,
        assignments,
        centroids,
        calibration,
        metrics,
    })
}
