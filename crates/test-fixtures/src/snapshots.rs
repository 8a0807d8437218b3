use chrono::Utc;
use sift_core::models::{Centroid, ClusterAssignment, ClusterMetrics};
use sift_core::{ClusterSnapshot, ConfidenceCurve, SnapshotVersion};

/// Centroid of cluster `id` in a fixture snapshot: `10 * (id + 1)` on axis `id % dims`.
pub fn fixture_centroid(cluster_id: u32, dims: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; dims];
    v[cluster_id as usize % dims] = 10.0 * (cluster_id as f32 + 1.0);
    v
}

/// Hand-built snapshot. Member `i` of a cluster sits at distance `0.5 + 0.01 * i`;
/// `noise` tickets sit at distance 5.0 from the nearest centroid.
pub fn fixture_snapshot(
    version: u64,
    clusters: &[(u32, &[&str])],
    noise: &[&str],
    dims: usize,
) -> ClusterSnapshot {
    let version = SnapshotVersion(version);
    let mut assignments = Vec::new();
    let mut centroids = Vec::new();
    for (cluster_id, members) in clusters {
        for (i, ticket) in members.iter().enumerate() {
            assignments.push(ClusterAssignment {
                ticket_id: ticket.to_string(),
                cluster_id: Some(*cluster_id),
                distance_to_centroid: 0.5 + 0.01 * i as f64,
                is_noise: false,
                snapshot_version: version,
            });
        }
        centroids.push(Centroid {
            cluster_id: *cluster_id,
            vector: fixture_centroid(*cluster_id, dims),
            size: members.len(),
        });
    }
    for ticket in noise {
        assignments.push(ClusterAssignment {
            ticket_id: ticket.to_string(),
            cluster_id: None,
            distance_to_centroid: 5.0,
            is_noise: true,
            snapshot_version: version,
        });
    }
    assignments.sort_by(|a, b| a.ticket_id.cmp(&b.ticket_id));
    centroids.sort_by_key(|c| c.cluster_id);

    let member_distances: Vec<f64> = assignments
        .iter()
        .filter(|a| !a.is_noise)
        .map(|a| a.distance_to_centroid)
        .collect();
    let total = assignments.len().max(1);
    ClusterSnapshot {
        version,
        model_version: "fixture-model".to_string(),
        created_at: Utc::now(),
        fingerprint: format!("fixture-{}", version.value()),
        calibration: ConfidenceCurve::fit(&member_distances),
        metrics: ClusterMetrics {
            n_clusters: centroids.len(),
            noise_count: noise.len(),
            noise_ratio: noise.len() as f64 / total as f64,
            silhouette: 0.0,
        },
        assignments,
        centroids,
    }
}
