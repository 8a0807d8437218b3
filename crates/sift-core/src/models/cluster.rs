use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::confidence::ConfidenceCurve;

/// Monotonic identifier of a published clustering snapshot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SnapshotVersion(pub u64);

impl SnapshotVersion {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SnapshotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Placement of one ticket in one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub ticket_id: String,
    /// `None` for noise.
    pub cluster_id: Option<u32>,
    /// Original-space Euclidean distance to the own centroid, or to the nearest
    /// centroid for noise.
    pub distance_to_centroid: f64,
    pub is_noise: bool,
    pub snapshot_version: SnapshotVersion,
}

/// Mean of a cluster's member vectors in the original embedding space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub cluster_id: u32,
    pub vector: Vec<f32>,
    pub size: usize,
}

/// Quality summary of one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClusterMetrics {
    pub n_clusters: usize,
    pub noise_count: usize,
    pub noise_ratio: f64,
    /// Mean silhouette over non-noise points in the projected space.
    pub silhouette: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterStats {
    pub cluster_id: u32,
    pub volume: usize,
    pub avg_distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
}

/// Immutable result of a full recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    pub version: SnapshotVersion,
    pub model_version: String,
    pub created_at: DateTime<Utc>,
    /// blake3 over model version, parameters, ticket ids and vectors.
    pub fingerprint: String,
    /// Sorted by ticket id.
    pub assignments: Vec<ClusterAssignment>,
    /// Sorted by cluster id.
    pub centroids: Vec<Centroid>,
    pub calibration: ConfidenceCurve,
    pub metrics: ClusterMetrics,
}

impl ClusterSnapshot {
    pub fn centroid(&self, cluster_id: u32) -> Option<&Centroid> {
        self.centroids.iter().find(|c| c.cluster_id == cluster_id)
    }

    pub fn cluster_ids(&self) -> Vec<u32> {
        self.centroids.iter().map(|c| c.cluster_id).collect()
    }

    pub fn assignment(&self, ticket_id: &str) -> Option<&ClusterAssignment> {
        self.assignments
            .binary_search_by(|a| a.ticket_id.as_str().cmp(ticket_id))
            .ok()
            .map(|idx| &self.assignments[idx])
    }

    /// Ticket ids of a cluster's members.
    pub fn members(&self, cluster_id: u32) -> HashSet<&str> {
        self.assignments
            .iter()
            .filter(|a| a.cluster_id == Some(cluster_id))
            .map(|a| a.ticket_id.as_str())
            .collect()
    }

    /// The `n` members nearest the centroid. Ties break by ticket id.
    pub fn representatives(&self, cluster_id: u32, n: usize) -> Vec<String> {
        let mut members: Vec<&ClusterAssignment> = self
            .assignments
            .iter()
            .filter(|a| a.cluster_id == Some(cluster_id))
            .collect();
        members.sort_by(|a, b| {
            a.distance_to_centroid
                .total_cmp(&b.distance_to_centroid)
                .then_with(|| a.ticket_id.cmp(&b.ticket_id))
        });
        members
            .into_iter()
            .take(n)
            .map(|a| a.ticket_id.clone())
            .collect()
    }

    pub fn stats(&self) -> Vec<ClusterStats> {
        self.centroids
            .iter()
            .map(|centroid| {
                let distances: Vec<f64> = self
                    .assignments
                    .iter()
                    .filter(|a| a.cluster_id == Some(centroid.cluster_id))
                    .map(|a| a.distance_to_centroid)
                    .collect();
                let volume = distances.len();
                let sum: f64 = distances.iter().sum();
                ClusterStats {
                    cluster_id: centroid.cluster_id,
                    volume,
                    avg_distance: if volume == 0 { 0.0 } else { sum / volume as f64 },
                    min_distance: distances.iter().copied().fold(f64::INFINITY, f64::min),
                    max_distance: distances.iter().copied().fold(0.0, f64::max),
                }
            })
            .collect()
    }

    pub fn dimensions(&self) -> usize {
        self.centroids.first().map_or(0, |c| c.vector.len())
    }

    pub fn summary(&self, is_current: bool) -> SnapshotSummary {
        SnapshotSummary {
            version: self.version,
            model_version: self.model_version.clone(),
            created_at: self.created_at,
            metrics: self.metrics,
            is_current,
        }
    }
}

/// Listing entry for snapshot history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub version: SnapshotVersion,
    pub model_version: String,
    pub created_at: DateTime<Utc>,
    pub metrics: ClusterMetrics,
    pub is_current: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(id: &str, cluster: Option<u32>, distance: f64) -> ClusterAssignment {
        ClusterAssignment {
            ticket_id: id.to_string(),
            cluster_id: cluster,
            distance_to_centroid: distance,
            is_noise: cluster.is_none(),
            snapshot_version: SnapshotVersion(1),
        }
    }

    fn snapshot() -> ClusterSnapshot {
        ClusterSnapshot {
            version: SnapshotVersion(1),
            model_version: "m".into(),
            created_at: Utc::now(),
            fingerprint: String::new(),
            assignments: vec![
                assignment("a", Some(0), 0.4),
                assignment("b", Some(0), 0.1),
                assignment("c", Some(1), 0.2),
                assignment("d", None, 3.0),
                assignment("e", Some(0), 0.1),
            ],
            centroids: vec![
                Centroid { cluster_id: 0, vector: vec![0.0, 1.0], size: 3 },
                Centroid { cluster_id: 1, vector: vec![1.0, 0.0], size: 1 },
            ],
            calibration: ConfidenceCurve::default(),
            metrics: ClusterMetrics::default(),
        }
    }

    #[test]
    fn representatives_order_by_distance_then_id() {
        let snap = snapshot();
        assert_eq!(snap.representatives(0, 2), vec!["b", "e"]);
        assert_eq!(snap.representatives(0, 10).len(), 3);
    }

    #[test]
    fn stats_ignore_noise() {
        let stats = snapshot().stats();
        assert_eq!(stats[0].volume, 3);
        assert!((stats[0].avg_distance - 0.2).abs() < 1e-12);
        assert_eq!(stats[1].volume, 1);
    }

    #[test]
    fn assignment_lookup_by_ticket() {
        let snap = snapshot();
        assert!(snap.assignment("d").is_some_and(|a| a.is_noise));
        assert!(snap.assignment("zz").is_none());
    }
}
