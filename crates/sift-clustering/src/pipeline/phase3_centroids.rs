//! Phase 3: Centroids. Original-space means and per-ticket distances.
//!
//! Noise tickets get the distance to their nearest centroid so calibration and
//! the classifier see the same geometry.

use sift_core::models::{Centroid, ClusterAssignment};
use sift_core::{EmbeddingRecord, SnapshotVersion};

use crate::algorithms::distance::euclidean;

pub fn build(
    records: &[EmbeddingRecord],
    vectors: &[Vec<f32>],
    labels: &[i32],
    n_clusters: usize,
    version: SnapshotVersion,
) -> (Vec<Centroid>, Vec<ClusterAssignment>) {
    let dims = vectors.first().map(Vec::len).unwrap_or(0);
    let mut sums = vec![vec![0.0f64; dims]; n_clusters];
    let mut sizes = vec![0usize; n_clusters];
    for (vector, &label) in vectors.iter().zip(labels) {
        if label < 0 {
            continue;
        }
        let slot = label as usize;
        sizes[slot] += 1;
        for (acc, v) in sums[slot].iter_mut().zip(vector) {
            *acc += *v as f64;
        }
    }

    let centroids: Vec<Centroid> = sums
        .into_iter()
        .zip(&sizes)
        .enumerate()
        .map(|(id, (sum, &size))| Centroid {
            cluster_id: id as u32,
            vector: sum.iter().map(|s| (s / size.max(1) as f64) as f32).collect(),
            size,
        })
        .collect();

    let assignments = records
        .iter()
        .zip(vectors)
        .zip(labels)
        .map(|((record, vector), &label)| {
            if label >= 0 {
                let centroid = &centroids[label as usize];
                ClusterAssignment {
                    ticket_id: record.ticket_id.clone(),
                    cluster_id: Some(centroid.cluster_id),
                    distance_to_centroid: euclidean(vector, &centroid.vector),
                    is_noise: false,
                    snapshot_version: version,
                }
            } else {
                let nearest = centroids
                    .iter()
                    .map(|c| euclidean(vector, &c.vector))
                    .fold(f64::INFINITY, f64::min);
                ClusterAssignment {
                    ticket_id: record.ticket_id.clone(),
                    cluster_id: None,
                    distance_to_centroid: if nearest.is_finite() { nearest } else { 0.0 },
                    is_noise: true,
                    snapshot_version: version,
                }
            }
        })
        .collect();

    (centroids, assignments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_is_member_mean() {
        let records = vec![
            EmbeddingRecord::new("a", vec![0.0, 0.0], "m"),
            EmbeddingRecord::new("b", vec![2.0, 0.0], "m"),
            EmbeddingRecord::new("c", vec![10.0, 0.0], "m"),
        ];
        let vectors: Vec<Vec<f32>> = records.iter().map(|r| r.vector.clone()).collect();
        let (centroids, assignments) =
            build(&records, &vectors, &[0, 0, -1], 1, SnapshotVersion(1));

        assert_eq!(centroids[0].vector, vec![1.0, 0.0]);
        assert_eq!(centroids[0].size, 2);
        assert!((assignments[0].distance_to_centroid - 1.0).abs() < 1e-9);
        assert!(assignments[2].is_noise);
        assert_eq!(assignments[2].cluster_id, None);
        assert!((assignments[2].distance_to_centroid - 9.0).abs() < 1e-9);
    }
}
