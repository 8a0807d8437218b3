//! Cluster Engine tests over seeded synthetic blobs.

use std::collections::HashSet;

use sift_clustering::algorithms::knn::exact_knn;
use sift_clustering::pipeline::phase1_projection::project;
use sift_clustering::ClusterEngine;
use sift_core::config::{ClusteringConfig, ProjectionConfig, ProjectionMetric};
use sift_core::errors::ClusteringError;
use sift_core::{ConfidenceCurve, EmbeddingRecord, SiftError, SnapshotVersion};
use test_fixtures::gaussian_blobs;

fn small_config(projection_enabled: bool) -> ClusteringConfig {
    ClusteringConfig {
        min_cluster_size_floor: 5,
        min_samples: 3,
        projection: ProjectionConfig {
            enabled: projection_enabled,
            n_components: 2,
            n_neighbors: 10,
            n_epochs: Some(200),
            metric: ProjectionMetric::Euclidean,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn blob_of(ticket_id: &str) -> &str {
    ticket_id.split('-').next().unwrap()
}

/// Every non-noise cluster contains tickets from a single blob.
fn cluster_purity(snapshot: &sift_core::ClusterSnapshot) -> Vec<bool> {
    snapshot
        .cluster_ids()
        .into_iter()
        .map(|id| {
            let blobs: HashSet<&str> = snapshot.members(id).into_iter().map(blob_of).collect();
            blobs.len() == 1
        })
        .collect()
}

#[test]
fn separates_three_blobs_without_projection() {
    let records = gaussian_blobs(3, 30, 8, 0.5, 11, "m1");
    let engine = ClusterEngine::new(small_config(false));
    let snapshot = engine.compute(&records, SnapshotVersion(1)).unwrap();

    assert_eq!(snapshot.metrics.n_clusters, 3);
    assert!(cluster_purity(&snapshot).into_iter().all(|pure| pure));
    assert_eq!(snapshot.assignments.len(), 90);
    assert!(snapshot.metrics.silhouette > 0.5);
    assert_eq!(snapshot.model_version, "m1");
    assert_eq!(snapshot.version, SnapshotVersion(1));

    // Assignments sorted by ticket id; centroids ordered by id.
    let ids: Vec<&str> = snapshot.assignments.iter().map(|a| a.ticket_id.as_str()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    assert_eq!(snapshot.cluster_ids(), vec![0, 1, 2]);
}

#[test]
fn centroids_are_member_means_and_distances_consistent() {
    let records = gaussian_blobs(3, 30, 8, 0.5, 5, "m1");
    let engine = ClusterEngine::new(small_config(false));
    let snapshot = engine.compute(&records, SnapshotVersion(1)).unwrap();

    for centroid in &snapshot.centroids {
        let members = snapshot.members(centroid.cluster_id);
        assert_eq!(members.len(), centroid.size);
        let mut mean = vec![0.0f64; 8];
        for r in records.iter().filter(|r| members.contains(r.ticket_id.as_str())) {
            for (m, v) in mean.iter_mut().zip(&r.vector) {
                *m += *v as f64 / centroid.size as f64;
            }
        }
        for (m, c) in mean.iter().zip(&centroid.vector) {
            assert!((m - *c as f64).abs() < 1e-4);
        }
    }

    // A member at the median member distance maps to 0.9.
    let mut member_distances: Vec<f64> = snapshot
        .assignments
        .iter()
        .filter(|a| !a.is_noise)
        .map(|a| a.distance_to_centroid)
        .collect();
    member_distances.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let refit = ConfidenceCurve::fit(&member_distances);
    assert_eq!(refit, snapshot.calibration);
}

#[test]
fn identical_input_gives_identical_snapshot_content() {
    let records = gaussian_blobs(3, 30, 8, 0.5, 3, "m1");
    let engine = ClusterEngine::new(small_config(false));

    let mut shuffled = records.clone();
    shuffled.reverse();
    let a = engine.compute(&records, SnapshotVersion(1)).unwrap();
    let b = engine.compute(&shuffled, SnapshotVersion(1)).unwrap();

    assert_eq!(a.fingerprint, b.fingerprint);
    assert_eq!(a.assignments, b.assignments);
    assert_eq!(a.centroids, b.centroids);
    assert_eq!(engine.fingerprint(&records), a.fingerprint);
}

#[test]
fn projection_enabled_keeps_blobs_apart() {
    let records = gaussian_blobs(3, 40, 32, 0.5, 9, "m1");
    let engine = ClusterEngine::new(small_config(true));
    let snapshot = engine.compute(&records, SnapshotVersion(2)).unwrap();

    let purity = cluster_purity(&snapshot);
    assert!(purity.len() >= 2);
    assert!(purity.iter().filter(|p| **p).count() >= 2);
}

#[test]
fn projection_preserves_nearest_neighbours() {
    let records = gaussian_blobs(3, 40, 32, 0.5, 21, "m1");
    let data: Vec<Vec<f32>> = records.iter().map(|r| r.vector.clone()).collect();
    let config = small_config(true).projection;

    let projected = project(&data, &config).unwrap();
    assert_eq!(projected.len(), data.len());
    assert!(projected.iter().all(|row| row.len() == 2));
    assert_eq!(projected, project(&data, &config).unwrap());

    // The nearest neighbour in the layout belongs to the same blob.
    let graph = exact_knn(&projected, 1, ProjectionMetric::Euclidean);
    let same_blob = (0..records.len())
        .filter(|&i| {
            blob_of(&records[i].ticket_id) == blob_of(&records[graph.indices[i][0]].ticket_id)
        })
        .count();
    assert!(same_blob as f64 >= 0.9 * records.len() as f64);
}

#[test]
fn projection_is_identity_when_already_small() {
    let data = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
    let config = ProjectionConfig {
        n_components: 2,
        ..Default::default()
    };
    assert_eq!(project(&data, &config).unwrap(), data);
}

#[test]
fn single_blob_is_rejected() {
    // Minimum cluster size of half the input passes the size gate but leaves
    // room for at most one dense region in a single blob.
    let records = gaussian_blobs(1, 40, 8, 0.5, 1, "m1");
    let engine = ClusterEngine::new(ClusteringConfig {
        min_cluster_size_floor: 20,
        ..small_config(false)
    });
    let err = engine.compute(&records, SnapshotVersion(1)).unwrap_err();
    match err {
        SiftError::ClusteringError(ClusteringError::InsufficientClusters { found, required }) => {
            assert_eq!(required, 2);
            assert!(found < 2);
        }
        other => panic!("expected InsufficientClusters, got {other:?}"),
    }
}

#[test]
fn too_few_tickets_and_empty_input_are_rejected() {
    let engine = ClusterEngine::new(small_config(false));
    assert!(matches!(
        engine.compute(&[], SnapshotVersion(1)),
        Err(SiftError::ClusteringError(ClusteringError::InsufficientClusters { found: 0, .. }))
    ));
    let records = gaussian_blobs(2, 4, 8, 0.5, 1, "m1");
    assert!(matches!(
        engine.compute(&records, SnapshotVersion(1)),
        Err(SiftError::ClusteringError(ClusteringError::InsufficientClusters { .. }))
    ));
}

#[test]
fn mixed_models_and_dimensions_are_rejected() {
    let engine = ClusterEngine::new(small_config(false));
    let mut records = gaussian_blobs(2, 20, 8, 0.5, 1, "m1");
    records.push(EmbeddingRecord::new("zz", vec![0.0; 8], "m2"));
    assert!(matches!(
        engine.compute(&records, SnapshotVersion(1)),
        Err(SiftError::ClusteringError(ClusteringError::ClusteringFailed { .. }))
    ));

    let mut records = gaussian_blobs(2, 20, 8, 0.5, 1, "m1");
    records.push(EmbeddingRecord::new("zz", vec![0.0; 4], "m1"));
    assert!(matches!(
        engine.compute(&records, SnapshotVersion(1)),
        Err(SiftError::ClusteringError(ClusteringError::DimensionMismatch { expected: 8, actual: 4 }))
    ));
}

#[test]
fn second_recompute_fails_fast_while_guard_is_held() {
    let records = gaussian_blobs(3, 30, 8, 0.5, 11, "m1");
    let engine = ClusterEngine::new(small_config(false));

    let guard = engine.try_begin().unwrap();
    assert!(engine.is_running());
    let err: SiftError = engine.try_begin().unwrap_err().into();
    assert!(err.is_retryable());
    assert!(engine.compute(&records, SnapshotVersion(1)).is_ok());
    drop(guard);

    assert!(!engine.is_running());
    assert!(engine.try_begin().is_ok());
}

#[test]
fn failed_recompute_releases_the_guard() {
    let engine = ClusterEngine::new(small_config(false));
    {
        let _guard = engine.try_begin().unwrap();
        assert!(engine.compute(&[], SnapshotVersion(1)).is_err());
    }
    assert!(engine.try_begin().is_ok());
}
