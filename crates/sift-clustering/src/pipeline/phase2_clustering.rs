//! Phase 2: Clustering. HDBSCAN over the projected points.
//!
//! Labels are relabelled canonically: clusters are numbered in order of their
//! first member, so identical input always yields identical ids.

use std::collections::HashMap;

use hdbscan::{Hdbscan, HdbscanHyperParams};
use sift_core::errors::ClusteringError;
use sift_core::SiftResult;

/// Returns one label per point; negative labels are noise.
// hdbscan 0.4 takes `&Vec<Vec<T>>`.
#[allow(clippy::ptr_arg)]
pub fn cluster(
    points: &Vec<Vec<f32>>,
    min_cluster_size: usize,
    min_samples: usize,
) -> SiftResult<Vec<i32>> {
    let hyper_params = HdbscanHyperParams::builder()
        .min_cluster_size(min_cluster_size)
        .min_samples(min_samples)
        .build();

    let clusterer = Hdbscan::new(points, hyper_params);
    let raw = clusterer
        .cluster()
        .map_err(|e| ClusteringError::ClusteringFailed {
            reason: format!("{e:?}"),
        })?;
    Ok(canonical_labels(&raw))
}

/// Renumber non-noise labels 0.. in order of first appearance.
pub fn canonical_labels(raw: &[i32]) -> Vec<i32> {
    let mut mapping: HashMap<i32, i32> = HashMap::new();
    raw.iter()
        .map(|&label| {
            if label < 0 {
                -1
            } else {
                let next = mapping.len() as i32;
                *mapping.entry(label).or_insert(next)
            }
        })
        .collect()
}

pub fn cluster_count(labels: &[i32]) -> usize {
    labels
        .iter()
        .copied()
        .filter(|l| *l >= 0)
        .max()
        .map(|m| m as usize + 1)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(origin: f32, n: usize) -> Vec<Vec<f32>> {
        (0..n)
            .map(|i| vec![origin + (i % 4) as f32 * 0.01, origin + (i / 4) as f32 * 0.01])
            .collect()
    }

    #[test]
    fn separated_groups_get_separate_labels() {
        let mut points = grid(0.0, 12);
        points.extend(grid(50.0, 12));
        let labels = cluster(&points, 5, 3).unwrap();
        assert_eq!(labels.len(), 24);
        assert!(cluster_count(&labels) >= 2);
        let first: Vec<i32> = labels[..12].iter().copied().filter(|l| *l >= 0).collect();
        let second: Vec<i32> = labels[12..].iter().copied().filter(|l| *l >= 0).collect();
        assert!(first.iter().all(|l| !second.contains(l)));
    }

    #[test]
    fn relabels_by_first_appearance() {
        assert_eq!(canonical_labels(&[4, -1, 2, 4, 2, 7]), vec![0, -1, 1, 0, 1, 2]);
        assert_eq!(cluster_count(&[0, -1, 1, 0, 1, 2]), 3);
        assert_eq!(cluster_count(&[-1, -1]), 0);
    }
}
