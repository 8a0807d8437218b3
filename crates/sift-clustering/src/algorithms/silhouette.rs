//! Mean silhouette coefficient over non-noise points.

use rayon::prelude::*;

use super::distance::euclidean;

/// Above this many labelled points the score is estimated on an evenly strided sample.
const MAX_SILHOUETTE_POINTS: usize = 5_000;

/// `labels[i] < 0` marks noise, which is excluded. Returns 0.0 with fewer than two clusters.
pub fn mean_silhouette(points: &[Vec<f32>], labels: &[i32]) -> f64 {
    let labelled: Vec<usize> = (0..points.len()).filter(|&i| labels[i] >= 0).collect();
    let mut distinct: Vec<i32> = labelled.iter().map(|&i| labels[i]).collect();
    distinct.sort_unstable();
    distinct.dedup();
    if distinct.len() < 2 {
        return 0.0;
    }

    let sample: Vec<usize> = if labelled.len() > MAX_SILHOUETTE_POINTS {
        let stride = labelled.len().div_ceil(MAX_SILHOUETTE_POINTS);
        labelled.iter().step_by(stride).copied().collect()
    } else {
        labelled.clone()
    };

    let scores: Vec<f64> = sample
        .par_iter()
        .map(|&i| {
            let own = labels[i];
            let mut sums = vec![0.0f64; distinct.len()];
            let mut counts = vec![0usize; distinct.len()];
            for &j in &labelled {
                if j == i {
                    continue;
                }
                // `distinct` is sorted, so the slot is found by binary search.
                if let Ok(slot) = distinct.binary_search(&labels[j]) {
                    sums[slot] += euclidean(&points[i], &points[j]);
                    counts[slot] += 1;
                }
            }
            let own_slot = distinct.binary_search(&own).unwrap_or(0);
            if counts[own_slot] == 0 {
                return 0.0;
            }
            let a = sums[own_slot] / counts[own_slot] as f64;
            let b = (0..distinct.len())
                .filter(|&s| s != own_slot && counts[s] > 0)
                .map(|s| sums[s] / counts[s] as f64)
                .fold(f64::INFINITY, f64::min);
            if !b.is_finite() {
                return 0.0;
            }
            let denom = a.max(b);
            if denom > 0.0 {
                (b - a) / denom
            } else {
                0.0
            }
        })
        .collect();

    scores.iter().sum::<f64>() / scores.len() as f64
}
