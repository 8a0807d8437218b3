//! Exact k-nearest-neighbour graph. Brute force, parallel over query points.

use rayon::prelude::*;

use sift_core::config::ProjectionMetric;

use super::distance::{cosine_distance, euclidean};

/// Neighbours of every point, nearest first, excluding the point itself.
#[derive(Debug, Clone)]
pub struct KnnGraph {
    pub indices: Vec<Vec<usize>>,
    pub distances: Vec<Vec<f32>>,
}

impl KnnGraph {
    pub fn k(&self) -> usize {
        self.indices.first().map_or(0, Vec::len)
    }
}

pub fn distance(metric: ProjectionMetric, a: &[f32], b: &[f32]) -> f64 {
    match metric {
        ProjectionMetric::Cosine => cosine_distance(a, b),
        ProjectionMetric::Euclidean => euclidean(a, b),
    }
}

/// `k` is clamped to `n - 1`. Equal distances order by index.
pub fn exact_knn(data: &[Vec<f32>], k: usize, metric: ProjectionMetric) -> KnnGraph {
    let n = data.len();
    let k = k.min(n.saturating_sub(1));

    let rows: Vec<(Vec<usize>, Vec<f32>)> = (0..n)
        .into_par_iter()
        .map(|i| {
            let mut candidates: Vec<(f64, usize)> = (0..n)
                .filter(|&j| j != i)
                .map(|j| (distance(metric, &data[i], &data[j]), j))
                .collect();
            candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            candidates.truncate(k);
            candidates
                .into_iter()
                .map(|(d, j)| (j, d as f32))
                .unzip()
        })
        .collect();

    let (indices, distances) = rows.into_iter().unzip();
    KnnGraph { indices, distances }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbours_are_sorted_and_exclude_self() {
        let data = vec![vec![0.0], vec![1.0], vec![3.0], vec![10.0]];
        let graph = exact_knn(&data, 2, ProjectionMetric::Euclidean);
        assert_eq!(graph.indices[0], vec![1, 2]);
        assert_eq!(graph.indices[3], vec![2, 1]);
        assert_eq!(graph.distances[1], vec![1.0, 2.0]);
        assert_eq!(graph.k(), 2);
    }

    #[test]
    fn k_is_clamped() {
        let data = vec![vec![0.0], vec![1.0]];
        let graph = exact_knn(&data, 15, ProjectionMetric::Euclidean);
        assert_eq!(graph.k(), 1);
    }

    #[test]
    fn ties_break_by_index() {
        let data = vec![vec![0.0], vec![1.0], vec![-1.0]];
        let graph = exact_knn(&data, 2, ProjectionMetric::Euclidean);
        assert_eq!(graph.indices[0], vec![1, 2]);
    }
}
