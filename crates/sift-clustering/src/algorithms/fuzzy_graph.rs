//! Fuzzy simplicial set over the kNN graph: per-point smooth distance
//! calibration, then probabilistic union of the directed memberships.

use std::collections::BTreeMap;

use super::knn::KnnGraph;

const SMOOTH_K_TOLERANCE: f64 = 1e-5;
const MAX_BISECTION_STEPS: usize = 64;
/// Lower bound of sigma relative to the mean neighbour distance.
const MIN_K_DIST_SCALE: f64 = 1e-3;

/// Undirected weighted edge `(i, j, w)` with `i < j`.
pub type Edge = (usize, usize, f32);

/// Per-point `rho` (distance to the nearest non-identical neighbour) and `sigma`
/// such that `sum_j exp(-(d_ij - rho) / sigma) = log2(k)`.
pub fn smooth_knn_dist(graph: &KnnGraph) -> (Vec<f64>, Vec<f64>) {
    let k = graph.k();
    let target = (k.max(2) as f64).log2();
    let mean_all = mean(graph.distances.iter().flatten().map(|d| *d as f64));

    let mut rhos = Vec::with_capacity(graph.distances.len());
    let mut sigmas = Vec::with_capacity(graph.distances.len());

    for row in &graph.distances {
        let rho = row
            .iter()
            .map(|d| *d as f64)
            .find(|d| *d > 0.0)
            .unwrap_or(0.0);

        let mut lo = 0.0f64;
        let mut hi = f64::INFINITY;
        let mut mid = 1.0f64;
        for _ in 0..MAX_BISECTION_STEPS {
            let psum: f64 = row
                .iter()
                .map(|d| {
                    let shifted = *d as f64 - rho;
                    if shifted > 0.0 {
                        (-shifted / mid).exp()
                    } else {
                        1.0
                    }
                })
                .sum();
            if (psum - target).abs() < SMOOTH_K_TOLERANCE {
                break;
            }
            if psum > target {
                hi = mid;
                mid = (lo + hi) / 2.0;
            } else {
                lo = mid;
                mid = if hi.is_infinite() { mid * 2.0 } else { (lo + hi) / 2.0 };
            }
        }

        let floor = if rho > 0.0 {
            MIN_K_DIST_SCALE * mean(row.iter().map(|d| *d as f64))
        } else {
            MIN_K_DIST_SCALE * mean_all
        };
        rhos.push(rho);
        sigmas.push(mid.max(floor).max(f64::MIN_POSITIVE));
    }
    (rhos, sigmas)
}

/// Symmetric membership graph: `w = a + b - a * b` over both directions.
/// Edges come back ordered by `(i, j)`.
pub fn fuzzy_union(graph: &KnnGraph) -> Vec<Edge> {
    let (rhos, sigmas) = smooth_knn_dist(graph);
    let mut directed: BTreeMap<(usize, usize), f64> = BTreeMap::new();

    for (i, (neighbours, distances)) in graph.indices.iter().zip(&graph.distances).enumerate() {
        for (&j, &d) in neighbours.iter().zip(distances) {
            let shifted = d as f64 - rhos[i];
            let w = if shifted <= 0.0 {
                1.0
            } else {
                (-shifted / sigmas[i]).exp()
            };
            directed.insert((i, j), w);
        }
    }

    let mut undirected: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for (&(i, j), &w) in &directed {
        let key = (i.min(j), i.max(j));
        if undirected.contains_key(&key) {
            continue;
        }
        let a = w;
        let b = directed.get(&(j, i)).copied().unwrap_or(0.0);
        undirected.insert(key, a + b - a * b);
    }

    undirected
        .into_iter()
        .filter(|(_, w)| *w > 0.0)
        .map(|((i, j), w)| (i, j, w as f32))
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
