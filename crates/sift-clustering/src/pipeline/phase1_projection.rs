//! Phase 1: Projection. Neighbourhood-preserving reduction to a low dimension.
//!
//! kNN graph → fuzzy simplicial set → seeded stochastic layout.
//! Skipped when disabled, when the input is already small enough, or when there
//! are too few points to build a neighbourhood graph.

use sift_core::config::ProjectionConfig;
use sift_core::errors::ClusteringError;
use sift_core::SiftResult;

use crate::algorithms::fuzzy_graph::fuzzy_union;
use crate::algorithms::knn::exact_knn;
use crate::algorithms::layout::{find_ab_params, optimize_layout, LayoutParams};

const LARGE_DATASET: usize = 10_000;
const EPOCHS_SMALL: usize = 500;
const EPOCHS_LARGE: usize = 200;

pub fn project(data: &[Vec<f32>], config: &ProjectionConfig) -> SiftResult<Vec<Vec<f32>>> {
    let n = data.len();
    let dims = data.first().map(Vec::len).unwrap_or(0);
    if !config.enabled || dims <= config.n_components || n <= 2 {
        return Ok(data.to_vec());
    }

    let graph = exact_knn(data, config.n_neighbors, config.metric);
    let edges = fuzzy_union(&graph);
    if edges.is_empty() {
        return Err(ClusteringError::ProjectionFailed {
            reason: "neighbour graph has no edges".to_string(),
        }
        .into());
    }

    let n_epochs = config
        .n_epochs
        .unwrap_or(if n > LARGE_DATASET { EPOCHS_LARGE } else { EPOCHS_SMALL });
    let params = LayoutParams {
        n_components: config.n_components,
        n_epochs,
        learning_rate: config.learning_rate as f64,
        negative_sample_rate: config.negative_sample_rate,
        curve: find_ab_params(config.spread as f64, config.min_dist as f64),
        seed: config.seed,
    };
    let embedding = optimize_layout(n, &edges, &params);

    if embedding
        .iter()
        .any(|row| row.iter().any(|v| !v.is_finite()))
    {
        return Err(ClusteringError::ProjectionFailed {
            reason: "layout diverged".to_string(),
        }
        .into());
    }
    Ok(embedding)
}
