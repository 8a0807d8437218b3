use serde::{Deserialize, Serialize};

use super::defaults;

/// Distance used to build the neighbour graph of the projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMetric {
    Cosine,
    Euclidean,
}

/// Neighbourhood-preserving projection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Disable to cluster directly in the embedding space.
    pub enabled: bool,
    pub n_neighbors: usize,
    pub min_dist: f32,
    pub spread: f32,
    pub n_components: usize,
    /// Optimisation epochs. `None` picks 500, or 200 above 10k points.
    pub n_epochs: Option<usize>,
    pub negative_sample_rate: usize,
    pub learning_rate: f32,
    pub metric: ProjectionMetric,
    /// Seed for layout initialisation and negative sampling.
    pub seed: u64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_PROJECTION_ENABLED,
            n_neighbors: defaults::DEFAULT_N_NEIGHBORS,
            min_dist: defaults::DEFAULT_MIN_DIST,
            spread: defaults::DEFAULT_SPREAD,
            n_components: defaults::DEFAULT_N_COMPONENTS,
            n_epochs: None,
            negative_sample_rate: defaults::DEFAULT_NEGATIVE_SAMPLE_RATE,
            learning_rate: defaults::DEFAULT_LEARNING_RATE,
            metric: ProjectionMetric::Cosine,
            seed: defaults::DEFAULT_RANDOM_SEED,
        }
    }
}

/// Cluster Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Fixed lower bound of the HDBSCAN minimum cluster size.
    pub min_cluster_size_floor: usize,
    /// Fraction of the dataset used as minimum cluster size when larger than the floor.
    pub min_cluster_size_fraction: f64,
    /// HDBSCAN min_samples.
    pub min_samples: usize,
    /// Representative members kept per cluster for examples and labeling.
    pub representatives_per_cluster: usize,
    pub projection: ProjectionConfig,
}

impl ClusteringConfig {
    /// `max(floor, floor(fraction * n))`.
    pub fn min_cluster_size(&self, n: usize) -> usize {
        let fractional = (n as f64 * self.min_cluster_size_fraction).floor() as usize;
        self.min_cluster_size_floor.max(fractional)
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_cluster_size_floor: defaults::DEFAULT_MIN_CLUSTER_SIZE_FLOOR,
            min_cluster_size_fraction: defaults::DEFAULT_MIN_CLUSTER_SIZE_FRACTION,
            min_samples: defaults::DEFAULT_MIN_SAMPLES,
            representatives_per_cluster: defaults::DEFAULT_REPRESENTATIVES_PER_CLUSTER,
            projection: ProjectionConfig::default(),
        }
    }
}
