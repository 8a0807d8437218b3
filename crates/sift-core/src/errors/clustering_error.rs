/// Cluster Engine and classifier errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClusteringError {
    #[error("insufficient clusters: found {found}, need at least {required}")]
    InsufficientClusters { found: usize, required: usize },

    #[error("a recompute is already in progress")]
    RecomputeInProgress,

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("clustering failed: {reason}")]
    ClusteringFailed { reason: String },

    #[error("projection failed: {reason}")]
    ProjectionFailed { reason: String },
}
