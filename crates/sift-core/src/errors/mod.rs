//! Error taxonomy for the whole workspace.

mod clustering_error;
mod config_error;
mod conflict_error;
mod storage_error;
mod validation_error;

pub use clustering_error::ClusteringError;
pub use config_error::ConfigError;
pub use conflict_error::ConflictError;
pub use storage_error::StorageError;
pub use validation_error::ValidationError;

/// Workspace-wide result alias.
pub type SiftResult<T> = Result<T, SiftError>;

/// Top-level error. Every variant owns its data, so the error is `Clone`
/// and can be handed to every waiter of a shared generation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SiftError {
    #[error("catalog conflict: {0}")]
    ConflictError(#[from] ConflictError),

    #[error("clustering error: {0}")]
    ClusteringError(#[from] ClusteringError),

    #[error("generation unavailable: {reason}")]
    GenerationUnavailable { reason: String },

    #[error("validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("embedding provider failed: {reason}")]
    EmbeddingFailed { reason: String },

    #[error("serialization error: {reason}")]
    SerializationError { reason: String },
}

impl SiftError {
    /// Shorthand for a missing entity.
    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.into(),
        }
    }

    /// Shorthand for a generation failure.
    pub fn generation_unavailable(reason: impl Into<String>) -> Self {
        Self::GenerationUnavailable {
            reason: reason.into(),
        }
    }

    /// Whether the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::GenerationUnavailable { .. } => true,
            Self::StorageError(StorageError::Busy { .. }) => true,
            Self::ClusteringError(ClusteringError::RecomputeInProgress) => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for SiftError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerializationError {
            reason: e.to_string(),
        }
    }
}
