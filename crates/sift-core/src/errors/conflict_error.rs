/// Catalog binding and lifecycle conflicts. Surfaced to curators, never retried.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConflictError {
    #[error("cluster {cluster_id} is already bound to active intent {intent_id}")]
    ClusterAlreadyBound { cluster_id: u32, intent_id: String },

    #[error("invalid status transition for intent {intent_id}: {from} -> {to}")]
    InvalidTransition {
        intent_id: String,
        from: String,
        to: String,
    },

    #[error("intent {intent_id} has no cluster binding and cannot be active")]
    UnboundIntent { intent_id: String },

    #[error("cluster {cluster_id} does not exist in snapshot {snapshot_version}")]
    UnknownCluster {
        cluster_id: u32,
        snapshot_version: u64,
    },

    #[error("no published snapshot to bind against")]
    NoSnapshot,
}
