use sift_core::errors::*;

#[test]
fn conflict_error_carries_cluster_and_intent() {
    let err = SiftError::from(ConflictError::ClusterAlreadyBound {
        cluster_id: 7,
        intent_id: "intent-abc".into(),
    });
    let msg = err.to_string();
    assert!(msg.contains('7'));
    assert!(msg.contains("intent-abc"));
    assert!(!err.is_retryable());
}

#[test]
fn insufficient_clusters_carries_counts() {
    let err = ClusteringError::InsufficientClusters {
        found: 1,
        required: 2,
    };
    let msg = err.to_string();
    assert!(msg.contains('1'));
    assert!(msg.contains('2'));
}

#[test]
fn generation_unavailable_is_retryable() {
    let err = SiftError::generation_unavailable("timeout after 30s");
    assert!(err.is_retryable());
    assert!(err.to_string().contains("timeout after 30s"));
}

#[test]
fn busy_storage_is_retryable_but_corruption_is_not() {
    let busy = SiftError::from(StorageError::Busy {
        message: "database is locked".into(),
    });
    assert!(busy.is_retryable());

    let corrupt = SiftError::from(StorageError::CorruptRow {
        table: "suggestions".into(),
        details: "bad band".into(),
    });
    assert!(!corrupt.is_retryable());
}

#[test]
fn validation_errors_name_the_missing_field() {
    let err = SiftError::from(ValidationError::MissingRejectionReason);
    assert!(err.to_string().to_lowercase().contains("rejection"));
}

#[test]
fn errors_are_clone() {
    let err = SiftError::not_found("suggestion", "s-1");
    let copy = err.clone();
    assert_eq!(err.to_string(), copy.to_string());
}
