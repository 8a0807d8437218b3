//! Feedback Aggregator tests: validation, append-only writes, deferred metrics.

use std::sync::Arc;
use std::thread;

use chrono::Utc;
use sift_core::config::FeedbackConfig;
use sift_core::errors::ValidationError;
use sift_core::models::FeedbackRequest;
use sift_core::traits::{IFeedbackStore, IIntentStore, ISiftStorage, ISnapshotStore, ISuggestionStore};
use sift_core::{
    ConfidenceBand, FeedbackAction, Intent, IntentStatus, RiskLevel, SiftError, SnapshotVersion,
    Suggestion,
};
use sift_feedback::FeedbackAggregator;
use sift_storage::StorageEngine;
use test_fixtures::fixture_snapshot;

const INTENT: &str = "intent-refunds";

fn setup() -> (Arc<StorageEngine>, FeedbackAggregator) {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    storage
        .publish_snapshot(&fixture_snapshot(1, &[(0, &["t1", "t2", "t3"])], &[], 4), &[], &[])
        .unwrap();
    let mut intent = Intent::new_draft("Refunds", "Money back", RiskLevel::Low);
    intent.intent_id = INTENT.to_string();
    intent.cluster_id = Some(0);
    intent.snapshot_version = Some(SnapshotVersion(1));
    intent.status = IntentStatus::Active;
    intent.composite_score = 0.42;
    storage.insert_intent(&intent).unwrap();

    let dyn_storage: Arc<dyn ISiftStorage> = storage.clone();
    let aggregator = FeedbackAggregator::new(dyn_storage, FeedbackConfig::default());
    (storage, aggregator)
}

fn suggestion(storage: &StorageEngine, id: &str, ticket: &str, text: &str) -> Suggestion {
    storage
        .insert_suggestion(&Suggestion {
            suggestion_id: id.to_string(),
            ticket_id: ticket.to_string(),
            intent_id: Some(INTENT.to_string()),
            response_text: text.to_string(),
            confidence_score: 0.9,
            band: ConfidenceBand::High,
            similar_ticket_ids: vec![],
            prompt_version: 0,
            snapshot_version: Some(SnapshotVersion(1)),
            created_at: Utc::now(),
            invalidated_at: None,
        })
        .unwrap()
}

#[test]
fn reject_with_empty_reason_writes_nothing() {
    let (storage, aggregator) = setup();
    suggestion(&storage, "s1", "t1", "Your refund is on its way.");

    let err = aggregator.record(&FeedbackRequest::reject("s1", "")).unwrap_err();
    assert!(matches!(
        err,
        SiftError::ValidationError(ValidationError::MissingRejectionReason)
    ));
    assert!(!err.is_retryable());
    assert!(storage.feedback_for_suggestion("s1").unwrap().is_empty());
    assert!(storage.intent_metrics(INTENT).unwrap().is_none());
}

#[test]
fn unknown_suggestion_is_rejected_for_every_action() {
    let (storage, aggregator) = setup();
    for request in [
        FeedbackRequest::accept("missing"),
        FeedbackRequest::edit("missing", "text"),
        FeedbackRequest::reject("missing", "reason"),
    ] {
        let err = aggregator.record(&request).unwrap_err();
        assert!(matches!(
            err,
            SiftError::ValidationError(ValidationError::UnknownSuggestion { .. })
        ));
    }
    assert!(storage.all_intent_metrics().unwrap().is_empty());
}

#[test]
fn recording_refreshes_metrics_but_not_the_intent_score() {
    let (storage, aggregator) = setup();
    suggestion(&storage, "s1", "t1", "refund issued today");
    suggestion(&storage, "s2", "t2", "refund issued today");

    let event = aggregator.record(&FeedbackRequest::accept("s1")).unwrap();
    assert_eq!(event.action, FeedbackAction::Accept);
    assert_eq!(event.edited_text, None);

    aggregator
        .record(&FeedbackRequest::edit("s2", "refund issued tomorrow"))
        .unwrap();

    let stats = storage.intent_metrics(INTENT).unwrap().unwrap();
    assert_eq!((stats.accepts, stats.edits, stats.rejects), (1, 1, 0));
    // prior 5 x 0.5, one accept, one edit with similarity 0.5
    assert!((stats.acceptance_rate - 3.5 / 7.0).abs() < 1e-9);
    assert!((stats.repetition_score - 4.0 / 7.0).abs() < 1e-9);

    let intent = storage.get_intent(INTENT).unwrap().unwrap();
    assert_eq!(intent.composite_score, 0.42);
}

#[test]
fn repeated_feedback_on_one_suggestion_is_all_kept() {
    let (storage, aggregator) = setup();
    suggestion(&storage, "s1", "t1", "hello there");

    aggregator.record(&FeedbackRequest::reject("s1", "too curt")).unwrap();
    aggregator.record(&FeedbackRequest::edit("s1", "hello there, friend")).unwrap();
    aggregator.record(&FeedbackRequest::accept("s1")).unwrap();

    let history = aggregator.history("s1").unwrap();
    let actions: Vec<FeedbackAction> = history.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![FeedbackAction::Reject, FeedbackAction::Edit, FeedbackAction::Accept]
    );
    assert_eq!(history[0].rejection_reason.as_deref(), Some("too curt"));
}

#[test]
fn concurrent_writes_keep_every_event() {
    let (storage, aggregator) = setup();
    suggestion(&storage, "s1", "t1", "hello");
    let aggregator = Arc::new(aggregator);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let aggregator = Arc::clone(&aggregator);
            thread::spawn(move || aggregator.record(&FeedbackRequest::accept("s1")).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(storage.feedback_for_suggestion("s1").unwrap().len(), 8);
    let stats = aggregator.metrics(INTENT).unwrap().unwrap();
    assert_eq!(stats.total_events(), 8);
}

#[test]
fn stale_aggregate_never_overwrites_a_larger_one() {
    let (storage, aggregator) = setup();
    suggestion(&storage, "s1", "t1", "hello");
    aggregator.record(&FeedbackRequest::accept("s1")).unwrap();
    aggregator.record(&FeedbackRequest::accept("s1")).unwrap();

    let mut stale = storage.intent_metrics(INTENT).unwrap().unwrap();
    stale.accepts = 1;
    stale.acceptance_rate = 0.0;
    assert!(!storage.upsert_intent_metrics(&stale).unwrap());
    assert_eq!(storage.intent_metrics(INTENT).unwrap().unwrap().accepts, 2);
}
