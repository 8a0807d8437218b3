//! End-to-end tests over the golden ticket set: ingest, recompute, curate,
//! classify, suggest, feedback, and recompute again.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use sift_catalog::BindRequest;
use sift_core::errors::ConflictError;
use sift_core::models::{FeedbackRequest, InvalidationScope};
use sift_core::traits::{
    IEmbeddingProvider, IEmbeddingStore, IGenerationService, ISiftStorage, ITicketSource,
};
use sift_core::{
    ConfidenceBand, IntentStatus, RiskLevel, SiftConfig, SiftError, SnapshotVersion, Ticket,
};
use sift_engine::{RecomputeOutcome, SiftEngine};
use sift_storage::StorageEngine;
use test_fixtures::{golden_tickets, InMemoryTicketSource, ScriptedGenerator, TopicEmbedder, GOLDEN_TOPICS};

const MODEL: &str = "topic-v1";

fn config() -> SiftConfig {
    let mut config = SiftConfig::default();
    config.clustering.min_cluster_size_floor = 5;
    config.clustering.min_samples = 3;
    config
}

struct Harness {
    engine: SiftEngine,
    storage: Arc<StorageEngine>,
    tickets: Arc<InMemoryTicketSource>,
    generator: Arc<ScriptedGenerator>,
}

impl Harness {
    fn new() -> Self {
        let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
        let tickets = Arc::new(InMemoryTicketSource::new(golden_tickets()));
        Self::with(storage, tickets, MODEL, ScriptedGenerator::new("Draft reply"))
    }

    fn with(
        storage: Arc<StorageEngine>,
        tickets: Arc<InMemoryTicketSource>,
        model: &str,
        generator: ScriptedGenerator,
    ) -> Self {
        let generator = Arc::new(generator);
        let dyn_storage: Arc<dyn ISiftStorage> = storage.clone();
        let dyn_tickets: Arc<dyn ITicketSource> = tickets.clone();
        let dyn_generator: Arc<dyn IGenerationService> = generator.clone();
        let engine = SiftEngine::new(
            config(),
            dyn_storage,
            Arc::new(TopicEmbedder::new(&GOLDEN_TOPICS, model)),
            dyn_generator,
            dyn_tickets,
        )
        .unwrap();
        Self {
            engine,
            storage,
            tickets,
            generator,
        }
    }

    fn ingest_all(&self) {
        let ids: Vec<String> = golden_tickets().into_iter().map(|t| t.ticket_id).collect();
        self.engine.ingest_embeddings(&ids).unwrap();
    }

    /// Publish v1 and bind + activate an intent on the refund cluster.
    fn publish_and_activate_refunds(&self) -> (u32, String) {
        self.ingest_all();
        let outcome = self.engine.recompute_clusters().unwrap();
        assert!(matches!(outcome, RecomputeOutcome::Published { .. }));
        let cluster = self.topic_cluster("refund");
        let draft = self
            .engine
            .bind_intent(BindRequest {
                intent_id: None,
                cluster_id: cluster,
                name: "Refunds".into(),
                description: "Customer asks for money back".into(),
                risk_level: RiskLevel::Low,
            })
            .unwrap();
        let active = self.engine.activate_intent(&draft.intent_id, "curator").unwrap();
        (cluster, active.intent_id)
    }

    /// Cluster holding the first non-noise ticket of a topic.
    fn topic_cluster(&self, topic: &str) -> u32 {
        let snapshot = self.engine.current_snapshot().unwrap().unwrap();
        snapshot
            .assignments
            .iter()
            .filter(|a| a.ticket_id.starts_with(topic))
            .find_map(|a| a.cluster_id)
            .unwrap()
    }

    /// The member nearest the centroid: distance at or below the median, so band high.
    fn nearest_member(&self, cluster_id: u32) -> String {
        let snapshot = self.engine.current_snapshot().unwrap().unwrap();
        snapshot.representatives(cluster_id, 1).remove(0)
    }
}

fn new_ticket(id: &str, text: &str) -> Ticket {
    Ticket {
        ticket_id: id.to_string(),
        text: text.to_string(),
        agent_reply: None,
        created_at: Utc.with_ymd_and_hms(2026, 3, 5, 9, 0, 0).unwrap(),
        solved_at: Some(Utc.with_ymd_and_hms(2026, 3, 5, 13, 0, 0).unwrap()),
    }
}

#[tokio::test]
async fn nothing_is_classified_before_the_first_snapshot() {
    let h = Harness::new();
    let result = h.engine.classify("refund-000").unwrap();
    assert_eq!(result.intent_id, None);
    assert_eq!(result.snapshot_version, None);
    assert!(h.engine.get_or_create_suggestion("refund-000").await.unwrap().is_none());
    assert_eq!(h.generator.calls(), 0);
    // Classification embedded the ticket on demand.
    assert!(h.storage.get_embedding("refund-000", MODEL).unwrap().is_some());
}

#[test]
fn unknown_ticket_is_not_found() {
    let h = Harness::new();
    assert!(matches!(
        h.engine.classify("nope").unwrap_err(),
        SiftError::NotFound { .. }
    ));
}

#[test]
fn ingestion_skips_existing_and_counts_missing() {
    let h = Harness::new();
    let mut ids: Vec<String> = golden_tickets().into_iter().map(|t| t.ticket_id).collect();
    ids.push("ghost-1".into());

    let first = h.engine.ingest_embeddings(&ids).unwrap();
    assert_eq!(first.embedded, 75);
    assert_eq!(first.missing, 1);
    assert_eq!(first.skipped, 0);
    assert_eq!(first.failed_batches, 0);

    let second = h.engine.ingest_embeddings(&ids).unwrap();
    assert_eq!(second.embedded, 0);
    assert_eq!(second.skipped, 75);
    assert_eq!(h.storage.count_embeddings(MODEL).unwrap(), 75);
}

#[test]
fn blank_ticket_text_is_embedded_as_placeholder() {
    let h = Harness::new();
    h.tickets.insert(new_ticket("blank-1", "   "));
    let report = h.engine.ingest_embeddings(&["blank-1".to_string()]).unwrap();
    assert_eq!(report.embedded, 1);
    let record = h.storage.get_embedding("blank-1", MODEL).unwrap().unwrap();
    let expected = TopicEmbedder::new(&GOLDEN_TOPICS, MODEL);
    assert_eq!(record.vector, expected.embed("[empty]").unwrap());
}

#[test]
fn recompute_publishes_then_reports_unchanged() {
    let h = Harness::new();
    h.ingest_all();

    let outcome = h.engine.recompute_clusters().unwrap();
    assert_eq!(outcome.current_version(), Some(SnapshotVersion(1)));
    let snapshot = h.engine.current_snapshot().unwrap().unwrap();
    assert!(snapshot.metrics.n_clusters >= 3);
    assert_eq!(snapshot.model_version, MODEL);

    // Every cluster holds a single topic.
    for cluster_id in snapshot.cluster_ids() {
        let topics: std::collections::HashSet<&str> = snapshot
            .members(cluster_id)
            .into_iter()
            .map(|id| id.split('-').next().unwrap())
            .collect();
        assert_eq!(topics.len(), 1, "cluster {cluster_id} mixes topics");
    }
    assert_eq!(h.engine.cluster_stats().unwrap().len(), snapshot.metrics.n_clusters);

    let again = h.engine.recompute_clusters().unwrap();
    assert_eq!(again, RecomputeOutcome::Unchanged(SnapshotVersion(1)));
    assert_eq!(h.engine.snapshots().unwrap().len(), 1);
}

#[test]
fn rejected_recompute_keeps_previous_snapshot() {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let tickets = Arc::new(InMemoryTicketSource::new(golden_tickets()));

    // A second model with a single topic embedded yields one cluster at most.
    let narrow = Harness::with(storage.clone(), tickets.clone(), "topic-v2", ScriptedGenerator::new("x"));
    let refunds: Vec<String> = (0..25).map(|i| format!("refund-{i:03}")).collect();
    narrow.engine.ingest_embeddings(&refunds).unwrap();
    let outcome = narrow.engine.recompute_clusters().unwrap();
    assert!(matches!(outcome, RecomputeOutcome::Rejected { retained: None, .. }));
    assert!(narrow.engine.current_snapshot().unwrap().is_none());

    let wide = Harness::with(storage.clone(), tickets.clone(), MODEL, ScriptedGenerator::new("x"));
    wide.ingest_all();
    assert!(matches!(
        wide.engine.recompute_clusters().unwrap(),
        RecomputeOutcome::Published { .. }
    ));

    let outcome = narrow.engine.recompute_clusters().unwrap();
    assert!(matches!(
        outcome,
        RecomputeOutcome::Rejected { retained: Some(SnapshotVersion(1)), .. }
    ));
    assert_eq!(
        narrow.engine.current_snapshot().unwrap().unwrap().model_version,
        MODEL
    );

    // The narrow engine's embeddings come from another model: no classification.
    narrow.engine.refresh_view().unwrap();
    let result = narrow.engine.classify("refund-000").unwrap();
    assert_eq!(result.intent_id, None);
    assert_eq!(result.snapshot_version, Some(SnapshotVersion(1)));
}

#[tokio::test]
async fn classify_suggest_and_give_feedback() {
    let h = Harness::new();
    let (cluster, intent_id) = h.publish_and_activate_refunds();
    let member = h.nearest_member(cluster);

    let result = h.engine.classify(&member).unwrap();
    assert_eq!(result.intent_id.as_deref(), Some(intent_id.as_str()));
    assert_eq!(result.band, ConfidenceBand::High);
    assert!(!result.similar_ticket_ids.is_empty());

    let first = h.engine.get_or_create_suggestion(&member).await.unwrap().unwrap();
    let second = h.engine.get_or_create_suggestion(&member).await.unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(h.generator.calls(), 1);
    assert_eq!(first.intent_id.as_deref(), Some(intent_id.as_str()));
    assert_eq!(first.snapshot_version, Some(SnapshotVersion(1)));
    assert!(!first.is_flagged());

    let score_before = h.engine.intent(&intent_id).unwrap().unwrap().composite_score;
    let event = h
        .engine
        .record_feedback(&FeedbackRequest::accept(&first.suggestion_id))
        .unwrap();
    let history = h.engine.feedback_history(&first.suggestion_id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].feedback_id, event.feedback_id);
    assert_eq!(
        h.engine.intent(&intent_id).unwrap().unwrap().composite_score,
        score_before
    );
    let metrics = h.engine.feedback_metrics(&intent_id).unwrap().unwrap();
    assert_eq!(metrics.accepts, 1);
    assert_eq!(metrics.total_events(), 1);

    let err = h
        .engine
        .record_feedback(&FeedbackRequest::reject(&first.suggestion_id, " "))
        .unwrap_err();
    assert!(matches!(err, SiftError::ValidationError(_)));
    assert_eq!(h.engine.feedback_history(&first.suggestion_id).unwrap().len(), 1);
}

#[tokio::test]
async fn off_topic_ticket_gets_no_suggestion() {
    let h = Harness::new();
    let (_, intent_id) = h.publish_and_activate_refunds();
    h.tickets.insert(new_ticket("misc-1", "Hello, I just wanted to say thanks"));

    let result = h.engine.classify("misc-1").unwrap();
    assert_eq!(result.intent_id, None);
    assert_eq!(result.band, ConfidenceBand::Low);
    assert_eq!(result.nearest_intent_id.as_deref(), Some(intent_id.as_str()));
    assert!(h.engine.get_or_create_suggestion("misc-1").await.unwrap().is_none());
    assert_eq!(h.generator.calls(), 0);
}

#[tokio::test]
async fn concurrent_suggestions_share_one_generation() {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let tickets = Arc::new(InMemoryTicketSource::new(golden_tickets()));
    let h = Harness::with(
        storage,
        tickets,
        MODEL,
        ScriptedGenerator::new("Draft").with_delay(Duration::from_millis(100)),
    );
    let (cluster, _) = h.publish_and_activate_refunds();
    let member = h.nearest_member(cluster);

    let (a, b) = tokio::join!(
        h.engine.get_or_create_suggestion(&member),
        h.engine.get_or_create_suggestion(&member),
    );
    let (a, b) = (a.unwrap().unwrap(), b.unwrap().unwrap());
    assert_eq!(a.suggestion_id, b.suggestion_id);
    assert_eq!(h.generator.calls(), 1);
}

#[tokio::test]
async fn template_versions_and_invalidation_regenerate() {
    let h = Harness::new();
    let (cluster, intent_id) = h.publish_and_activate_refunds();
    let member = h.nearest_member(cluster);

    let v0 = h.engine.get_or_create_suggestion(&member).await.unwrap().unwrap();
    let template = h
        .engine
        .publish_prompt_template(&intent_id, "Refunds within 30 days", &["No cash".to_string()])
        .unwrap();
    assert_eq!(template.version, 1);

    let v1 = h.engine.get_or_create_suggestion(&member).await.unwrap().unwrap();
    assert_ne!(v0.suggestion_id, v1.suggestion_id);
    assert_eq!(v1.prompt_version, 1);

    let keys = h
        .engine
        .invalidate_suggestions(&InvalidationScope::Intent { intent_id: intent_id.clone() })
        .unwrap();
    assert_eq!(keys.len(), 2);
    let v1b = h.engine.get_or_create_suggestion(&member).await.unwrap().unwrap();
    assert_ne!(v1.suggestion_id, v1b.suggestion_id);
    assert_eq!(h.generator.calls(), 3);

    assert!(matches!(
        h.engine.publish_prompt_template("missing", "x", &[]).unwrap_err(),
        SiftError::NotFound { .. }
    ));
}

#[test]
fn recompute_relinks_and_rescores_the_catalog() {
    let h = Harness::new();
    let (cluster, intent_id) = h.publish_and_activate_refunds();
    let before = h.engine.intent(&intent_id).unwrap().unwrap();
    assert_eq!(before.volume as usize, h.engine.current_snapshot().unwrap().unwrap().members(cluster).len());

    for i in 0..3 {
        h.tickets.insert(new_ticket(&format!("refund-9{i:02}"), &format!("Refund please, order 9{i:02}")));
    }
    let ids: Vec<String> = (0..3).map(|i| format!("refund-9{i:02}")).collect();
    h.engine.ingest_embeddings(&ids).unwrap();

    let outcome = h.engine.recompute_clusters().unwrap();
    let RecomputeOutcome::Published { version, report } = outcome else {
        panic!("expected a published snapshot, got {outcome:?}");
    };
    assert_eq!(version, SnapshotVersion(2));
    assert!(report.orphaned.is_empty());

    let after = h.engine.intent(&intent_id).unwrap().unwrap();
    assert_eq!(after.intent_id, intent_id);
    assert_eq!(after.status, IntentStatus::Active);
    assert_eq!(after.snapshot_version, Some(SnapshotVersion(2)));
    assert!(after.volume >= before.volume);
    assert!(after.avg_resolution_hours.is_some());

    let new_cluster = after.cluster_id.unwrap();
    let member = h.nearest_member(new_cluster);
    assert_eq!(
        h.engine.classify(&member).unwrap().intent_id.as_deref(),
        Some(intent_id.as_str())
    );
}

#[test]
fn curator_conflicts_and_history() {
    let h = Harness::new();
    let (cluster, intent_id) = h.publish_and_activate_refunds();

    let rival = h
        .engine
        .bind_intent(BindRequest {
            intent_id: None,
            cluster_id: cluster,
            name: "Refunds again".into(),
            description: String::new(),
            risk_level: RiskLevel::Medium,
        })
        .unwrap_err();
    assert!(matches!(
        rival,
        SiftError::ConflictError(ConflictError::ClusterAlreadyBound { .. })
    ));

    h.engine
        .deactivate_intent(&intent_id, "curator", Some("merged"))
        .unwrap();
    let member = h.nearest_member(cluster);
    assert_eq!(h.engine.classify(&member).unwrap().intent_id, None);

    let history = h.engine.intent_history(&intent_id).unwrap();
    let statuses: Vec<(IntentStatus, IntentStatus)> = history.iter().map(|t| (t.from, t.to)).collect();
    assert_eq!(
        statuses,
        vec![
            (IntentStatus::Draft, IntentStatus::Active),
            (IntentStatus::Active, IntentStatus::Inactive)
        ]
    );
    assert_eq!(h.engine.list_intents(Some(IntentStatus::Active)).unwrap().len(), 0);
    assert_eq!(h.engine.list_intents(None).unwrap().len(), 1);
}

#[tokio::test]
async fn label_proposals_never_touch_the_catalog() {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let tickets = Arc::new(InMemoryTicketSource::new(golden_tickets()));
    let h = Harness::with(
        storage,
        tickets,
        MODEL,
        ScriptedGenerator::verbatim(r#"{"name": "Password resets", "description": "Cannot log in"}"#),
    );
    h.ingest_all();
    h.engine.recompute_clusters().unwrap();
    let cluster = h.topic_cluster("password");

    let proposal = h.engine.propose_label(cluster).await.unwrap();
    assert_eq!(proposal.name, "Password resets");
    assert_eq!(proposal.cluster_id, cluster);
    assert!(!proposal.representative_ticket_ids.is_empty());
    assert!(proposal
        .representative_ticket_ids
        .iter()
        .all(|id| id.starts_with("password")));
    assert!(h.engine.list_intents(None).unwrap().is_empty());

    assert!(matches!(
        h.engine.propose_label(999).await.unwrap_err(),
        SiftError::ConflictError(ConflictError::UnknownCluster { .. })
    ));
}

#[test]
fn open_uses_file_backed_storage() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config();
    config.storage.db_path = dir.path().join("sift.db").display().to_string();
    let tickets: Arc<dyn ITicketSource> = Arc::new(InMemoryTicketSource::new(golden_tickets()));

    let engine = SiftEngine::open(config, tickets).unwrap();
    assert!(engine.snapshots().unwrap().is_empty());
    assert!(engine.list_intents(None).unwrap().is_empty());
    assert!(dir.path().join("sift.db").exists());
}
