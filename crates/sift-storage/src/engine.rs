//! StorageEngine: owns the connection pool and implements every store trait.

use std::path::Path;

use tracing::{debug, info};

use sift_core::config::StorageConfig;
use sift_core::errors::SiftResult;
use sift_core::models::{
    CacheKey, ClusterSnapshot, EmbeddingRecord, FeedbackEvent, FeedbackSample, Intent,
    IntentFeedbackStats, IntentStatus, IntentTransition, InvalidationScope, PromptTemplate,
    SnapshotSummary, SnapshotVersion, Suggestion,
};
use sift_core::traits::{
    IEmbeddingStore, IFeedbackStore, IIntentStore, IPromptTemplateStore, ISnapshotStore,
    ISuggestionStore,
};

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{
    embedding_ops, feedback_ops, intent_ops, snapshot_ops, suggestion_ops, template_ops,
};

pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Open a file-backed engine with default pool settings.
    pub fn open(path: &Path) -> SiftResult<Self> {
        Self::open_with_config(path, &StorageConfig::default())
    }

    pub fn open_with_config(path: &Path, config: &StorageConfig) -> SiftResult<Self> {
        let pool = ConnectionPool::open(path, config.read_pool_size, config.busy_timeout_ms)?;
        let engine = Self { pool };
        engine.initialize()?;
        info!(path = %path.display(), "storage opened");
        Ok(engine)
    }

    /// Open an in-memory engine (tests and ephemeral runs).
    pub fn open_in_memory() -> SiftResult<Self> {
        let engine = Self {
            pool: ConnectionPool::open_in_memory()?,
        };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> SiftResult<()> {
        let version = self.pool.writer.with_conn(migrations::run_migrations)?;
        debug!(schema_version = version, "migrations complete");
        Ok(())
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub fn schema_version(&self) -> SiftResult<u32> {
        self.with_reader(migrations::current_version)
    }

    fn with_reader<F, T>(&self, f: F) -> SiftResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> SiftResult<T>,
    {
        self.pool.with_reader(f)
    }
}

impl IEmbeddingStore for StorageEngine {
    fn put_embedding(&self, record: &EmbeddingRecord) -> SiftResult<bool> {
        self.pool
            .writer
            .with_conn(|conn| embedding_ops::insert_embedding(conn, record))
    }

    fn put_embeddings(&self, records: &[EmbeddingRecord]) -> SiftResult<usize> {
        self.pool
            .writer
            .with_conn(|conn| embedding_ops::bulk_insert(conn, records))
    }

    fn get_embedding(
        &self,
        ticket_id: &str,
        model_version: &str,
    ) -> SiftResult<Option<EmbeddingRecord>> {
        self.with_reader(|conn| embedding_ops::get_embedding(conn, ticket_id, model_version))
    }

    fn embeddings_for_model(&self, model_version: &str) -> SiftResult<Vec<EmbeddingRecord>> {
        self.with_reader(|conn| embedding_ops::embeddings_for_model(conn, model_version))
    }

    fn missing_embeddings(
        &self,
        model_version: &str,
        ticket_ids: &[String],
    ) -> SiftResult<Vec<String>> {
        self.with_reader(|conn| embedding_ops::missing_embeddings(conn, model_version, ticket_ids))
    }

    fn count_embeddings(&self, model_version: &str) -> SiftResult<usize> {
        self.with_reader(|conn| embedding_ops::count_embeddings(conn, model_version))
    }
}

impl ISnapshotStore for StorageEngine {
    fn current_snapshot(&self) -> SiftResult<Option<ClusterSnapshot>> {
        // Pointer and rows read on one connection so they agree.
        self.with_reader(|conn| match snapshot_ops::current_version(conn)? {
            Some(version) => snapshot_ops::load_snapshot(conn, version),
            None => Ok(None),
        })
    }

    fn get_snapshot(&self, version: SnapshotVersion) -> SiftResult<Option<ClusterSnapshot>> {
        self.with_reader(|conn| snapshot_ops::load_snapshot(conn, version))
    }

    fn latest_version(&self) -> SiftResult<Option<SnapshotVersion>> {
        self.pool.writer.with_conn(snapshot_ops::latest_version)
    }

    fn publish_snapshot(
        &self,
        snapshot: &ClusterSnapshot,
        intents: &[Intent],
        transitions: &[IntentTransition],
    ) -> SiftResult<()> {
        self.pool
            .writer
            .with_conn(|conn| snapshot_ops::publish(conn, snapshot, intents, transitions))?;
        info!(
            version = snapshot.version.value(),
            clusters = snapshot.centroids.len(),
            intents = intents.len(),
            "snapshot published"
        );
        Ok(())
    }

    fn list_snapshots(&self) -> SiftResult<Vec<SnapshotSummary>> {
        self.with_reader(snapshot_ops::list_snapshots)
    }
}

impl IIntentStore for StorageEngine {
    fn insert_intent(&self, intent: &Intent) -> SiftResult<()> {
        self.pool
            .writer
            .with_conn(|conn| intent_ops::insert_intent(conn, intent))
    }

    fn update_intent(
        &self,
        intent: &Intent,
        transition: Option<&IntentTransition>,
    ) -> SiftResult<()> {
        self.pool
            .writer
            .with_conn(|conn| intent_ops::update_intent(conn, intent, transition))
    }

    fn get_intent(&self, intent_id: &str) -> SiftResult<Option<Intent>> {
        self.with_reader(|conn| intent_ops::get_intent(conn, intent_id))
    }

    fn list_intents(&self, status: Option<IntentStatus>) -> SiftResult<Vec<Intent>> {
        self.with_reader(|conn| intent_ops::list_intents(conn, status))
    }

    fn intents_for_cluster(&self, cluster_id: u32) -> SiftResult<Vec<Intent>> {
        self.with_reader(|conn| intent_ops::intents_for_cluster(conn, cluster_id))
    }

    fn transitions(&self, intent_id: &str) -> SiftResult<Vec<IntentTransition>> {
        self.with_reader(|conn| intent_ops::transitions(conn, intent_id))
    }
}

impl ISuggestionStore for StorageEngine {
    fn find_live(&self, key: &CacheKey) -> SiftResult<Option<Suggestion>> {
        self.with_reader(|conn| suggestion_ops::find_live(conn, key))
    }

    fn insert_suggestion(&self, suggestion: &Suggestion) -> SiftResult<Suggestion> {
        self.pool
            .writer
            .with_conn(|conn| suggestion_ops::insert_suggestion(conn, suggestion))
    }

    fn get_suggestion(&self, suggestion_id: &str) -> SiftResult<Option<Suggestion>> {
        self.with_reader(|conn| suggestion_ops::get_suggestion(conn, suggestion_id))
    }

    fn invalidate(&self, scope: &InvalidationScope) -> SiftResult<Vec<CacheKey>> {
        self.pool
            .writer
            .with_conn(|conn| suggestion_ops::invalidate(conn, scope))
    }

    fn suggestions_for_ticket(&self, ticket_id: &str) -> SiftResult<Vec<Suggestion>> {
        self.with_reader(|conn| suggestion_ops::suggestions_for_ticket(conn, ticket_id))
    }
}

impl IPromptTemplateStore for StorageEngine {
    fn current_template(&self, intent_id: &str) -> SiftResult<Option<PromptTemplate>> {
        self.with_reader(|conn| template_ops::current_template(conn, intent_id))
    }

    fn publish_template(
        &self,
        intent_id: &str,
        policy: &str,
        constraints: &[String],
    ) -> SiftResult<PromptTemplate> {
        self.pool
            .writer
            .with_conn(|conn| template_ops::publish_template(conn, intent_id, policy, constraints))
    }

    fn template_history(&self, intent_id: &str) -> SiftResult<Vec<PromptTemplate>> {
        self.with_reader(|conn| template_ops::template_history(conn, intent_id))
    }
}

impl IFeedbackStore for StorageEngine {
    fn append_feedback(&self, event: &FeedbackEvent) -> SiftResult<()> {
        self.pool
            .writer
            .with_conn(|conn| feedback_ops::append_feedback(conn, event))
    }

    fn feedback_for_suggestion(&self, suggestion_id: &str) -> SiftResult<Vec<FeedbackEvent>> {
        self.with_reader(|conn| feedback_ops::feedback_for_suggestion(conn, suggestion_id))
    }

    fn feedback_samples_for_intent(&self, intent_id: &str) -> SiftResult<Vec<FeedbackSample>> {
        self.with_reader(|conn| feedback_ops::feedback_samples_for_intent(conn, intent_id))
    }

    fn upsert_intent_metrics(&self, stats: &IntentFeedbackStats) -> SiftResult<bool> {
        self.pool
            .writer
            .with_conn(|conn| feedback_ops::upsert_intent_metrics(conn, stats))
    }

    fn intent_metrics(&self, intent_id: &str) -> SiftResult<Option<IntentFeedbackStats>> {
        self.with_reader(|conn| feedback_ops::intent_metrics(conn, intent_id))
    }

    fn all_intent_metrics(&self) -> SiftResult<Vec<IntentFeedbackStats>> {
        self.with_reader(feedback_ops::all_intent_metrics)
    }
}
