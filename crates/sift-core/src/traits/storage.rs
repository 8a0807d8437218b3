use crate::errors::SiftResult;
use crate::models::{
    CacheKey, ClusterSnapshot, EmbeddingRecord, FeedbackEvent, FeedbackSample, Intent,
    IntentFeedbackStats, IntentStatus, IntentTransition, InvalidationScope, PromptTemplate,
    SnapshotSummary, SnapshotVersion, Suggestion,
};

/// Immutable embedding records keyed by (ticket, model version).
pub trait IEmbeddingStore: Send + Sync {
    /// Returns false when a record for the key already existed.
    fn put_embedding(&self, record: &EmbeddingRecord) -> SiftResult<bool>;
    /// Returns the number of newly written records.
    fn put_embeddings(&self, records: &[EmbeddingRecord]) -> SiftResult<usize>;
    fn get_embedding(
        &self,
        ticket_id: &str,
        model_version: &str,
    ) -> SiftResult<Option<EmbeddingRecord>>;
    /// Every record for a model version, sorted by ticket id.
    fn embeddings_for_model(&self, model_version: &str) -> SiftResult<Vec<EmbeddingRecord>>;
    /// Subset of `ticket_ids` with no record for `model_version`.
    fn missing_embeddings(
        &self,
        model_version: &str,
        ticket_ids: &[String],
    ) -> SiftResult<Vec<String>>;
    fn count_embeddings(&self, model_version: &str) -> SiftResult<usize>;
}

/// Versioned snapshots with an atomically swapped current pointer.
pub trait ISnapshotStore: Send + Sync {
    fn current_snapshot(&self) -> SiftResult<Option<ClusterSnapshot>>;
    fn get_snapshot(&self, version: SnapshotVersion) -> SiftResult<Option<ClusterSnapshot>>;
    /// Highest version ever written, current or not.
    fn latest_version(&self) -> SiftResult<Option<SnapshotVersion>>;
    /// Write the snapshot, the relinked intents and their transitions, then swap
    /// the current pointer. All or nothing.
    fn publish_snapshot(
        &self,
        snapshot: &ClusterSnapshot,
        intents: &[Intent],
        transitions: &[IntentTransition],
    ) -> SiftResult<()>;
    fn list_snapshots(&self) -> SiftResult<Vec<SnapshotSummary>>;
}

pub trait IIntentStore: Send + Sync {
    fn insert_intent(&self, intent: &Intent) -> SiftResult<()>;
    /// Persist an intent, with its audit row when the status changed.
    fn update_intent(
        &self,
        intent: &Intent,
        transition: Option<&IntentTransition>,
    ) -> SiftResult<()>;
    fn get_intent(&self, intent_id: &str) -> SiftResult<Option<Intent>>;
    fn list_intents(&self, status: Option<IntentStatus>) -> SiftResult<Vec<Intent>>;
    fn intents_for_cluster(&self, cluster_id: u32) -> SiftResult<Vec<Intent>>;
    fn transitions(&self, intent_id: &str) -> SiftResult<Vec<IntentTransition>>;
}

pub trait ISuggestionStore: Send + Sync {
    fn find_live(&self, key: &CacheKey) -> SiftResult<Option<Suggestion>>;
    /// Insert a suggestion. If a live row for the same key already exists, that row
    /// is returned instead and nothing is written.
    fn insert_suggestion(&self, suggestion: &Suggestion) -> SiftResult<Suggestion>;
    fn get_suggestion(&self, suggestion_id: &str) -> SiftResult<Option<Suggestion>>;
    /// Mark every live suggestion in scope invalidated; returns their keys.
    fn invalidate(&self, scope: &InvalidationScope) -> SiftResult<Vec<CacheKey>>;
    fn suggestions_for_ticket(&self, ticket_id: &str) -> SiftResult<Vec<Suggestion>>;
}

pub trait IPromptTemplateStore: Send + Sync {
    fn current_template(&self, intent_id: &str) -> SiftResult<Option<PromptTemplate>>;
    /// Store a new template version (previous max + 1, starting at 1).
    fn publish_template(
        &self,
        intent_id: &str,
        policy: &str,
        constraints: &[String],
    ) -> SiftResult<PromptTemplate>;
    fn template_history(&self, intent_id: &str) -> SiftResult<Vec<PromptTemplate>>;
}

pub trait IFeedbackStore: Send + Sync {
    fn append_feedback(&self, event: &FeedbackEvent) -> SiftResult<()>;
    fn feedback_for_suggestion(&self, suggestion_id: &str) -> SiftResult<Vec<FeedbackEvent>>;
    /// Every event on suggestions of an intent, joined with the suggested text.
    fn feedback_samples_for_intent(&self, intent_id: &str) -> SiftResult<Vec<FeedbackSample>>;
    /// Write metrics unless the stored row already covers more events.
    /// Returns false when the write was skipped as stale.
    fn upsert_intent_metrics(&self, stats: &IntentFeedbackStats) -> SiftResult<bool>;
    fn intent_metrics(&self, intent_id: &str) -> SiftResult<Option<IntentFeedbackStats>>;
    fn all_intent_metrics(&self) -> SiftResult<Vec<IntentFeedbackStats>>;
}

/// Everything the pipeline persists.
pub trait ISiftStorage:
    IEmbeddingStore
    + ISnapshotStore
    + IIntentStore
    + ISuggestionStore
    + IPromptTemplateStore
    + IFeedbackStore
{
}

impl<T> ISiftStorage for T where
    T: IEmbeddingStore
        + ISnapshotStore
        + IIntentStore
        + ISuggestionStore
        + IPromptTemplateStore
        + IFeedbackStore
{
}
