//! SiftEngine: the handle the surrounding system talks to.

use std::path::Path;
use std::sync::Arc;

use sift_catalog::labeling::LABEL_SAMPLE_SIZE;
use sift_catalog::{BindRequest, IntentCatalog, IntentUpdate, LabelProposal};
use sift_clustering::ClusterEngine;
use sift_core::errors::{ClusteringError, ConflictError};
use sift_core::models::{
    ClusterStats, FeedbackRequest, IntentFeedbackStats, InvalidationScope, IntentTransition,
    PromptTemplate, SnapshotSummary,
};
use sift_core::traits::{IEmbeddingProvider, IGenerationService, ISiftStorage, ITicketSource};
use sift_core::{
    CacheKey, ClassificationResult, ClusterSnapshot, EmbeddingRecord, FeedbackEvent, Intent,
    IntentStatus, SiftConfig, SiftError, SiftResult, SnapshotVersion, Suggestion,
};
use sift_feedback::FeedbackAggregator;
use sift_inference::classifier::classify_with;
use sift_inference::{ClassifierView, InferenceClassifier};
use sift_storage::StorageEngine;
use sift_suggest::SuggestionOrchestrator;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::ingest::{self, IngestReport};
use crate::providers::{HttpEmbeddingProvider, HttpGenerationService};
use crate::recompute::{resolution_hours, RecomputeOutcome};

pub struct SiftEngine {
    config: SiftConfig,
    storage: Arc<dyn ISiftStorage>,
    embedder: Arc<dyn IEmbeddingProvider>,
    generator: Arc<dyn IGenerationService>,
    tickets: Arc<dyn ITicketSource>,
    clustering: ClusterEngine,
    catalog: IntentCatalog,
    classifier: InferenceClassifier,
    suggestions: SuggestionOrchestrator,
    feedback: FeedbackAggregator,
}

impl SiftEngine {
    /// Wire the subsystems around the given collaborators and load the
    /// classifier view of the current snapshot, if one is published.
    pub fn new(
        config: SiftConfig,
        storage: Arc<dyn ISiftStorage>,
        embedder: Arc<dyn IEmbeddingProvider>,
        generator: Arc<dyn IGenerationService>,
        tickets: Arc<dyn ITicketSource>,
    ) -> SiftResult<Self> {
        config.validate()?;
        let engine = Self {
            clustering: ClusterEngine::new(config.clustering.clone()),
            catalog: IntentCatalog::new(Arc::clone(&storage), config.catalog.clone()),
            classifier: InferenceClassifier::new(config.inference.clone()),
            suggestions: SuggestionOrchestrator::new(
                Arc::clone(&storage),
                Arc::clone(&generator),
                Arc::clone(&tickets),
                &config.suggestion,
            ),
            feedback: FeedbackAggregator::new(Arc::clone(&storage), config.feedback.clone()),
            config,
            storage,
            embedder,
            generator,
            tickets,
        };
        engine.refresh_view()?;
        info!(
            embedder = engine.embedder.name(),
            generator = engine.generator.name(),
            "sift engine ready"
        );
        Ok(engine)
    }

    /// SQLite storage at `storage.db_path` with the HTTP embedding and generation adapters.
    pub fn open(config: SiftConfig, tickets: Arc<dyn ITicketSource>) -> SiftResult<Self> {
        config.validate()?;
        let storage = Arc::new(StorageEngine::open_with_config(
            Path::new(&config.storage.db_path),
            &config.storage,
        )?);
        let embedder = Arc::new(HttpEmbeddingProvider::new(&config.embedding)?);
        let generator = Arc::new(HttpGenerationService::new(&config.generation)?);
        Self::new(config, storage, embedder, generator, tickets)
    }

    pub fn config(&self) -> &SiftConfig {
        &self.config
    }

    // --- Inference ---

    /// Classify a ticket, embedding it first if it has no record yet.
    /// "No confident match" is an ordinary result with `intent_id = None`.
    pub fn classify(&self, ticket_id: &str) -> SiftResult<ClassificationResult> {
        let span = info_span!("classify", ticket_id);
        let _entered = span.enter();
        let record = ingest::ensure_embedding(
            self.storage.as_ref(),
            self.embedder.as_ref(),
            self.tickets.as_ref(),
            ticket_id,
        )?;
        self.classify_record(&record)
    }

    fn classify_record(&self, record: &EmbeddingRecord) -> SiftResult<ClassificationResult> {
        let view = self.classifier.view();
        if let Some(model) = view.model_version.as_deref() {
            if model != record.model_version {
                warn!(
                    snapshot_model = model,
                    ticket_model = %record.model_version,
                    "embedding model differs from the current snapshot"
                );
                return Ok(ClassificationResult::empty(view.snapshot_version));
            }
        }
        let result = classify_with(&view, self.classifier.config(), &record.vector)?;
        debug!(
            ticket_id = %record.ticket_id,
            intent = ?result.intent_id,
            confidence = result.confidence,
            band = %result.band,
            "ticket classified"
        );
        Ok(result)
    }

    /// Rebuild the classifier view from the current snapshot and active intents.
    pub fn refresh_view(&self) -> SiftResult<()> {
        let view = match self.storage.current_snapshot()? {
            Some(snapshot) => {
                let intents = self.storage.list_intents(Some(IntentStatus::Active))?;
                ClassifierView::build(
                    &snapshot,
                    &intents,
                    self.config.clustering.representatives_per_cluster,
                )
            }
            None => ClassifierView::empty(),
        };
        self.classifier.swap(view);
        Ok(())
    }

    // --- Suggestions ---

    /// The live suggestion for a ticket, generated at most once per cache key.
    /// `Ok(None)` when the ticket has no confident intent.
    pub async fn get_or_create_suggestion(&self, ticket_id: &str) -> SiftResult<Option<Suggestion>> {
        let span = info_span!("suggest", ticket_id);
        async {
            let record = self.embed_off_thread(ticket_id).await?;
            let classification = self.classify_record(&record)?;
            if classification.intent_id.is_none() {
                debug!(confidence = classification.confidence, "no confident intent, no suggestion");
                return Ok(None);
            }
            let ticket = self
                .tickets
                .get_ticket(ticket_id)?
                .ok_or_else(|| SiftError::not_found("ticket", ticket_id))?;
            self.suggestions.get_or_create(&ticket, &classification).await
        }
        .instrument(span)
        .await
    }

    /// Embedding providers may block on network I/O; keep them off the async workers.
    async fn embed_off_thread(&self, ticket_id: &str) -> SiftResult<EmbeddingRecord> {
        let storage = Arc::clone(&self.storage);
        let embedder = Arc::clone(&self.embedder);
        let tickets = Arc::clone(&self.tickets);
        let ticket_id = ticket_id.to_string();
        tokio::task::spawn_blocking(move || {
            ingest::ensure_embedding(storage.as_ref(), embedder.as_ref(), tickets.as_ref(), &ticket_id)
        })
        .await
        .map_err(|e| SiftError::EmbeddingFailed {
            reason: format!("embedding task failed: {e}"),
        })?
    }

    pub fn suggestion(&self, suggestion_id: &str) -> SiftResult<Option<Suggestion>> {
        self.storage.get_suggestion(suggestion_id)
    }

    /// Invalidate live suggestions in scope; returns the keys that were live.
    pub fn invalidate_suggestions(&self, scope: &InvalidationScope) -> SiftResult<Vec<CacheKey>> {
        self.suggestions.invalidate(scope)
    }

    /// Publish a new prompt template version for an intent. Suggestions made
    /// under earlier versions stay stored but are no longer served.
    pub fn publish_prompt_template(
        &self,
        intent_id: &str,
        policy: &str,
        constraints: &[String],
    ) -> SiftResult<PromptTemplate> {
        self.require_intent(intent_id)?;
        let template = self.storage.publish_template(intent_id, policy, constraints)?;
        info!(intent_id, version = template.version, "prompt template published");
        Ok(template)
    }

    pub fn prompt_templates(&self, intent_id: &str) -> SiftResult<Vec<PromptTemplate>> {
        self.storage.template_history(intent_id)
    }

    // --- Feedback ---

    pub fn record_feedback(&self, request: &FeedbackRequest) -> SiftResult<FeedbackEvent> {
        let span = info_span!("feedback", suggestion_id = %request.suggestion_id, action = %request.action);
        let _entered = span.enter();
        self.feedback.record(request)
    }

    pub fn feedback_history(&self, suggestion_id: &str) -> SiftResult<Vec<FeedbackEvent>> {
        self.feedback.history(suggestion_id)
    }

    /// Aggregates waiting to be folded into the intent's score at the next recompute.
    pub fn feedback_metrics(&self, intent_id: &str) -> SiftResult<Option<IntentFeedbackStats>> {
        self.feedback.metrics(intent_id)
    }

    // --- Cluster Engine ---

    /// Recompute clusters over every stored embedding of the provider's model.
    ///
    /// The recompute lock is held until the snapshot is published and the
    /// classifier view swapped; a concurrent call fails with `RecomputeInProgress`.
    pub fn recompute_clusters(&self) -> SiftResult<RecomputeOutcome> {
        let span = info_span!("recompute", model = self.embedder.model_version());
        let _entered = span.enter();
        let _guard = self.clustering.try_begin()?;

        let records = self.storage.embeddings_for_model(self.embedder.model_version())?;
        let current = self.storage.current_snapshot()?;
        if let Some(current) = &current {
            if current.fingerprint == self.clustering.fingerprint(&records) {
                info!(version = %current.version, "input unchanged, snapshot kept");
                return Ok(RecomputeOutcome::Unchanged(current.version));
            }
        }

        let version = self
            .storage
            .latest_version()?
            .map(SnapshotVersion::next)
            .unwrap_or(SnapshotVersion(1));
        let snapshot = match self.clustering.compute(&records, version) {
            Ok(snapshot) => snapshot,
            Err(SiftError::ClusteringError(ClusteringError::InsufficientClusters { found, .. })) => {
                let retained = current.as_ref().map(|s| s.version);
                warn!(found, retained = ?retained, "recompute rejected, previous snapshot retained");
                return Ok(RecomputeOutcome::Rejected { found, retained });
            }
            Err(e) => return Err(e),
        };

        let resolution = resolution_hours(&snapshot, self.tickets.as_ref())?;
        let outcome = self
            .catalog
            .prepare_relink(current.as_ref(), &snapshot, &resolution)?;
        self.storage
            .publish_snapshot(&snapshot, &outcome.intents, &outcome.transitions)?;
        self.classifier.swap(ClassifierView::build(
            &snapshot,
            &outcome.intents,
            self.config.clustering.representatives_per_cluster,
        ));

        info!(
            version = %snapshot.version,
            clusters = snapshot.metrics.n_clusters,
            noise = snapshot.metrics.noise_count,
            "snapshot published"
        );
        Ok(RecomputeOutcome::Published {
            version: snapshot.version,
            report: outcome.report,
        })
    }

    /// Embed the listed tickets that have no record for the provider's model.
    pub fn ingest_embeddings(&self, ticket_ids: &[String]) -> SiftResult<IngestReport> {
        let span = info_span!("ingest", tickets = ticket_ids.len());
        let _entered = span.enter();
        ingest::ingest(
            self.storage.as_ref(),
            self.embedder.as_ref(),
            self.tickets.as_ref(),
            ticket_ids,
            self.config.embedding.batch_size,
        )
    }

    pub fn current_snapshot(&self) -> SiftResult<Option<ClusterSnapshot>> {
        self.storage.current_snapshot()
    }

    pub fn snapshot(&self, version: SnapshotVersion) -> SiftResult<Option<ClusterSnapshot>> {
        self.storage.get_snapshot(version)
    }

    pub fn snapshots(&self) -> SiftResult<Vec<SnapshotSummary>> {
        self.storage.list_snapshots()
    }

    /// Per-cluster statistics of the current snapshot.
    pub fn cluster_stats(&self) -> SiftResult<Vec<ClusterStats>> {
        Ok(self
            .storage
            .current_snapshot()?
            .map(|s| s.stats())
            .unwrap_or_default())
    }

    // --- Intent Catalog ---

    /// Intents ordered by composite score, highest first.
    pub fn list_intents(&self, status: Option<IntentStatus>) -> SiftResult<Vec<Intent>> {
        self.catalog.list(status)
    }

    pub fn intent(&self, intent_id: &str) -> SiftResult<Option<Intent>> {
        self.catalog.get(intent_id)
    }

    pub fn intent_history(&self, intent_id: &str) -> SiftResult<Vec<IntentTransition>> {
        self.catalog.history(intent_id)
    }

    pub fn bind_intent(&self, request: BindRequest) -> SiftResult<Intent> {
        self.catalog_write(|catalog| catalog.bind(request))
    }

    pub fn activate_intent(&self, intent_id: &str, actor: &str) -> SiftResult<Intent> {
        self.catalog_write(|catalog| catalog.activate(intent_id, actor))
    }

    pub fn deactivate_intent(
        &self,
        intent_id: &str,
        actor: &str,
        reason: Option<&str>,
    ) -> SiftResult<Intent> {
        self.catalog_write(|catalog| catalog.deactivate(intent_id, actor, reason))
    }

    pub fn update_intent(&self, intent_id: &str, update: IntentUpdate) -> SiftResult<Intent> {
        self.catalog_write(|catalog| catalog.update(intent_id, update))
    }

    /// Ask the generation service to name a cluster of the current snapshot.
    /// Nothing is created; the curator decides what to bind.
    pub async fn propose_label(&self, cluster_id: u32) -> SiftResult<LabelProposal> {
        let snapshot = self
            .storage
            .current_snapshot()?
            .ok_or(ConflictError::NoSnapshot)?;
        if snapshot.centroid(cluster_id).is_none() {
            return Err(ConflictError::UnknownCluster {
                cluster_id,
                snapshot_version: snapshot.version.value(),
            }
            .into());
        }
        let tickets = self
            .tickets
            .get_tickets(&snapshot.representatives(cluster_id, LABEL_SAMPLE_SIZE))?;
        sift_catalog::propose_label(self.generator.as_ref(), &snapshot, cluster_id, &tickets).await
    }

    /// Catalog writes share the recompute lock so a relink never overwrites a
    /// concurrent curator change. The classifier view is rebuilt afterwards.
    fn catalog_write<T>(&self, write: impl FnOnce(&IntentCatalog) -> SiftResult<T>) -> SiftResult<T> {
        let _guard = self.clustering.try_begin()?;
        let result = write(&self.catalog)?;
        self.refresh_view()?;
        Ok(result)
    }

    fn require_intent(&self, intent_id: &str) -> SiftResult<Intent> {
        self.catalog
            .get(intent_id)?
            .ok_or_else(|| SiftError::not_found("intent", intent_id))
    }
}
