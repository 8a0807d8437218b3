//! SuggestionOrchestrator: cache lookup, single-flight generation, persistence.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sift_core::config::SuggestionConfig;
use sift_core::constants::DEFAULT_PROMPT_VERSION;
use sift_core::models::{InvalidationScope, PromptTemplate};
use sift_core::traits::{IGenerationService, ISiftStorage, ITicketSource};
use sift_core::{
    CacheKey, ClassificationResult, Intent, SiftError, SiftResult, Suggestion, Ticket,
};
use tracing::{debug, info, warn};

use crate::cache::SuggestionCache;
use crate::prompt::PromptAssembler;
use crate::single_flight::SingleFlight;

pub struct SuggestionOrchestrator {
    storage: Arc<dyn ISiftStorage>,
    generator: Arc<dyn IGenerationService>,
    tickets: Arc<dyn ITicketSource>,
    assembler: Arc<PromptAssembler>,
    timeout: Duration,
    cache: SuggestionCache,
    flights: SingleFlight<CacheKey, SiftResult<Suggestion>>,
}

/// Everything one generation needs, owned so the shared future is `'static`.
struct GenerationJob {
    storage: Arc<dyn ISiftStorage>,
    generator: Arc<dyn IGenerationService>,
    tickets: Arc<dyn ITicketSource>,
    assembler: Arc<PromptAssembler>,
    timeout: Duration,
    cache: SuggestionCache,
    key: CacheKey,
    intent: Intent,
    template: Option<PromptTemplate>,
    ticket: Ticket,
    classification: ClassificationResult,
}

impl SuggestionOrchestrator {
    pub fn new(
        storage: Arc<dyn ISiftStorage>,
        generator: Arc<dyn IGenerationService>,
        tickets: Arc<dyn ITicketSource>,
        config: &SuggestionConfig,
    ) -> Self {
        Self {
            storage,
            generator,
            tickets,
            assembler: Arc::new(PromptAssembler::new(
                &config.system_preamble,
                config.examples_per_prompt,
            )),
            timeout: Duration::from_secs(config.generation_timeout_secs),
            cache: SuggestionCache::new(config.l1_cache_size),
            flights: SingleFlight::new(),
        }
    }

    /// Cache key for a classified ticket under the intent's current prompt version.
    pub fn cache_key(&self, ticket_id: &str, intent_id: &str) -> SiftResult<CacheKey> {
        let version = self
            .storage
            .current_template(intent_id)?
            .map(|t| t.version)
            .unwrap_or(DEFAULT_PROMPT_VERSION);
        Ok(CacheKey::new(ticket_id, intent_id, version))
    }

    /// Return the live suggestion for the ticket, generating it at most once.
    ///
    /// `Ok(None)` when the classification has no confident intent; the generation
    /// service is not called then. Generation failures surface as
    /// `GenerationUnavailable` and nothing is cached.
    pub async fn get_or_create(
        &self,
        ticket: &Ticket,
        classification: &ClassificationResult,
    ) -> SiftResult<Option<Suggestion>> {
        let Some(intent_id) = classification.intent_id.as_deref() else {
            debug!(ticket_id = %ticket.ticket_id, "no confident intent, no suggestion");
            return Ok(None);
        };

        let template = self.storage.current_template(intent_id)?;
        let key = CacheKey::new(
            &ticket.ticket_id,
            intent_id,
            template.as_ref().map_or(DEFAULT_PROMPT_VERSION, |t| t.version),
        );

        if let Some(hit) = self.cache.get(&key) {
            debug!(key = %key, "suggestion served from L1");
            return Ok(Some(hit));
        }
        let epoch = self.cache.epoch();
        if let Some(stored) = self.storage.find_live(&key)? {
            self.cache.insert(key, stored.clone(), epoch);
            return Ok(Some(stored));
        }

        let intent = self
            .storage
            .get_intent(intent_id)?
            .ok_or_else(|| SiftError::not_found("intent", intent_id))?;
        let job = GenerationJob {
            storage: Arc::clone(&self.storage),
            generator: Arc::clone(&self.generator),
            tickets: Arc::clone(&self.tickets),
            assembler: Arc::clone(&self.assembler),
            timeout: self.timeout,
            cache: self.cache.clone(),
            key: key.clone(),
            intent,
            template,
            ticket: ticket.clone(),
            classification: classification.clone(),
        };
        let suggestion = self.flights.run(key, move || job.run()).await?;
        Ok(Some(suggestion))
    }

    /// Invalidate stored and cached suggestions in scope. Returns the affected keys.
    pub fn invalidate(&self, scope: &InvalidationScope) -> SiftResult<Vec<CacheKey>> {
        let keys = self.storage.invalidate(scope)?;
        self.cache.invalidate(&keys);
        info!(scope = ?scope, invalidated = keys.len(), "suggestions invalidated");
        Ok(keys)
    }

    /// Keys with a generation currently running.
    pub fn in_flight(&self) -> usize {
        self.flights.in_flight()
    }
}

impl GenerationJob {
    async fn run(self) -> SiftResult<Suggestion> {
        let epoch = self.cache.epoch();
        // Another caller may have finished between our lookup and joining the flight.
        if let Some(stored) = self.storage.find_live(&self.key)? {
            self.cache.insert(self.key.clone(), stored.clone(), epoch);
            return Ok(stored);
        }

        let examples = self
            .tickets
            .get_tickets(&self.classification.similar_ticket_ids)?;
        let prompt = self
            .assembler
            .assemble(&self.intent, self.template.as_ref(), &examples, &self.ticket);

        let started = std::time::Instant::now();
        let response = match tokio::time::timeout(self.timeout, self.generator.generate(&prompt))
            .await
        {
            Err(_) => {
                warn!(key = %self.key, timeout_secs = self.timeout.as_secs(), "generation timed out");
                return Err(SiftError::generation_unavailable(format!(
                    "generation timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
            Ok(Err(e)) => {
                warn!(key = %self.key, error = %e, "generation failed");
                return Err(match e {
                    SiftError::GenerationUnavailable { .. } => e,
                    other => SiftError::generation_unavailable(other.to_string()),
                });
            }
            Ok(Ok(text)) if text.trim().is_empty() => {
                return Err(SiftError::generation_unavailable("empty response"));
            }
            Ok(Ok(text)) => text,
        };

        let candidate = Suggestion {
            suggestion_id: uuid::Uuid::new_v4().to_string(),
            ticket_id: self.key.ticket_id.clone(),
            intent_id: Some(self.key.intent_id.clone()),
            response_text: response,
            confidence_score: self.classification.confidence,
            band: self.classification.band,
            similar_ticket_ids: self.classification.similar_ticket_ids.clone(),
            prompt_version: self.key.prompt_version,
            snapshot_version: self.classification.snapshot_version,
            created_at: Utc::now(),
            invalidated_at: None,
        };
        let stored = self.storage.insert_suggestion(&candidate)?;
        self.cache.insert(self.key.clone(), stored.clone(), epoch);
        info!(
            key = %self.key,
            suggestion_id = %stored.suggestion_id,
            band = %stored.band,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "suggestion generated"
        );
        Ok(stored)
    }
}
