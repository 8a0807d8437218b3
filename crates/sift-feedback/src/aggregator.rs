//! FeedbackAggregator: validate, append, refresh deferred metrics.

use std::sync::Arc;

use chrono::Utc;
use sift_core::config::FeedbackConfig;
use sift_core::errors::ValidationError;
use sift_core::models::{FeedbackRequest, IntentFeedbackStats};
use sift_core::traits::ISiftStorage;
use sift_core::{FeedbackEvent, SiftResult};
use tracing::{debug, info, warn};

use crate::metrics::aggregate;
use crate::validation::validate;

pub struct FeedbackAggregator {
    storage: Arc<dyn ISiftStorage>,
    config: FeedbackConfig,
}

impl FeedbackAggregator {
    pub fn new(storage: Arc<dyn ISiftStorage>, config: FeedbackConfig) -> Self {
        Self { storage, config }
    }

    /// Record one agent action on a suggestion.
    ///
    /// Invalid input fails with `ValidationError` before anything is written.
    /// Only the intent metrics table is refreshed afterwards; intent scores pick
    /// the new metrics up at the next recompute.
    pub fn record(&self, request: &FeedbackRequest) -> SiftResult<FeedbackEvent> {
        let request = validate(request)?;
        let suggestion = self
            .storage
            .get_suggestion(&request.suggestion_id)?
            .ok_or_else(|| ValidationError::UnknownSuggestion {
                suggestion_id: request.suggestion_id.clone(),
            })?;

        let event = FeedbackEvent {
            feedback_id: uuid::Uuid::new_v4().to_string(),
            suggestion_id: request.suggestion_id,
            action: request.action,
            edited_text: request.edited_text,
            rejection_reason: request.rejection_reason,
            created_at: Utc::now(),
        };
        self.storage.append_feedback(&event)?;
        info!(
            feedback_id = %event.feedback_id,
            suggestion_id = %event.suggestion_id,
            action = %event.action,
            "feedback recorded"
        );

        if let Some(intent_id) = suggestion.intent_id.as_deref() {
            self.refresh_metrics(intent_id)?;
        }
        Ok(event)
    }

    /// Recompute an intent's metrics from every stored event and write them
    /// unless a concurrent writer already stored a larger aggregate.
    pub fn refresh_metrics(&self, intent_id: &str) -> SiftResult<IntentFeedbackStats> {
        let samples = self.storage.feedback_samples_for_intent(intent_id)?;
        let stats = aggregate(intent_id, &samples, &self.config);
        if self.storage.upsert_intent_metrics(&stats)? {
            debug!(
                intent_id,
                events = stats.total_events(),
                acceptance_rate = stats.acceptance_rate,
                repetition_score = stats.repetition_score,
                "intent metrics refreshed"
            );
        } else {
            warn!(intent_id, events = stats.total_events(), "stale metric write skipped");
        }
        Ok(stats)
    }

    pub fn history(&self, suggestion_id: &str) -> SiftResult<Vec<FeedbackEvent>> {
        self.storage.feedback_for_suggestion(suggestion_id)
    }

    pub fn metrics(&self, intent_id: &str) -> SiftResult<Option<IntentFeedbackStats>> {
        self.storage.intent_metrics(intent_id)
    }
}
