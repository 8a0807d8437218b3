//! IntentCatalog: curator operations over persisted intents.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sift_core::config::CatalogConfig;
use sift_core::errors::{ConflictError, ValidationError};
use sift_core::models::{IntentFeedbackStats, IntentTransition};
use sift_core::traits::ISiftStorage;
use sift_core::{ClusterSnapshot, Intent, IntentStatus, RiskLevel, SiftError, SiftResult};
use tracing::info;

use crate::lifecycle::transition;
use crate::relink::{relink_after_recompute, RelinkOutcome};
use crate::scoring::{self, composite_score, ScoreInputs};

/// Create a new draft (`intent_id = None`) or re-bind an existing intent.
#[derive(Debug, Clone)]
pub struct BindRequest {
    pub intent_id: Option<String>,
    pub cluster_id: u32,
    pub name: String,
    pub description: String,
    pub risk_level: RiskLevel,
}

/// Curator edits of naming and risk. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct IntentUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub risk_level: Option<RiskLevel>,
}

pub struct IntentCatalog {
    storage: Arc<dyn ISiftStorage>,
    config: CatalogConfig,
}

impl IntentCatalog {
    pub fn new(storage: Arc<dyn ISiftStorage>, config: CatalogConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Bind an intent to a cluster of the current snapshot.
    ///
    /// Fails with `ClusterAlreadyBound` if a different active intent holds the cluster.
    /// Status is left as it is; new intents start as drafts.
    pub fn bind(&self, request: BindRequest) -> SiftResult<Intent> {
        if request.name.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "name".to_string(),
                reason: "must not be blank".to_string(),
            }
            .into());
        }
        let snapshot = self
            .storage
            .current_snapshot()?
            .ok_or(ConflictError::NoSnapshot)?;
        let centroid = snapshot.centroid(request.cluster_id).ok_or(ConflictError::UnknownCluster {
            cluster_id: request.cluster_id,
            snapshot_version: snapshot.version.value(),
        })?;
        self.ensure_cluster_free(request.cluster_id, request.intent_id.as_deref())?;

        let (mut intent, existing) = match &request.intent_id {
            Some(id) => (self.require(id)?, true),
            None => (
                Intent::new_draft(&request.name, &request.description, request.risk_level),
                false,
            ),
        };
        intent.name = request.name.trim().to_string();
        intent.description = request.description;
        intent.risk_level = request.risk_level;
        intent.cluster_id = Some(request.cluster_id);
        intent.snapshot_version = Some(snapshot.version);
        intent.unbound_cycles = 0;
        intent.volume = centroid.size as u64;
        intent.composite_score = composite_score(&ScoreInputs::of(&intent), &self.config);
        intent.updated_at = Utc::now();

        if existing {
            self.storage.update_intent(&intent, None)?;
        } else {
            self.storage.insert_intent(&intent)?;
        }
        info!(
            intent_id = %intent.intent_id,
            cluster = request.cluster_id,
            snapshot = %snapshot.version,
            "intent bound"
        );
        Ok(intent)
    }

    /// `draft -> active` or `inactive -> active`. Requires a cluster binding that no
    /// other active intent holds.
    pub fn activate(&self, intent_id: &str, actor: &str) -> SiftResult<Intent> {
        let mut intent = self.require(intent_id)?;
        if let Some(cluster_id) = intent.cluster_id {
            self.ensure_cluster_free(cluster_id, Some(intent_id))?;
        }
        let audit = transition(&mut intent, IntentStatus::Active, actor, None)?;
        intent.unbound_cycles = 0;
        self.persist_transition(&intent, &audit)?;
        Ok(intent)
    }

    /// `draft|active -> inactive`. The cluster binding is kept for a later reactivation.
    pub fn deactivate(&self, intent_id: &str, actor: &str, reason: Option<&str>) -> SiftResult<Intent> {
        let mut intent = self.require(intent_id)?;
        let audit = transition(&mut intent, IntentStatus::Inactive, actor, reason)?;
        self.persist_transition(&intent, &audit)?;
        Ok(intent)
    }

    pub fn update(&self, intent_id: &str, update: IntentUpdate) -> SiftResult<Intent> {
        let mut intent = self.require(intent_id)?;
        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: "name".to_string(),
                    reason: "must not be blank".to_string(),
                }
                .into());
            }
            intent.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            intent.description = description;
        }
        if let Some(risk) = update.risk_level {
            intent.risk_level = risk;
            intent.composite_score = composite_score(&ScoreInputs::of(&intent), &self.config);
        }
        intent.updated_at = Utc::now();
        self.storage.update_intent(&intent, None)?;
        Ok(intent)
    }

    pub fn get(&self, intent_id: &str) -> SiftResult<Option<Intent>> {
        self.storage.get_intent(intent_id)
    }

    /// Intents ordered by composite score, highest first.
    pub fn list(&self, status: Option<IntentStatus>) -> SiftResult<Vec<Intent>> {
        self.storage.list_intents(status)
    }

    pub fn history(&self, intent_id: &str) -> SiftResult<Vec<IntentTransition>> {
        self.storage.transitions(intent_id)
    }

    /// Relink and rescore every intent against `next`. Nothing is written; the
    /// caller publishes the outcome together with the snapshot.
    pub fn prepare_relink(
        &self,
        previous: Option<&ClusterSnapshot>,
        next: &ClusterSnapshot,
        resolution_hours: &HashMap<u32, f64>,
    ) -> SiftResult<RelinkOutcome> {
        let intents = self.storage.list_intents(None)?;
        let metrics: HashMap<String, IntentFeedbackStats> = self
            .storage
            .all_intent_metrics()?
            .into_iter()
            .map(|m| (m.intent_id.clone(), m))
            .collect();

        let mut outcome = relink_after_recompute(previous, next, intents, &self.config);
        let now = Utc::now();
        for intent in &mut outcome.intents {
            scoring::rescore(intent, next, resolution_hours, &metrics, &self.config);
            intent.updated_at = now;
        }
        info!(
            rebound = outcome.report.rebound.len(),
            orphaned = outcome.report.orphaned.len(),
            deactivated = outcome.report.deactivated.len(),
            snapshot = %next.version,
            "catalog relinked"
        );
        Ok(outcome)
    }

    fn require(&self, intent_id: &str) -> SiftResult<Intent> {
        self.storage
            .get_intent(intent_id)?
            .ok_or_else(|| SiftError::not_found("intent", intent_id))
    }

    fn ensure_cluster_free(&self, cluster_id: u32, except: Option<&str>) -> SiftResult<()> {
        let holder = self
            .storage
            .intents_for_cluster(cluster_id)?
            .into_iter()
            .find(|i| i.status == IntentStatus::Active && Some(i.intent_id.as_str()) != except);
        match holder {
            Some(holder) => Err(ConflictError::ClusterAlreadyBound {
                cluster_id,
                intent_id: holder.intent_id,
            }
            .into()),
            None => Ok(()),
        }
    }

    fn persist_transition(&self, intent: &Intent, audit: &IntentTransition) -> SiftResult<()> {
        self.storage.update_intent(intent, Some(audit))?;
        info!(
            intent_id = %intent.intent_id,
            from = %audit.from,
            to = %audit.to,
            actor = %audit.actor,
            "intent status changed"
        );
        Ok(())
    }
}
