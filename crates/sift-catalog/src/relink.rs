//! Carry intent identity from one snapshot to the next.
//!
//! An intent follows the new cluster that holds the largest share of its previous
//! members, provided that share is strictly above the configured threshold.
//! Otherwise it is orphaned: `cluster_id` becomes null, status stays as it was, and
//! a curator must rebind it. Intent ids are never touched.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use sift_core::config::CatalogConfig;
use sift_core::models::IntentTransition;
use sift_core::{ClusterSnapshot, Intent, IntentStatus};
use tracing::{debug, warn};

use crate::lifecycle::transition;
use crate::SYSTEM_ACTOR;

/// What a relink did, by intent id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelinkReport {
    /// `(intent_id, previous cluster, new cluster)`.
    pub rebound: Vec<(String, u32, u32)>,
    pub orphaned: Vec<String>,
    pub deactivated: Vec<String>,
}

/// Relinked intents plus the audit rows for any automatic deactivation.
#[derive(Debug, Clone, Default)]
pub struct RelinkOutcome {
    pub intents: Vec<Intent>,
    pub transitions: Vec<IntentTransition>,
    pub report: RelinkReport,
}

struct Candidate {
    cluster_id: u32,
    overlap: f64,
}

/// Relink every intent from `previous` to `next`. Pure: nothing is persisted.
///
/// Intents bound against a snapshot other than `previous` have no usable member
/// set and are treated as unbound.
pub fn relink_after_recompute(
    previous: Option<&ClusterSnapshot>,
    next: &ClusterSnapshot,
    intents: Vec<Intent>,
    config: &CatalogConfig,
) -> RelinkOutcome {
    let new_members: BTreeMap<u32, HashSet<&str>> = next
        .cluster_ids()
        .into_iter()
        .map(|id| (id, next.members(id)))
        .collect();

    // Best new cluster per intent, by index.
    let mut choices: Vec<Option<Candidate>> = intents
        .iter()
        .map(|intent| best_match(intent, previous, &new_members, config))
        .collect();

    // Only active intents must be unique per cluster; resolve their collisions.
    let mut claims: HashMap<u32, usize> = HashMap::new();
    for (idx, intent) in intents.iter().enumerate() {
        if intent.status != IntentStatus::Active {
            continue;
        }
        let Some(choice) = &choices[idx] else { continue };
        match claims.get(&choice.cluster_id).copied() {
            None => {
                claims.insert(choice.cluster_id, idx);
            }
            Some(holder) => {
                let holder_overlap = choices[holder].as_ref().map(|c| c.overlap).unwrap_or(0.0);
                let wins = choice.overlap > holder_overlap
                    || (choice.overlap == holder_overlap
                        && intent.intent_id < intents[holder].intent_id);
                let loser = if wins {
                    claims.insert(choice.cluster_id, idx);
                    holder
                } else {
                    idx
                };
                debug!(
                    cluster = choice.cluster_id,
                    loser = %intents[loser].intent_id,
                    "relink conflict resolved"
                );
                choices[loser] = None;
            }
        }
    }

    let mut outcome = RelinkOutcome::default();
    for (mut intent, choice) in intents.into_iter().zip(choices) {
        let previous_cluster = intent.cluster_id;
        match choice {
            Some(candidate) => {
                if let Some(old) = previous_cluster {
                    outcome
                        .report
                        .rebound
                        .push((intent.intent_id.clone(), old, candidate.cluster_id));
                }
                intent.cluster_id = Some(candidate.cluster_id);
                intent.snapshot_version = Some(next.version);
                intent.unbound_cycles = 0;
            }
            None => {
                if previous_cluster.is_some() {
                    warn!(
                        intent_id = %intent.intent_id,
                        "intent orphaned by recompute, needs re-curation"
                    );
                    outcome.report.orphaned.push(intent.intent_id.clone());
                }
                intent.cluster_id = None;
                intent.snapshot_version = None;
                if intent.status != IntentStatus::Inactive {
                    intent.unbound_cycles = intent.unbound_cycles.saturating_add(1);
                }
                if intent.status == IntentStatus::Active
                    && intent.unbound_cycles > config.inactive_after_cycles
                {
                    let reason = format!("unbound for {} recompute cycles", intent.unbound_cycles);
                    if let Ok(audit) = transition(
                        &mut intent,
                        IntentStatus::Inactive,
                        SYSTEM_ACTOR,
                        Some(&reason),
                    ) {
                        outcome.report.deactivated.push(intent.intent_id.clone());
                        outcome.transitions.push(audit);
                    }
                }
            }
        }
        outcome.intents.push(intent);
    }
    outcome
}

fn best_match(
    intent: &Intent,
    previous: Option<&ClusterSnapshot>,
    new_members: &BTreeMap<u32, HashSet<&str>>,
    config: &CatalogConfig,
) -> Option<Candidate> {
    let previous = previous?;
    let cluster_id = intent.cluster_id?;
    if intent.snapshot_version != Some(previous.version) {
        return None;
    }
    let old_members = previous.members(cluster_id);
    if old_members.is_empty() {
        return None;
    }

    // BTreeMap order: on equal overlap the lower cluster id wins.
    let mut best: Option<Candidate> = None;
    for (&id, members) in new_members {
        let shared = old_members.iter().filter(|t| members.contains(*t)).count();
        let overlap = shared as f64 / old_members.len() as f64;
        if best.as_ref().map_or(true, |b| overlap > b.overlap) {
            best = Some(Candidate {
                cluster_id: id,
                overlap,
            });
        }
    }
    best.filter(|b| b.overlap > config.relink_overlap_threshold)
}
