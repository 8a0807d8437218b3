use serde::{Deserialize, Serialize};

use super::cluster::SnapshotVersion;
use super::confidence::ConfidenceBand;

/// Outcome of classifying one ticket.
///
/// `intent_id` is `None` whenever the band is Low or no candidate exists.
/// That is a normal result, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub intent_id: Option<String>,
    pub confidence: f64,
    pub band: ConfidenceBand,
    /// Nearest candidate even when it was below threshold.
    pub nearest_intent_id: Option<String>,
    pub cluster_id: Option<u32>,
    pub distance: Option<f64>,
    pub snapshot_version: Option<SnapshotVersion>,
    /// Representative members of the matched cluster.
    pub similar_ticket_ids: Vec<String>,
}

impl ClassificationResult {
    /// No candidate centroids at all.
    pub fn empty(snapshot_version: Option<SnapshotVersion>) -> Self {
        Self {
            intent_id: None,
            confidence: 0.0,
            band: ConfidenceBand::Low,
            nearest_intent_id: None,
            cluster_id: None,
            distance: None,
            snapshot_version,
            similar_ticket_ids: Vec::new(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.intent_id.is_some()
    }
}
