//! Recompute outcomes and the per-cluster inputs gathered before relinking.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sift_catalog::RelinkReport;
use sift_core::traits::ITicketSource;
use sift_core::{ClusterSnapshot, SiftResult, SnapshotVersion};

/// What an administrative recompute did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecomputeOutcome {
    /// A new snapshot is current and the catalog was relinked against it.
    Published {
        version: SnapshotVersion,
        report: RelinkReport,
    },
    /// Input identical to the current snapshot's; nothing was written.
    Unchanged(SnapshotVersion),
    /// Too few clusters; the previous snapshot, if any, stays current.
    Rejected {
        found: usize,
        retained: Option<SnapshotVersion>,
    },
}

impl RecomputeOutcome {
    /// Version current after the call.
    pub fn current_version(&self) -> Option<SnapshotVersion> {
        match self {
            Self::Published { version, .. } => Some(*version),
            Self::Unchanged(version) => Some(*version),
            Self::Rejected { retained, .. } => *retained,
        }
    }
}

/// Mean resolution hours per cluster over members that were solved.
/// Clusters without a solved member are absent.
pub fn resolution_hours(
    snapshot: &ClusterSnapshot,
    tickets: &dyn ITicketSource,
) -> SiftResult<HashMap<u32, f64>> {
    let mut by_cluster = HashMap::new();
    for cluster_id in snapshot.cluster_ids() {
        let members: Vec<String> = snapshot
            .members(cluster_id)
            .into_iter()
            .map(str::to_string)
            .collect();
        let hours: Vec<f64> = tickets
            .get_tickets(&members)?
            .iter()
            .filter_map(|t| t.resolution_hours())
            .collect();
        if !hours.is_empty() {
            by_cluster.insert(cluster_id, hours.iter().sum::<f64>() / hours.len() as f64);
        }
    }
    Ok(by_cluster)
}
