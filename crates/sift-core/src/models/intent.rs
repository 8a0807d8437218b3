use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cluster::SnapshotVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    Draft,
    Active,
    Inactive,
}

impl IntentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Allowed lifecycle edges. Cluster requirements are checked by the catalog.
    pub fn can_transition_to(self, target: IntentStatus) -> bool {
        matches!(
            (self, target),
            (Self::Draft, Self::Active)
                | (Self::Draft, Self::Inactive)
                | (Self::Active, Self::Inactive)
                | (Self::Inactive, Self::Active)
        )
    }
}

impl fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(format!("unknown intent status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown risk level: {other}")),
        }
    }
}

/// A curated, named cluster. `intent_id` is minted once and never derived from a
/// cluster id, so it survives any number of recomputes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub intent_id: String,
    pub cluster_id: Option<u32>,
    /// Snapshot the `cluster_id` refers to.
    pub snapshot_version: Option<SnapshotVersion>,
    pub name: String,
    pub description: String,
    pub volume: u64,
    pub avg_resolution_hours: Option<f64>,
    pub repetition_score: f64,
    pub acceptance_rate: f64,
    pub risk_level: RiskLevel,
    pub composite_score: f64,
    pub status: IntentStatus,
    /// Consecutive recomputes this intent stayed without a cluster.
    pub unbound_cycles: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Intent {
    pub fn new_draft(name: &str, description: &str, risk_level: RiskLevel) -> Self {
        let now = Utc::now();
        Self {
            intent_id: uuid::Uuid::new_v4().to_string(),
            cluster_id: None,
            snapshot_version: None,
            name: name.to_string(),
            description: description.to_string(),
            volume: 0,
            avg_resolution_hours: None,
            repetition_score: 0.0,
            acceptance_rate: 0.0,
            risk_level,
            composite_score: 0.0,
            status: IntentStatus::Draft,
            unbound_cycles: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Candidate for classification: active with a live cluster.
    pub fn is_classifiable(&self) -> bool {
        self.status == IntentStatus::Active && self.cluster_id.is_some()
    }
}

/// Audit row for a status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentTransition {
    pub intent_id: String,
    pub from: IntentStatus,
    pub to: IntentStatus,
    pub actor: String,
    pub reason: Option<String>,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_edges() {
        use IntentStatus::*;
        assert!(Draft.can_transition_to(Active));
        assert!(Active.can_transition_to(Inactive));
        assert!(Inactive.can_transition_to(Active));
        assert!(!Active.can_transition_to(Draft));
        assert!(!Inactive.can_transition_to(Draft));
        assert!(!Active.can_transition_to(Active));
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [IntentStatus::Draft, IntentStatus::Active, IntentStatus::Inactive] {
            assert_eq!(status.as_str().parse::<IntentStatus>(), Ok(status));
        }
    }
}
