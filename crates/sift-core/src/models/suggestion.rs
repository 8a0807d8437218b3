use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cluster::SnapshotVersion;
use super::confidence::ConfidenceBand;

/// At most one live suggestion exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub ticket_id: String,
    pub intent_id: String,
    pub prompt_version: u32,
}

impl CacheKey {
    pub fn new(ticket_id: &str, intent_id: &str, prompt_version: u32) -> Self {
        Self {
            ticket_id: ticket_id.to_string(),
            intent_id: intent_id.to_string(),
            prompt_version,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/p{}", self.ticket_id, self.intent_id, self.prompt_version)
    }
}

/// What an explicit invalidation covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum InvalidationScope {
    Key(CacheKey),
    Ticket { ticket_id: String },
    Intent { intent_id: String },
}

impl InvalidationScope {
    pub fn covers(&self, key: &CacheKey) -> bool {
        match self {
            Self::Key(k) => k == key,
            Self::Ticket { ticket_id } => &key.ticket_id == ticket_id,
            Self::Intent { intent_id } => &key.intent_id == intent_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub suggestion_id: String,
    pub ticket_id: String,
    pub intent_id: Option<String>,
    pub response_text: String,
    pub confidence_score: f64,
    pub band: ConfidenceBand,
    pub similar_ticket_ids: Vec<String>,
    pub prompt_version: u32,
    pub snapshot_version: Option<SnapshotVersion>,
    pub created_at: DateTime<Utc>,
    pub invalidated_at: Option<DateTime<Utc>>,
}

impl Suggestion {
    pub fn cache_key(&self) -> Option<CacheKey> {
        self.intent_id
            .as_deref()
            .map(|intent_id| CacheKey::new(&self.ticket_id, intent_id, self.prompt_version))
    }

    pub fn is_live(&self) -> bool {
        self.invalidated_at.is_none()
    }

    /// Medium-band suggestions are shown with a caution flag.
    pub fn is_flagged(&self) -> bool {
        self.band == ConfidenceBand::Medium
    }
}

/// Versioned per-intent policy text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub intent_id: String,
    pub version: u32,
    pub policy: String,
    pub constraints: Vec<String>,
    pub created_at: DateTime<Utc>,
}
