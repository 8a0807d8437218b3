use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One vector per (ticket, model version). Immutable once written;
/// re-embedding with another model version creates a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub ticket_id: String,
    pub vector: Vec<f32>,
    pub model_version: String,
    pub created_at: DateTime<Utc>,
}

impl EmbeddingRecord {
    pub fn new(ticket_id: impl Into<String>, vector: Vec<f32>, model_version: &str) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            vector,
            model_version: model_version.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }
}
