use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cleaned ticket as handed over by the ticket source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    /// Cleaned, redacted customer text.
    pub text: String,
    /// First public agent reply, when the ticket has one.
    pub agent_reply: Option<String>,
    pub created_at: DateTime<Utc>,
    pub solved_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Hours between creation and resolution, if solved.
    pub fn resolution_hours(&self) -> Option<f64> {
        self.solved_at
            .map(|solved| (solved - self.created_at).num_seconds().max(0) as f64 / 3600.0)
    }
}
