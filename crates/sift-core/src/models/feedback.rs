use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackAction {
    Accept,
    Edit,
    Reject,
}

impl FeedbackAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Edit => "edit",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for FeedbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(Self::Accept),
            "edit" => Ok(Self::Edit),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown feedback action: {other}")),
        }
    }
}

/// Unvalidated feedback as submitted by an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub suggestion_id: String,
    pub action: FeedbackAction,
    pub edited_text: Option<String>,
    pub rejection_reason: Option<String>,
}

impl FeedbackRequest {
    pub fn accept(suggestion_id: &str) -> Self {
        Self {
            suggestion_id: suggestion_id.to_string(),
            action: FeedbackAction::Accept,
            edited_text: None,
            rejection_reason: None,
        }
    }

    pub fn edit(suggestion_id: &str, edited_text: &str) -> Self {
        Self {
            edited_text: Some(edited_text.to_string()),
            action: FeedbackAction::Edit,
            ..Self::accept(suggestion_id)
        }
    }

    pub fn reject(suggestion_id: &str, reason: &str) -> Self {
        Self {
            rejection_reason: Some(reason.to_string()),
            action: FeedbackAction::Reject,
            ..Self::accept(suggestion_id)
        }
    }
}

/// Append-only record of one agent action on a suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub feedback_id: String,
    pub suggestion_id: String,
    pub action: FeedbackAction,
    pub edited_text: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A feedback event joined with the text it judged.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackSample {
    pub event: FeedbackEvent,
    pub response_text: String,
}

/// Deferred per-intent metrics consumed by the next rescoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentFeedbackStats {
    pub intent_id: String,
    pub accepts: u64,
    pub edits: u64,
    pub rejects: u64,
    pub edit_similarity_sum: f64,
    pub acceptance_rate: f64,
    pub repetition_score: f64,
    pub updated_at: DateTime<Utc>,
}

impl IntentFeedbackStats {
    pub fn total_events(&self) -> u64 {
        self.accepts + self.edits + self.rejects
    }
}
