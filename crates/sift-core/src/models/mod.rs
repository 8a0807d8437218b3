//! Data model shared by every subsystem.

mod classification;
mod cluster;
mod confidence;
mod embedding;
mod feedback;
mod intent;
mod prompt;
mod suggestion;
mod ticket;

pub use classification::ClassificationResult;
pub use cluster::{
    Centroid, ClusterAssignment, ClusterMetrics, ClusterSnapshot, ClusterStats, SnapshotSummary,
    SnapshotVersion,
};
pub use confidence::{ConfidenceBand, ConfidenceCurve};
pub use embedding::EmbeddingRecord;
pub use feedback::{
    FeedbackAction, FeedbackEvent, FeedbackRequest, FeedbackSample, IntentFeedbackStats,
};
pub use intent::{Intent, IntentStatus, IntentTransition, RiskLevel};
pub use prompt::{Prompt, PromptSection};
pub use suggestion::{CacheKey, InvalidationScope, PromptTemplate, Suggestion};
pub use ticket::Ticket;
