//! # sift-core
//!
//! Foundation crate for the Sift intent pipeline.
//! Defines the data model, collaborator traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::SiftConfig;
pub use errors::{SiftError, SiftResult};
pub use models::{
    CacheKey, ClassificationResult, ClusterSnapshot, ConfidenceBand, ConfidenceCurve,
    EmbeddingRecord, FeedbackAction, FeedbackEvent, Intent, IntentStatus, Prompt, RiskLevel,
    SnapshotVersion, Suggestion, Ticket,
};
