//! # sift-feedback
//!
//! Feedback Aggregator: validates agent actions on suggestions, appends them,
//! and refreshes the per-intent metrics consumed at the next recompute.

pub mod aggregator;
pub mod metrics;
pub mod similarity;
pub mod validation;

pub use aggregator::FeedbackAggregator;
pub use metrics::aggregate;
pub use similarity::token_jaccard;
pub use validation::validate;
