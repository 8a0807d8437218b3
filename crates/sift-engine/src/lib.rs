//! # sift-engine
//!
//! Facade over the Sift subsystems. Wires storage, the Cluster Engine, the
//! Intent Catalog, the Inference Classifier, the Suggestion Orchestrator and
//! the Feedback Aggregator behind one handle, and ships the HTTP adapters for
//! the embedding and generation services.

pub mod engine;
pub mod ingest;
pub mod providers;
pub mod recompute;
pub mod tracing_setup;

pub use engine::SiftEngine;
pub use ingest::IngestReport;
pub use providers::{HttpEmbeddingProvider, HttpGenerationService};
pub use recompute::RecomputeOutcome;
