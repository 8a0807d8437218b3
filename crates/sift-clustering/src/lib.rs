//! # sift-clustering
//!
//! Cluster Engine: projects ticket embeddings into a low-dimensional space,
//! groups them with HDBSCAN, and derives centroids and a confidence curve.
//! Output is an immutable [`sift_core::ClusterSnapshot`]; persistence is the caller's job.

pub mod algorithms;
pub mod engine;
pub mod fingerprint;
pub mod lock;
pub mod pipeline;

pub use engine::ClusterEngine;
pub use lock::{RecomputeGuard, RecomputeLock};
