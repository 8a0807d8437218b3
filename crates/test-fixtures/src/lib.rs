//! Test fixtures for Sift: the golden ticket set plus deterministic doubles for
//! every external collaborator (embedder, generation service, ticket source).

pub mod blobs;
pub mod embedders;
pub mod generators;
pub mod snapshots;
pub mod tickets;

use serde::de::DeserializeOwned;
use std::path::PathBuf;

use sift_core::Ticket;

pub use blobs::gaussian_blobs;
pub use embedders::{DeterministicEmbedder, TopicEmbedder};
pub use generators::{FailingGenerator, ScriptedGenerator};
pub use snapshots::{fixture_centroid, fixture_snapshot};
pub use tickets::InMemoryTicketSource;

/// Topic keywords used by the golden ticket set.
pub const GOLDEN_TOPICS: [&str; 3] = ["refund", "password", "shipping"];

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// 75 support tickets, 25 per topic in [`GOLDEN_TOPICS`], ids `"{topic}-{nnn}"`.
pub fn golden_tickets() -> Vec<Ticket> {
    load_fixture("support_tickets.json")
}
