//! # sift-catalog
//!
//! Intent Catalog: turns raw clusters into durable, curated intents.
//!
//! - [`IntentCatalog`] binds clusters to intents and drives the lifecycle.
//! - [`relink`] carries intent identity across recomputes by member overlap.
//! - [`scoring`] computes the composite score from volume, resolution time,
//!   repetition, acceptance and risk.
//! - [`labeling`] asks the generation service for name proposals; curators decide.

pub mod catalog;
pub mod labeling;
pub mod lifecycle;
pub mod relink;
pub mod scoring;

pub use catalog::{BindRequest, IntentCatalog, IntentUpdate};
pub use labeling::{propose_label, LabelProposal};
pub use relink::{relink_after_recompute, RelinkOutcome, RelinkReport};
pub use scoring::{composite_score, ScoreInputs};

/// Actor recorded on transitions the system performs on its own.
pub const SYSTEM_ACTOR: &str = "system";
