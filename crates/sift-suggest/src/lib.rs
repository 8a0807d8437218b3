//! # sift-suggest
//!
//! Suggestion Orchestrator. For a confidently classified ticket it returns the
//! live suggestion for `(ticket_id, intent_id, prompt_version)`, generating it at
//! most once. Concurrent callers for one key share a single generation.

pub mod cache;
pub mod orchestrator;
pub mod prompt;
pub mod single_flight;

pub use cache::SuggestionCache;
pub use orchestrator::SuggestionOrchestrator;
pub use prompt::PromptAssembler;
pub use single_flight::SingleFlight;
