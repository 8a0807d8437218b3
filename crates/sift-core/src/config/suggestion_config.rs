use serde::{Deserialize, Serialize};

use super::defaults;

/// Suggestion Orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Fixed system preamble opening every prompt.
    pub system_preamble: String,
    /// Example exchanges included per prompt.
    pub examples_per_prompt: usize,
    /// Upper bound on one generation call.
    pub generation_timeout_secs: u64,
    /// L1 in-memory suggestion cache max entries.
    pub l1_cache_size: u64,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            system_preamble: defaults::DEFAULT_SYSTEM_PREAMBLE.to_string(),
            examples_per_prompt: defaults::DEFAULT_EXAMPLES_PER_PROMPT,
            generation_timeout_secs: defaults::DEFAULT_GENERATION_TIMEOUT_SECS,
            l1_cache_size: defaults::DEFAULT_L1_CACHE_SIZE,
        }
    }
}
