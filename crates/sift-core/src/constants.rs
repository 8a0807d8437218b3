/// Sift system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Text embedded in place of an empty or blank ticket body.
pub const EMPTY_TEXT_PLACEHOLDER: &str = "[empty]";

/// Fewest non-noise clusters a recompute may publish.
pub const MIN_PUBLISHABLE_CLUSTERS: usize = 2;

/// Maximum rows written per statement batch during snapshot publish.
pub const MAX_BULK_BATCH_SIZE: usize = 500;

/// Label used when a proposed intent label cannot be parsed.
pub const UNLABELED_INTENT_NAME: &str = "Unlabeled";

/// Characters of each representative ticket kept in label and prompt examples.
pub const EXAMPLE_TEXT_MAX_CHARS: usize = 500;

/// Prompt version used for intents that have no published template.
pub const DEFAULT_PROMPT_VERSION: u32 = 0;
