// Single source of truth for all default values.

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "sift.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

// --- Embeddings ---
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 100;
pub const DEFAULT_EMBEDDING_ENDPOINT: &str = "https://api.openai.com/v1/embeddings";

// --- Projection ---
pub const DEFAULT_PROJECTION_ENABLED: bool = true;
pub const DEFAULT_N_NEIGHBORS: usize = 15;
pub const DEFAULT_MIN_DIST: f32 = 0.1;
pub const DEFAULT_SPREAD: f32 = 1.0;
pub const DEFAULT_N_COMPONENTS: usize = 25;
pub const DEFAULT_NEGATIVE_SAMPLE_RATE: usize = 5;
pub const DEFAULT_LEARNING_RATE: f32 = 1.0;
pub const DEFAULT_RANDOM_SEED: u64 = 42;

// --- Clustering ---
pub const DEFAULT_MIN_CLUSTER_SIZE_FLOOR: usize = 20;
pub const DEFAULT_MIN_CLUSTER_SIZE_FRACTION: f64 = 0.03;
pub const DEFAULT_MIN_SAMPLES: usize = 5;
pub const DEFAULT_REPRESENTATIVES_PER_CLUSTER: usize = 5;

// --- Catalog ---
pub const DEFAULT_RELINK_OVERLAP_THRESHOLD: f64 = 0.5;
pub const DEFAULT_INACTIVE_AFTER_CYCLES: u32 = 3;
pub const DEFAULT_WEIGHT_VOLUME: f64 = 0.35;
pub const DEFAULT_WEIGHT_RESOLUTION: f64 = 0.20;
pub const DEFAULT_WEIGHT_REPETITION: f64 = 0.30;
pub const DEFAULT_WEIGHT_ACCEPTANCE: f64 = 0.15;
pub const DEFAULT_VOLUME_HALF_SATURATION: f64 = 100.0;
pub const DEFAULT_RESOLUTION_HALF_LIFE_HOURS: f64 = 24.0;
pub const DEFAULT_RISK_MULTIPLIER_LOW: f64 = 1.0;
pub const DEFAULT_RISK_MULTIPLIER_MEDIUM: f64 = 0.8;
pub const DEFAULT_RISK_MULTIPLIER_HIGH: f64 = 0.5;

// --- Inference ---
pub const DEFAULT_HIGH_THRESHOLD: f64 = 0.75;
pub const DEFAULT_MEDIUM_THRESHOLD: f64 = 0.5;

// --- Suggestions ---
pub const DEFAULT_SYSTEM_PREAMBLE: &str = "You are a customer support assistant. Draft a reply to the \
customer's ticket for a human agent to review. Follow the intent policy exactly, never promise \
actions outside it, and answer in the customer's language.";
pub const DEFAULT_EXAMPLES_PER_PROMPT: usize = 3;
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_L1_CACHE_SIZE: u64 = 10_000;

// --- Feedback ---
pub const DEFAULT_FEEDBACK_PRIOR_WEIGHT: f64 = 5.0;
pub const DEFAULT_FEEDBACK_PRIOR_SCORE: f64 = 0.5;

// --- Generation service ---
pub const DEFAULT_GENERATION_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GENERATION_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_GENERATION_MAX_TOKENS: u32 = 600;
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_JSON: bool = false;
