use serde::{Deserialize, Serialize};

use super::defaults;

/// Where Sift keeps its SQLite database and how connections are opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file; created and migrated on first open.
    pub db_path: String,
    /// How long a connection waits on a locked database, in ms.
    pub busy_timeout_ms: u32,
    /// Read-only connections for file databases (clamped to 1..=8).
    pub read_pool_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: defaults::DEFAULT_DB_FILENAME.to_string(),
            busy_timeout_ms: defaults::DEFAULT_BUSY_TIMEOUT_MS,
            read_pool_size: defaults::DEFAULT_READ_POOL_SIZE,
        }
    }
}
