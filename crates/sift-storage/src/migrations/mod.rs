//! Versioned schema migrations, applied in order inside one transaction each.

mod v001_embeddings;
mod v002_snapshots;
mod v003_catalog;
mod v004_suggestions;
mod v005_feedback;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use sift_core::errors::{SiftError, SiftResult, StorageError};

use crate::to_storage_err;

type MigrationFn = fn(&Connection) -> SiftResult<()>;

const MIGRATIONS: &[(u32, &str, MigrationFn)] = &[
    (1, "embeddings", v001_embeddings::migrate),
    (2, "snapshots", v002_snapshots::migrate),
    (3, "catalog", v003_catalog::migrate),
    (4, "suggestions", v004_suggestions::migrate),
    (5, "feedback", v005_feedback::migrate),
];

/// Schema version after all migrations ran.
pub const LATEST_VERSION: u32 = 5;

/// Highest applied migration, 0 on a fresh database.
pub fn current_version(conn: &Connection) -> SiftResult<u32> {
    let version: Option<u32> = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?
        .flatten();
    Ok(version.unwrap_or(0))
}

/// Apply every pending migration. Returns the resulting schema version.
pub fn run_migrations(conn: &Connection) -> SiftResult<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version     INTEGER PRIMARY KEY,
            applied_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let mut current = current_version(conn)?;
    for (version, name, migrate) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| to_storage_err(format!("migration {version} begin: {e}")))?;
        let applied = migrate(&tx).and_then(|()| {
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![version],
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
            Ok(())
        });
        match applied {
            Ok(()) => {
                tx.commit()
                    .map_err(|e| to_storage_err(format!("migration {version} commit: {e}")))?;
                info!(version, name, "applied schema migration");
                current = *version;
            }
            Err(e) => {
                let _ = tx.rollback();
                return Err(SiftError::StorageError(StorageError::MigrationFailed {
                    version: *version,
                    reason: e.to_string(),
                }));
            }
        }
    }
    Ok(current)
}
