//! v003: intents and their status audit trail.

use rusqlite::Connection;

use sift_core::errors::SiftResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> SiftResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS intents (
            intent_id             TEXT PRIMARY KEY,
            cluster_id            INTEGER,
            snapshot_version      INTEGER,
            name                  TEXT NOT NULL,
            description           TEXT NOT NULL DEFAULT '',
            volume                INTEGER NOT NULL DEFAULT 0,
            avg_resolution_hours  REAL,
            repetition_score      REAL NOT NULL DEFAULT 0,
            acceptance_rate       REAL NOT NULL DEFAULT 0,
            risk_level            TEXT NOT NULL CHECK (risk_level IN ('low', 'medium', 'high')),
            composite_score       REAL NOT NULL DEFAULT 0,
            status                TEXT NOT NULL CHECK (status IN ('draft', 'active', 'inactive')),
            unbound_cycles        INTEGER NOT NULL DEFAULT 0,
            created_at            TEXT NOT NULL,
            updated_at            TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_intents_status ON intents(status);

        -- One active intent per cluster.
        CREATE UNIQUE INDEX IF NOT EXISTS idx_intents_active_cluster
            ON intents(cluster_id)
            WHERE status = 'active' AND cluster_id IS NOT NULL;

        CREATE TRIGGER IF NOT EXISTS intents_no_delete
        BEFORE DELETE ON intents
        BEGIN
            SELECT RAISE(ABORT, 'intents are deactivated, never deleted');
        END;

        CREATE TABLE IF NOT EXISTS intent_transitions (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            intent_id    TEXT NOT NULL REFERENCES intents(intent_id),
            from_status  TEXT NOT NULL,
            to_status    TEXT NOT NULL,
            actor        TEXT NOT NULL,
            reason       TEXT,
            at           TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_intent_transitions_intent
            ON intent_transitions(intent_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
