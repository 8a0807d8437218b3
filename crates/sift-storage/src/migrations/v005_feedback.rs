//! v005: append-only feedback events and deferred per-intent metrics.

use rusqlite::Connection;

use sift_core::errors::SiftResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> SiftResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS feedback_events (
            feedback_id       TEXT PRIMARY KEY,
            suggestion_id     TEXT NOT NULL REFERENCES suggestions(suggestion_id),
            action            TEXT NOT NULL CHECK (action IN ('accept', 'edit', 'reject')),
            edited_text       TEXT,
            rejection_reason  TEXT,
            created_at        TEXT NOT NULL,
            CHECK ((action = 'edit') = (edited_text IS NOT NULL)),
            CHECK ((action = 'reject') = (rejection_reason IS NOT NULL))
        );

        CREATE INDEX IF NOT EXISTS idx_feedback_suggestion ON feedback_events(suggestion_id);

        CREATE TRIGGER IF NOT EXISTS feedback_events_no_update
        BEFORE UPDATE ON feedback_events
        BEGIN
            SELECT RAISE(ABORT, 'feedback events are append-only');
        END;

        CREATE TRIGGER IF NOT EXISTS feedback_events_no_delete
        BEFORE DELETE ON feedback_events
        BEGIN
            SELECT RAISE(ABORT, 'feedback events are append-only');
        END;

        CREATE TABLE IF NOT EXISTS intent_metrics (
            intent_id            TEXT PRIMARY KEY REFERENCES intents(intent_id),
            accepts              INTEGER NOT NULL,
            edits                INTEGER NOT NULL,
            rejects              INTEGER NOT NULL,
            total_events         INTEGER NOT NULL,
            edit_similarity_sum  REAL NOT NULL,
            acceptance_rate      REAL NOT NULL,
            repetition_score     REAL NOT NULL,
            updated_at           TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
