//! v004: prompt templates and suggestions.

use rusqlite::Connection;

use sift_core::errors::SiftResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> SiftResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS prompt_templates (
            intent_id    TEXT NOT NULL REFERENCES intents(intent_id),
            version      INTEGER NOT NULL CHECK (version > 0),
            policy       TEXT NOT NULL,
            constraints  TEXT NOT NULL DEFAULT '[]',
            created_at   TEXT NOT NULL,
            PRIMARY KEY (intent_id, version)
        );

        CREATE TABLE IF NOT EXISTS suggestions (
            suggestion_id       TEXT PRIMARY KEY,
            ticket_id           TEXT NOT NULL,
            intent_id           TEXT REFERENCES intents(intent_id),
            response_text       TEXT NOT NULL,
            confidence_score    REAL NOT NULL CHECK (confidence_score BETWEEN 0.0 AND 1.0),
            band                TEXT NOT NULL CHECK (band IN ('high', 'medium', 'low')),
            similar_ticket_ids  TEXT NOT NULL DEFAULT '[]',
            prompt_version      INTEGER NOT NULL,
            snapshot_version    INTEGER,
            created_at          TEXT NOT NULL,
            invalidated_at      TEXT
        );

        -- The cache key: one live suggestion per (ticket, intent, prompt version).
        CREATE UNIQUE INDEX IF NOT EXISTS idx_suggestions_live_key
            ON suggestions(ticket_id, intent_id, prompt_version)
            WHERE invalidated_at IS NULL;

        CREATE INDEX IF NOT EXISTS idx_suggestions_ticket ON suggestions(ticket_id);
        CREATE INDEX IF NOT EXISTS idx_suggestions_intent ON suggestions(intent_id);

        CREATE TRIGGER IF NOT EXISTS suggestions_content_immutable
        BEFORE UPDATE OF suggestion_id, ticket_id, intent_id, response_text, confidence_score,
                         band, similar_ticket_ids, prompt_version, snapshot_version, created_at
        ON suggestions
        BEGIN
            SELECT RAISE(ABORT, 'suggestion content is immutable');
        END;

        CREATE TRIGGER IF NOT EXISTS suggestions_invalidate_once
        BEFORE UPDATE OF invalidated_at ON suggestions
        WHEN OLD.invalidated_at IS NOT NULL
        BEGIN
            SELECT RAISE(ABORT, 'suggestion already invalidated');
        END;

        CREATE TRIGGER IF NOT EXISTS suggestions_no_delete
        BEFORE DELETE ON suggestions
        BEGIN
            SELECT RAISE(ABORT, 'suggestions are invalidated, never deleted');
        END;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
