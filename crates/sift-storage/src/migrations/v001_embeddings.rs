//! v001: embeddings, one immutable row per (ticket, model version).

use rusqlite::Connection;

use sift_core::errors::SiftResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> SiftResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS embeddings (
            ticket_id      TEXT NOT NULL,
            model_version  TEXT NOT NULL,
            dimensions     INTEGER NOT NULL,
            vector         BLOB NOT NULL,
            created_at     TEXT NOT NULL,
            PRIMARY KEY (ticket_id, model_version)
        );

        CREATE INDEX IF NOT EXISTS idx_embeddings_model ON embeddings(model_version, ticket_id);

        CREATE TRIGGER IF NOT EXISTS embeddings_no_update
        BEFORE UPDATE ON embeddings
        BEGIN
            SELECT RAISE(ABORT, 'embeddings are immutable');
        END;

        CREATE TRIGGER IF NOT EXISTS embeddings_no_delete
        BEFORE DELETE ON embeddings
        BEGIN
            SELECT RAISE(ABORT, 'embeddings are immutable');
        END;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
