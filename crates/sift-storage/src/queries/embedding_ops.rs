//! Immutable embedding records.

use rusqlite::{params, Connection, OptionalExtension, Row};

use sift_core::errors::SiftResult;
use sift_core::models::EmbeddingRecord;

use super::codec::{blob_to_vector, fmt_ts, parse_ts, vector_to_blob};
use crate::{sqlite_err, to_storage_err};

const TABLE: &str = "embeddings";

/// Insert unless the (ticket, model version) key exists. Returns whether a row was written.
pub fn insert_embedding(conn: &Connection, record: &EmbeddingRecord) -> SiftResult<bool> {
    let changed = conn
        .execute(
            "INSERT INTO embeddings (ticket_id, model_version, dimensions, vector, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (ticket_id, model_version) DO NOTHING",
            params![
                record.ticket_id,
                record.model_version,
                record.vector.len() as i64,
                vector_to_blob(&record.vector),
                fmt_ts(&record.created_at),
            ],
        )
        .map_err(sqlite_err)?;
    Ok(changed == 1)
}

/// Insert many records in one transaction.
pub fn bulk_insert(conn: &Connection, records: &[EmbeddingRecord]) -> SiftResult<usize> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("bulk_insert begin: {e}")))?;

    let mut written = 0;
    for record in records {
        match insert_embedding(&tx, record) {
            Ok(true) => written += 1,
            Ok(false) => {}
            Err(e) => {
                let _ = tx.rollback();
                return Err(e);
            }
        }
    }
    tx.commit()
        .map_err(|e| to_storage_err(format!("bulk_insert commit: {e}")))?;
    Ok(written)
}

pub fn get_embedding(
    conn: &Connection,
    ticket_id: &str,
    model_version: &str,
) -> SiftResult<Option<EmbeddingRecord>> {
    conn.query_row(
        "SELECT ticket_id, model_version, vector, created_at
         FROM embeddings WHERE ticket_id = ?1 AND model_version = ?2",
        params![ticket_id, model_version],
        |row| Ok(row_to_record(row)),
    )
    .optional()
    .map_err(sqlite_err)?
    .transpose()
}

pub fn embeddings_for_model(
    conn: &Connection,
    model_version: &str,
) -> SiftResult<Vec<EmbeddingRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT ticket_id, model_version, vector, created_at
             FROM embeddings WHERE model_version = ?1 ORDER BY ticket_id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![model_version], |row| Ok(row_to_record(row)))
        .map_err(sqlite_err)?;
    rows.map(|r| r.map_err(sqlite_err)?).collect()
}

pub fn missing_embeddings(
    conn: &Connection,
    model_version: &str,
    ticket_ids: &[String],
) -> SiftResult<Vec<String>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT 1 FROM embeddings WHERE ticket_id = ?1 AND model_version = ?2",
        )
        .map_err(sqlite_err)?;
    let mut missing = Vec::new();
    for id in ticket_ids {
        let exists = stmt
            .exists(params![id, model_version])
            .map_err(sqlite_err)?;
        if !exists {
            missing.push(id.clone());
        }
    }
    Ok(missing)
}

pub fn count_embeddings(conn: &Connection, model_version: &str) -> SiftResult<usize> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM embeddings WHERE model_version = ?1",
            params![model_version],
            |row| row.get(0),
        )
        .map_err(sqlite_err)?;
    Ok(count as usize)
}

fn row_to_record(row: &Row<'_>) -> SiftResult<EmbeddingRecord> {
    let blob: Vec<u8> = row.get(2).map_err(sqlite_err)?;
    let created_at: String = row.get(3).map_err(sqlite_err)?;
    Ok(EmbeddingRecord {
        ticket_id: row.get(0).map_err(sqlite_err)?,
        model_version: row.get(1).map_err(sqlite_err)?,
        vector: blob_to_vector(&blob, TABLE)?,
        created_at: parse_ts(&created_at, TABLE)?,
    })
}
