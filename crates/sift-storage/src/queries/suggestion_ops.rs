//! Suggestion rows keyed by the live (ticket, intent, prompt version) tuple.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use sift_core::errors::SiftResult;
use sift_core::models::{CacheKey, InvalidationScope, SnapshotVersion, Suggestion};
use sift_core::SiftError;

use super::codec::{fmt_ts, parse_enum, parse_json_list, parse_opt_ts, parse_ts};
use crate::{sqlite_err, to_storage_err};

const TABLE: &str = "suggestions";

const SUGGESTION_COLUMNS: &str = "suggestion_id, ticket_id, intent_id, response_text,
    confidence_score, band, similar_ticket_ids, prompt_version, snapshot_version, created_at,
    invalidated_at";

pub fn find_live(conn: &Connection, key: &CacheKey) -> SiftResult<Option<Suggestion>> {
    conn.query_row(
        &format!(
            "SELECT {SUGGESTION_COLUMNS} FROM suggestions
             WHERE ticket_id = ?1 AND intent_id = ?2 AND prompt_version = ?3
               AND invalidated_at IS NULL"
        ),
        params![key.ticket_id, key.intent_id, key.prompt_version],
        |row| Ok(row_to_suggestion(row)),
    )
    .optional()
    .map_err(sqlite_err)?
    .transpose()
}

pub fn get_suggestion(conn: &Connection, suggestion_id: &str) -> SiftResult<Option<Suggestion>> {
    conn.query_row(
        &format!("SELECT {SUGGESTION_COLUMNS} FROM suggestions WHERE suggestion_id = ?1"),
        params![suggestion_id],
        |row| Ok(row_to_suggestion(row)),
    )
    .optional()
    .map_err(sqlite_err)?
    .transpose()
}

/// Insert, or return the live row already holding the key. The returned value is
/// always the stored row.
pub fn insert_suggestion(conn: &Connection, s: &Suggestion) -> SiftResult<Suggestion> {
    let similar = serde_json::to_string(&s.similar_ticket_ids)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let changed = conn
        .execute(
            &format!(
                "INSERT INTO suggestions ({SUGGESTION_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, NULL)
                 ON CONFLICT DO NOTHING"
            ),
            params![
                s.suggestion_id,
                s.ticket_id,
                s.intent_id,
                s.response_text,
                s.confidence_score,
                s.band.as_str(),
                similar,
                s.prompt_version,
                s.snapshot_version.map(|v| v.value() as i64),
                fmt_ts(&s.created_at),
            ],
        )
        .map_err(sqlite_err)?;

    if changed == 0 {
        if let Some(key) = s.cache_key() {
            if let Some(existing) = find_live(conn, &key)? {
                return Ok(existing);
            }
        }
    }
    get_suggestion(conn, &s.suggestion_id)?
        .ok_or_else(|| SiftError::not_found("suggestion", &s.suggestion_id))
}

/// Invalidate every live row in scope. Returns the invalidated keys.
pub fn invalidate(conn: &Connection, scope: &InvalidationScope) -> SiftResult<Vec<CacheKey>> {
    let (ticket_id, intent_id, prompt_version): (Option<&str>, Option<&str>, Option<u32>) =
        match scope {
            InvalidationScope::Key(key) => (
                Some(key.ticket_id.as_str()),
                Some(key.intent_id.as_str()),
                Some(key.prompt_version),
            ),
            InvalidationScope::Ticket { ticket_id } => (Some(ticket_id.as_str()), None, None),
            InvalidationScope::Intent { intent_id } => (None, Some(intent_id.as_str()), None),
        };
    // NULL parameters match any value.
    const SCOPE_FILTER: &str = "invalidated_at IS NULL AND intent_id IS NOT NULL
        AND ticket_id = COALESCE(?1, ticket_id)
        AND intent_id = COALESCE(?2, intent_id)
        AND prompt_version = COALESCE(?3, prompt_version)";

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("invalidate begin: {e}")))?;

    let result = (|| -> SiftResult<Vec<CacheKey>> {
        let keys = {
            let mut stmt = tx
                .prepare(&format!(
                    "SELECT ticket_id, intent_id, prompt_version FROM suggestions
                     WHERE {SCOPE_FILTER}"
                ))
                .map_err(sqlite_err)?;
            let mapped = stmt
                .query_map(params![ticket_id, intent_id, prompt_version], row_to_key)
                .map_err(sqlite_err)?;
            mapped.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)?
        };
        tx.execute(
            &format!("UPDATE suggestions SET invalidated_at = ?4 WHERE {SCOPE_FILTER}"),
            params![ticket_id, intent_id, prompt_version, fmt_ts(&Utc::now())],
        )
        .map_err(sqlite_err)?;
        Ok(keys)
    })();

    match result {
        Ok(keys) => {
            tx.commit()
                .map_err(|e| to_storage_err(format!("invalidate commit: {e}")))?;
            Ok(keys)
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

pub fn suggestions_for_ticket(conn: &Connection, ticket_id: &str) -> SiftResult<Vec<Suggestion>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SUGGESTION_COLUMNS} FROM suggestions
             WHERE ticket_id = ?1 ORDER BY created_at, suggestion_id"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![ticket_id], |row| Ok(row_to_suggestion(row)))
        .map_err(sqlite_err)?;
    rows.map(|r| r.map_err(sqlite_err)?).collect()
}

fn row_to_key(row: &Row<'_>) -> rusqlite::Result<CacheKey> {
    Ok(CacheKey {
        ticket_id: row.get(0)?,
        intent_id: row.get(1)?,
        prompt_version: row.get(2)?,
    })
}

fn row_to_suggestion(row: &Row<'_>) -> SiftResult<Suggestion> {
    let band: String = row.get(5).map_err(sqlite_err)?;
    let similar: String = row.get(6).map_err(sqlite_err)?;
    let snapshot_version: Option<i64> = row.get(8).map_err(sqlite_err)?;
    let created_at: String = row.get(9).map_err(sqlite_err)?;
    let invalidated_at: Option<String> = row.get(10).map_err(sqlite_err)?;
    Ok(Suggestion {
        suggestion_id: row.get(0).map_err(sqlite_err)?,
        ticket_id: row.get(1).map_err(sqlite_err)?,
        intent_id: row.get(2).map_err(sqlite_err)?,
        response_text: row.get(3).map_err(sqlite_err)?,
        confidence_score: row.get(4).map_err(sqlite_err)?,
        band: parse_enum(&band, TABLE)?,
        similar_ticket_ids: parse_json_list(&similar, TABLE)?,
        prompt_version: row.get(7).map_err(sqlite_err)?,
        snapshot_version: snapshot_version.map(|v| SnapshotVersion(v as u64)),
        created_at: parse_ts(&created_at, TABLE)?,
        invalidated_at: parse_opt_ts(invalidated_at, TABLE)?,
    })
}
