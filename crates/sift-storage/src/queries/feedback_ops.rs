//! Append-only feedback events and the per-intent metrics derived from them.

use rusqlite::{params, Connection, OptionalExtension, Row};

use sift_core::errors::SiftResult;
use sift_core::models::{FeedbackEvent, FeedbackSample, IntentFeedbackStats};

use super::codec::{fmt_ts, parse_enum, parse_ts};
use crate::sqlite_err;

const TABLE: &str = "feedback_events";

const EVENT_COLUMNS: &str =
    "f.feedback_id, f.suggestion_id, f.action, f.edited_text, f.rejection_reason, f.created_at";

pub fn append_feedback(conn: &Connection, event: &FeedbackEvent) -> SiftResult<()> {
    conn.execute(
        "INSERT INTO feedback_events
            (feedback_id, suggestion_id, action, edited_text, rejection_reason, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            event.feedback_id,
            event.suggestion_id,
            event.action.as_str(),
            event.edited_text,
            event.rejection_reason,
            fmt_ts(&event.created_at),
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn feedback_for_suggestion(
    conn: &Connection,
    suggestion_id: &str,
) -> SiftResult<Vec<FeedbackEvent>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM feedback_events f
             WHERE f.suggestion_id = ?1 ORDER BY f.created_at, f.rowid"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![suggestion_id], |row| Ok(row_to_event(row)))
        .map_err(sqlite_err)?;
    rows.map(|r| r.map_err(sqlite_err)?).collect()
}

pub fn feedback_samples_for_intent(
    conn: &Connection,
    intent_id: &str,
) -> SiftResult<Vec<FeedbackSample>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {EVENT_COLUMNS}, s.response_text
             FROM feedback_events f
             JOIN suggestions s ON s.suggestion_id = f.suggestion_id
             WHERE s.intent_id = ?1
             ORDER BY f.created_at, f.rowid"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![intent_id], |row| {
            Ok(row_to_event(row).and_then(|event| {
                Ok(FeedbackSample {
                    event,
                    response_text: row.get(6).map_err(sqlite_err)?,
                })
            }))
        })
        .map_err(sqlite_err)?;
    rows.map(|r| r.map_err(sqlite_err)?).collect()
}

/// Conditional upsert: an aggregate covering fewer events than the stored one is
/// dropped. Returns whether the row was written.
pub fn upsert_intent_metrics(conn: &Connection, stats: &IntentFeedbackStats) -> SiftResult<bool> {
    let changed = conn
        .execute(
            "INSERT INTO intent_metrics (
                intent_id, accepts, edits, rejects, total_events, edit_similarity_sum,
                acceptance_rate, repetition_score, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT (intent_id) DO UPDATE SET
                accepts = excluded.accepts,
                edits = excluded.edits,
                rejects = excluded.rejects,
                total_events = excluded.total_events,
                edit_similarity_sum = excluded.edit_similarity_sum,
                acceptance_rate = excluded.acceptance_rate,
                repetition_score = excluded.repetition_score,
                updated_at = excluded.updated_at
             WHERE excluded.total_events >= intent_metrics.total_events",
            params![
                stats.intent_id,
                stats.accepts as i64,
                stats.edits as i64,
                stats.rejects as i64,
                stats.total_events() as i64,
                stats.edit_similarity_sum,
                stats.acceptance_rate,
                stats.repetition_score,
                fmt_ts(&stats.updated_at),
            ],
        )
        .map_err(sqlite_err)?;
    Ok(changed == 1)
}

const METRIC_COLUMNS: &str = "intent_id, accepts, edits, rejects, edit_similarity_sum,
    acceptance_rate, repetition_score, updated_at";

pub fn intent_metrics(conn: &Connection, intent_id: &str) -> SiftResult<Option<IntentFeedbackStats>> {
    conn.query_row(
        &format!("SELECT {METRIC_COLUMNS} FROM intent_metrics WHERE intent_id = ?1"),
        params![intent_id],
        |row| Ok(row_to_metrics(row)),
    )
    .optional()
    .map_err(sqlite_err)?
    .transpose()
}

pub fn all_intent_metrics(conn: &Connection) -> SiftResult<Vec<IntentFeedbackStats>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {METRIC_COLUMNS} FROM intent_metrics ORDER BY intent_id"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([], |row| Ok(row_to_metrics(row)))
        .map_err(sqlite_err)?;
    rows.map(|r| r.map_err(sqlite_err)?).collect()
}

fn row_to_event(row: &Row<'_>) -> SiftResult<FeedbackEvent> {
    let action: String = row.get(2).map_err(sqlite_err)?;
    let created_at: String = row.get(5).map_err(sqlite_err)?;
    Ok(FeedbackEvent {
        feedback_id: row.get(0).map_err(sqlite_err)?,
        suggestion_id: row.get(1).map_err(sqlite_err)?,
        action: parse_enum(&action, TABLE)?,
        edited_text: row.get(3).map_err(sqlite_err)?,
        rejection_reason: row.get(4).map_err(sqlite_err)?,
        created_at: parse_ts(&created_at, TABLE)?,
    })
}

fn row_to_metrics(row: &Row<'_>) -> SiftResult<IntentFeedbackStats> {
    let updated_at: String = row.get(7).map_err(sqlite_err)?;
    Ok(IntentFeedbackStats {
        intent_id: row.get(0).map_err(sqlite_err)?,
        accepts: row.get::<_, i64>(1).map_err(sqlite_err)? as u64,
        edits: row.get::<_, i64>(2).map_err(sqlite_err)? as u64,
        rejects: row.get::<_, i64>(3).map_err(sqlite_err)? as u64,
        edit_similarity_sum: row.get(4).map_err(sqlite_err)?,
        acceptance_rate: row.get(5).map_err(sqlite_err)?,
        repetition_score: row.get(6).map_err(sqlite_err)?,
        updated_at: parse_ts(&updated_at, "intent_metrics")?,
    })
}
