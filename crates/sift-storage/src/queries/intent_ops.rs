//! Intent rows and the status audit trail.

use rusqlite::{params, Connection, OptionalExtension, Row};

use sift_core::errors::SiftResult;
use sift_core::models::{Intent, IntentStatus, IntentTransition, SnapshotVersion};

use super::codec::{fmt_ts, parse_enum, parse_ts};
use crate::{sqlite_err, to_storage_err};

const TABLE: &str = "intents";

const INTENT_COLUMNS: &str = "intent_id, cluster_id, snapshot_version, name, description, volume,
    avg_resolution_hours, repetition_score, acceptance_rate, risk_level, composite_score,
    status, unbound_cycles, created_at, updated_at";

pub fn insert_intent(conn: &Connection, intent: &Intent) -> SiftResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO intents ({INTENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
        ),
        params![
            intent.intent_id,
            intent.cluster_id,
            intent.snapshot_version.map(|v| v.value() as i64),
            intent.name,
            intent.description,
            intent.volume as i64,
            intent.avg_resolution_hours,
            intent.repetition_score,
            intent.acceptance_rate,
            intent.risk_level.as_str(),
            intent.composite_score,
            intent.status.as_str(),
            intent.unbound_cycles,
            fmt_ts(&intent.created_at),
            fmt_ts(&intent.updated_at),
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

/// Overwrite every mutable column. `intent_id` and `created_at` never change.
pub fn write_intent(conn: &Connection, intent: &Intent) -> SiftResult<()> {
    let changed = conn
        .execute(
            "UPDATE intents SET
                cluster_id = ?2, snapshot_version = ?3, name = ?4, description = ?5,
                volume = ?6, avg_resolution_hours = ?7, repetition_score = ?8,
                acceptance_rate = ?9, risk_level = ?10, composite_score = ?11, status = ?12,
                unbound_cycles = ?13, updated_at = ?14
             WHERE intent_id = ?1",
            params![
                intent.intent_id,
                intent.cluster_id,
                intent.snapshot_version.map(|v| v.value() as i64),
                intent.name,
                intent.description,
                intent.volume as i64,
                intent.avg_resolution_hours,
                intent.repetition_score,
                intent.acceptance_rate,
                intent.risk_level.as_str(),
                intent.composite_score,
                intent.status.as_str(),
                intent.unbound_cycles,
                fmt_ts(&intent.updated_at),
            ],
        )
        .map_err(sqlite_err)?;
    if changed == 0 {
        return Err(sift_core::SiftError::not_found("intent", &intent.intent_id));
    }
    Ok(())
}

/// Update an intent and, when given, append its transition in the same transaction.
pub fn update_intent(
    conn: &Connection,
    intent: &Intent,
    transition: Option<&IntentTransition>,
) -> SiftResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("update_intent begin: {e}")))?;

    let result = write_intent(&tx, intent).and_then(|()| match transition {
        Some(t) => insert_transition(&tx, t),
        None => Ok(()),
    });
    match result {
        Ok(()) => {
            tx.commit()
                .map_err(|e| to_storage_err(format!("update_intent commit: {e}")))?;
            Ok(())
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

pub fn get_intent(conn: &Connection, intent_id: &str) -> SiftResult<Option<Intent>> {
    conn.query_row(
        &format!("SELECT {INTENT_COLUMNS} FROM intents WHERE intent_id = ?1"),
        params![intent_id],
        |row| Ok(row_to_intent(row)),
    )
    .optional()
    .map_err(sqlite_err)?
    .transpose()
}

/// Highest composite score first; ties by intent id.
pub fn list_intents(conn: &Connection, status: Option<IntentStatus>) -> SiftResult<Vec<Intent>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {INTENT_COLUMNS} FROM intents
             WHERE ?1 IS NULL OR status = ?1
             ORDER BY composite_score DESC, intent_id"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![status.map(|s| s.as_str())], |row| {
            Ok(row_to_intent(row))
        })
        .map_err(sqlite_err)?;
    rows.map(|r| r.map_err(sqlite_err)?).collect()
}

pub fn intents_for_cluster(conn: &Connection, cluster_id: u32) -> SiftResult<Vec<Intent>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {INTENT_COLUMNS} FROM intents WHERE cluster_id = ?1 ORDER BY intent_id"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![cluster_id], |row| Ok(row_to_intent(row)))
        .map_err(sqlite_err)?;
    rows.map(|r| r.map_err(sqlite_err)?).collect()
}

pub fn insert_transition(conn: &Connection, t: &IntentTransition) -> SiftResult<()> {
    conn.execute(
        "INSERT INTO intent_transitions (intent_id, from_status, to_status, actor, reason, at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            t.intent_id,
            t.from.as_str(),
            t.to.as_str(),
            t.actor,
            t.reason,
            fmt_ts(&t.at),
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn transitions(conn: &Connection, intent_id: &str) -> SiftResult<Vec<IntentTransition>> {
    let mut stmt = conn
        .prepare(
            "SELECT intent_id, from_status, to_status, actor, reason, at
             FROM intent_transitions WHERE intent_id = ?1 ORDER BY id",
        )
        .map_err(sqlite_err)?;
    let raw = stmt
        .query_map(params![intent_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
            ))
        })
        .map_err(sqlite_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sqlite_err)?;

    raw.into_iter()
        .map(|(intent_id, from, to, actor, reason, at)| {
            Ok(IntentTransition {
                intent_id,
                from: parse_enum(&from, "intent_transitions")?,
                to: parse_enum(&to, "intent_transitions")?,
                actor,
                reason,
                at: parse_ts(&at, "intent_transitions")?,
            })
        })
        .collect()
}

fn row_to_intent(row: &Row<'_>) -> SiftResult<Intent> {
    let snapshot_version: Option<i64> = row.get(2).map_err(sqlite_err)?;
    let risk: String = row.get(9).map_err(sqlite_err)?;
    let status: String = row.get(11).map_err(sqlite_err)?;
    let created_at: String = row.get(13).map_err(sqlite_err)?;
    let updated_at: String = row.get(14).map_err(sqlite_err)?;
    Ok(Intent {
        intent_id: row.get(0).map_err(sqlite_err)?,
        cluster_id: row.get(1).map_err(sqlite_err)?,
        snapshot_version: snapshot_version.map(|v| SnapshotVersion(v as u64)),
        name: row.get(3).map_err(sqlite_err)?,
        description: row.get(4).map_err(sqlite_err)?,
        volume: row.get::<_, i64>(5).map_err(sqlite_err)? as u64,
        avg_resolution_hours: row.get(6).map_err(sqlite_err)?,
        repetition_score: row.get(7).map_err(sqlite_err)?,
        acceptance_rate: row.get(8).map_err(sqlite_err)?,
        risk_level: parse_enum(&risk, TABLE)?,
        composite_score: row.get(10).map_err(sqlite_err)?,
        status: parse_enum(&status, TABLE)?,
        unbound_cycles: row.get(12).map_err(sqlite_err)?,
        created_at: parse_ts(&created_at, TABLE)?,
        updated_at: parse_ts(&updated_at, TABLE)?,
    })
}
