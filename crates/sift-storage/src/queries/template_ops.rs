//! Versioned prompt templates per intent.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use sift_core::errors::SiftResult;
use sift_core::models::PromptTemplate;

use super::codec::{fmt_ts, parse_json_list, parse_ts};
use crate::{sqlite_err, to_storage_err};

const TABLE: &str = "prompt_templates";

pub fn current_template(conn: &Connection, intent_id: &str) -> SiftResult<Option<PromptTemplate>> {
    conn.query_row(
        "SELECT intent_id, version, policy, constraints, created_at FROM prompt_templates
         WHERE intent_id = ?1 ORDER BY version DESC LIMIT 1",
        params![intent_id],
        |row| Ok(row_to_template(row)),
    )
    .optional()
    .map_err(sqlite_err)?
    .transpose()
}

/// Append a template as version `max + 1`.
pub fn publish_template(
    conn: &Connection,
    intent_id: &str,
    policy: &str,
    constraints: &[String],
) -> SiftResult<PromptTemplate> {
    let constraints_json =
        serde_json::to_string(constraints).map_err(|e| to_storage_err(e.to_string()))?;
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("publish_template begin: {e}")))?;

    let result = (|| -> SiftResult<PromptTemplate> {
        let next: u32 = tx
            .query_row(
                "SELECT COALESCE(MAX(version), 0) + 1 FROM prompt_templates WHERE intent_id = ?1",
                params![intent_id],
                |row| row.get(0),
            )
            .map_err(sqlite_err)?;
        let template = PromptTemplate {
            intent_id: intent_id.to_string(),
            version: next,
            policy: policy.to_string(),
            constraints: constraints.to_vec(),
            created_at: Utc::now(),
        };
        tx.execute(
            "INSERT INTO prompt_templates (intent_id, version, policy, constraints, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                template.intent_id,
                template.version,
                template.policy,
                constraints_json,
                fmt_ts(&template.created_at),
            ],
        )
        .map_err(sqlite_err)?;
        Ok(template)
    })();

    match result {
        Ok(template) => {
            tx.commit()
                .map_err(|e| to_storage_err(format!("publish_template commit: {e}")))?;
            Ok(template)
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

pub fn template_history(conn: &Connection, intent_id: &str) -> SiftResult<Vec<PromptTemplate>> {
    let mut stmt = conn
        .prepare(
            "SELECT intent_id, version, policy, constraints, created_at FROM prompt_templates
             WHERE intent_id = ?1 ORDER BY version",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![intent_id], |row| Ok(row_to_template(row)))
        .map_err(sqlite_err)?;
    rows.map(|r| r.map_err(sqlite_err)?).collect()
}

fn row_to_template(row: &Row<'_>) -> SiftResult<PromptTemplate> {
    let constraints: String = row.get(3).map_err(sqlite_err)?;
    let created_at: String = row.get(4).map_err(sqlite_err)?;
    Ok(PromptTemplate {
        intent_id: row.get(0).map_err(sqlite_err)?,
        version: row.get(1).map_err(sqlite_err)?,
        policy: row.get(2).map_err(sqlite_err)?,
        constraints: parse_json_list(&constraints, TABLE)?,
        created_at: parse_ts(&created_at, TABLE)?,
    })
}
