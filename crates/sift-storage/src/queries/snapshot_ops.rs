//! Snapshot publish (one transaction) and snapshot reads.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use sift_core::errors::SiftResult;
use sift_core::models::{
    Centroid, ClusterAssignment, ClusterMetrics, ClusterSnapshot, ConfidenceCurve, Intent,
    IntentTransition, SnapshotSummary, SnapshotVersion,
};

use super::codec::{blob_to_vector, fmt_ts, parse_ts, vector_to_blob};
use super::intent_ops;
use crate::{sqlite_err, to_storage_err};

const TABLE: &str = "cluster_snapshots";

/// Write snapshot rows, the relinked intents, their transitions, and swap the
/// current pointer. Any failure rolls everything back.
pub fn publish(
    conn: &Connection,
    snapshot: &ClusterSnapshot,
    intents: &[Intent],
    transitions: &[IntentTransition],
) -> SiftResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("publish begin: {e}")))?;

    match publish_inner(&tx, snapshot, intents, transitions) {
        Ok(()) => {
            tx.commit()
                .map_err(|e| to_storage_err(format!("publish commit: {e}")))?;
            Ok(())
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

fn publish_inner(
    conn: &Connection,
    snapshot: &ClusterSnapshot,
    intents: &[Intent],
    transitions: &[IntentTransition],
) -> SiftResult<()> {
    let version = snapshot.version.value() as i64;
    conn.execute(
        "INSERT INTO cluster_snapshots (
            version, model_version, fingerprint, calibration_midpoint, calibration_steepness,
            n_clusters, noise_count, noise_ratio, silhouette, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            version,
            snapshot.model_version,
            snapshot.fingerprint,
            snapshot.calibration.midpoint,
            snapshot.calibration.steepness,
            snapshot.metrics.n_clusters as i64,
            snapshot.metrics.noise_count as i64,
            snapshot.metrics.noise_ratio,
            snapshot.metrics.silhouette,
            fmt_ts(&snapshot.created_at),
        ],
    )
    .map_err(sqlite_err)?;

    {
        let mut stmt = conn
            .prepare_cached(
                "INSERT INTO cluster_assignments
                    (snapshot_version, ticket_id, cluster_id, distance, is_noise)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .map_err(sqlite_err)?;
        for a in &snapshot.assignments {
            stmt.execute(params![
                version,
                a.ticket_id,
                a.cluster_id,
                a.distance_to_centroid,
                a.is_noise as i32,
            ])
            .map_err(sqlite_err)?;
        }
    }

    {
        let mut stmt = conn
            .prepare_cached(
                "INSERT INTO cluster_centroids (snapshot_version, cluster_id, size, vector)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .map_err(sqlite_err)?;
        for c in &snapshot.centroids {
            stmt.execute(params![
                version,
                c.cluster_id,
                c.size as i64,
                vector_to_blob(&c.vector),
            ])
            .map_err(sqlite_err)?;
        }
    }

    // Clear bindings first so swapped cluster ids never collide on the active index.
    for intent in intents {
        conn.execute(
            "UPDATE intents SET cluster_id = NULL WHERE intent_id = ?1",
            params![intent.intent_id],
        )
        .map_err(sqlite_err)?;
    }
    for intent in intents {
        intent_ops::write_intent(conn, intent)?;
    }
    for transition in transitions {
        intent_ops::insert_transition(conn, transition)?;
    }

    conn.execute(
        "INSERT INTO current_snapshot (id, version, swapped_at) VALUES (1, ?1, ?2)
         ON CONFLICT (id) DO UPDATE SET version = excluded.version, swapped_at = excluded.swapped_at",
        params![version, fmt_ts(&Utc::now())],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn current_version(conn: &Connection) -> SiftResult<Option<SnapshotVersion>> {
    let version: Option<i64> = conn
        .query_row("SELECT version FROM current_snapshot WHERE id = 1", [], |row| {
            row.get(0)
        })
        .optional()
        .map_err(sqlite_err)?;
    Ok(version.map(|v| SnapshotVersion(v as u64)))
}

pub fn latest_version(conn: &Connection) -> SiftResult<Option<SnapshotVersion>> {
    let version: Option<i64> = conn
        .query_row("SELECT MAX(version) FROM cluster_snapshots", [], |row| row.get(0))
        .map_err(sqlite_err)?;
    Ok(version.map(|v| SnapshotVersion(v as u64)))
}

pub fn load_snapshot(
    conn: &Connection,
    version: SnapshotVersion,
) -> SiftResult<Option<ClusterSnapshot>> {
    let v = version.value() as i64;
    let header = conn
        .query_row(
            "SELECT model_version, fingerprint, calibration_midpoint, calibration_steepness,
                    n_clusters, noise_count, noise_ratio, silhouette, created_at
             FROM cluster_snapshots WHERE version = ?1",
            params![v],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    ConfidenceCurve::new(row.get(2)?, row.get(3)?),
                    ClusterMetrics {
                        n_clusters: row.get::<_, i64>(4)? as usize,
                        noise_count: row.get::<_, i64>(5)? as usize,
                        noise_ratio: row.get(6)?,
                        silhouette: row.get(7)?,
                    },
                    row.get::<_, String>(8)?,
                ))
            },
        )
        .optional()
        .map_err(sqlite_err)?;

    let Some((model_version, fingerprint, calibration, metrics, created_at)) = header else {
        return Ok(None);
    };

    let mut stmt = conn
        .prepare(
            "SELECT ticket_id, cluster_id, distance, is_noise FROM cluster_assignments
             WHERE snapshot_version = ?1 ORDER BY ticket_id",
        )
        .map_err(sqlite_err)?;
    let assignments = stmt
        .query_map(params![v], |row| {
            Ok(ClusterAssignment {
                ticket_id: row.get(0)?,
                cluster_id: row.get(1)?,
                distance_to_centroid: row.get(2)?,
                is_noise: row.get::<_, i32>(3)? != 0,
                snapshot_version: version,
            })
        })
        .map_err(sqlite_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sqlite_err)?;

    let mut stmt = conn
        .prepare(
            "SELECT cluster_id, size, vector FROM cluster_centroids
             WHERE snapshot_version = ?1 ORDER BY cluster_id",
        )
        .map_err(sqlite_err)?;
    let raw_centroids = stmt
        .query_map(params![v], |row| {
            Ok((
                row.get::<_, u32>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, Vec<u8>>(2)?,
            ))
        })
        .map_err(sqlite_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sqlite_err)?;
    let centroids = raw_centroids
        .into_iter()
        .map(|(cluster_id, size, blob)| {
            Ok(Centroid {
                cluster_id,
                size: size as usize,
                vector: blob_to_vector(&blob, "cluster_centroids")?,
            })
        })
        .collect::<SiftResult<Vec<_>>>()?;

    Ok(Some(ClusterSnapshot {
        version,
        model_version,
        created_at: parse_ts(&created_at, TABLE)?,
        fingerprint,
        assignments,
        centroids,
        calibration,
        metrics,
    }))
}

pub fn list_snapshots(conn: &Connection) -> SiftResult<Vec<SnapshotSummary>> {
    let current = current_version(conn)?;
    let mut stmt = conn
        .prepare(
            "SELECT version, model_version, n_clusters, noise_count, noise_ratio, silhouette,
                    created_at
             FROM cluster_snapshots ORDER BY version DESC",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                SnapshotVersion(row.get::<_, i64>(0)? as u64),
                row.get::<_, String>(1)?,
                ClusterMetrics {
                    n_clusters: row.get::<_, i64>(2)? as usize,
                    noise_count: row.get::<_, i64>(3)? as usize,
                    noise_ratio: row.get(4)?,
                    silhouette: row.get(5)?,
                },
                row.get::<_, String>(6)?,
            ))
        })
        .map_err(sqlite_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sqlite_err)?;

    rows.into_iter()
        .map(|(version, model_version, metrics, created_at)| {
            Ok(SnapshotSummary {
                version,
                model_version,
                created_at: parse_ts(&created_at, TABLE)?,
                metrics,
                is_current: Some(version) == current,
            })
        })
        .collect()
}
