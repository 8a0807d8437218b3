//! v002: cluster snapshots, assignments, centroids, and the current pointer.

use rusqlite::Connection;

use sift_core::errors::SiftResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> SiftResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS cluster_snapshots (
            version                INTEGER PRIMARY KEY,
            model_version          TEXT NOT NULL,
            fingerprint            TEXT NOT NULL,
            calibration_midpoint   REAL NOT NULL,
            calibration_steepness  REAL NOT NULL,
            n_clusters             INTEGER NOT NULL,
            noise_count            INTEGER NOT NULL,
            noise_ratio            REAL NOT NULL,
            silhouette             REAL NOT NULL,
            created_at             TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS cluster_assignments (
            snapshot_version  INTEGER NOT NULL REFERENCES cluster_snapshots(version),
            ticket_id         TEXT NOT NULL,
            cluster_id        INTEGER,
            distance          REAL NOT NULL,
            is_noise          INTEGER NOT NULL,
            PRIMARY KEY (snapshot_version, ticket_id),
            CHECK ((is_noise = 1) = (cluster_id IS NULL))
        );

        CREATE INDEX IF NOT EXISTS idx_assignments_cluster
            ON cluster_assignments(snapshot_version, cluster_id);

        CREATE TABLE IF NOT EXISTS cluster_centroids (
            snapshot_version  INTEGER NOT NULL REFERENCES cluster_snapshots(version),
            cluster_id        INTEGER NOT NULL,
            size              INTEGER NOT NULL,
            vector            BLOB NOT NULL,
            PRIMARY KEY (snapshot_version, cluster_id)
        );

        CREATE TABLE IF NOT EXISTS current_snapshot (
            id          INTEGER PRIMARY KEY CHECK (id = 1),
            version     INTEGER NOT NULL REFERENCES cluster_snapshots(version),
            swapped_at  TEXT NOT NULL
        );

        CREATE TRIGGER IF NOT EXISTS cluster_snapshots_no_update
        BEFORE UPDATE ON cluster_snapshots
        BEGIN
            SELECT RAISE(ABORT, 'published snapshots are immutable');
        END;

        CREATE TRIGGER IF NOT EXISTS cluster_snapshots_no_delete
        BEFORE DELETE ON cluster_snapshots
        BEGIN
            SELECT RAISE(ABORT, 'published snapshots are immutable');
        END;

        CREATE TRIGGER IF NOT EXISTS cluster_assignments_no_update
        BEFORE UPDATE ON cluster_assignments
        BEGIN
            SELECT RAISE(ABORT, 'cluster assignments are immutable');
        END;

        CREATE TRIGGER IF NOT EXISTS cluster_assignments_no_delete
        BEFORE DELETE ON cluster_assignments
        BEGIN
            SELECT RAISE(ABORT, 'cluster assignments are immutable');
        END;

        CREATE TRIGGER IF NOT EXISTS cluster_centroids_no_update
        BEFORE UPDATE ON cluster_centroids
        BEGIN
            SELECT RAISE(ABORT, 'cluster centroids are immutable');
        END;

        CREATE TRIGGER IF NOT EXISTS cluster_centroids_no_delete
        BEFORE DELETE ON cluster_centroids
        BEGIN
            SELECT RAISE(ABORT, 'cluster centroids are immutable');
        END;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
