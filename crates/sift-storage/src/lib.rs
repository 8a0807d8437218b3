//! # sift-storage
//!
//! SQLite persistence for the Sift pipeline. One write connection, a round-robin
//! read pool, versioned migrations, and schema-level immutability for append-only
//! tables.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use rusqlite::ErrorCode;
use sift_core::errors::{SiftError, StorageError};

/// Wrap a message as a generic storage error.
pub(crate) fn to_storage_err(message: String) -> SiftError {
    SiftError::StorageError(StorageError::SqliteError { message })
}

/// Classify a rusqlite error: busy/locked and constraint failures get their own variants.
pub(crate) fn sqlite_err(e: rusqlite::Error) -> SiftError {
    let message = e.to_string();
    let storage = match e.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            StorageError::Busy { message }
        }
        Some(ErrorCode::ConstraintViolation) => StorageError::ConstraintViolation { message },
        _ => StorageError::SqliteError { message },
    };
    SiftError::StorageError(storage)
}
