/// Storage-layer errors for SQLite operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("database busy: {message}")]
    Busy { message: String },

    #[error("constraint violated: {message}")]
    ConstraintViolation { message: String },

    #[error("corrupt row in {table}: {details}")]
    CorruptRow { table: String, details: String },
}
