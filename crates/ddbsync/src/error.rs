//! Error types for synchronization runs.

/// Errors that can occur while synchronizing a table.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Invalid or incomplete configuration, detected before any store is touched.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The source store could not be reached or returned an error.
    #[error("Source error for table '{table}': {message}")]
    Source {
        /// Table being read.
        table: String,
        /// Error message.
        message: String,
    },

    /// The target database could not be reached or its catalog could not be read.
    #[error("Target error: {0}")]
    Target(#[from] sqlx::Error),

    /// The target rejected a generated statement.
    #[error("Statement failed: {statement}: {source}")]
    Statement {
        /// The statement that failed.
        statement: String,
        /// Underlying database error.
        source: sqlx::Error,
    },

    /// An existing column is incompatible with the inferred one.
    ///
    /// Reconciliation never narrows or rewrites existing columns, so this is
    /// currently never raised.
    #[error("Schema conflict: {0}")]
    SchemaConflict(String),

    /// IO error (reading export files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    /// Creates a source error for `table`.
    pub fn from_source(table: impl Into<String>, message: impl ToString) -> Self {
        Self::Source {
            table: table.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for synchronization operations.
pub type Result<T> = std::result::Result<T, SyncError>;
