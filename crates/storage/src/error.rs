//! Typed error enum for the storage layer.
//!
//! Callers match on the failure mode (I/O, database, pool) instead of
//! downcasting opaque boxes.

use thiserror::Error;

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// Filesystem read/write failure.
    #[error("io error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// SQL statement failure.
    #[cfg(feature = "sqlite")]
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Could not check out a connection.
    #[cfg(feature = "sqlite")]
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Observation list could not be encoded for writing.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Migration failure.
    #[error("migration error: {0}")]
    Migration(String),

    /// Background task running a blocking operation panicked or was cancelled.
    #[error("storage task failed: {0}")]
    Task(String),

    /// Backend requested at runtime is not compiled in.
    #[error("unsupported backend: {0}")]
    Unsupported(String),
}

pub type Result<T, E = StorageError> = std::result::Result<T, E>;

impl StorageError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    /// Whether this error is likely transient (worth retrying).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        use std::io::ErrorKind;
        match self {
            Self::Io { source, .. } => matches!(
                source.kind(),
                ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
            ),
            #[cfg(feature = "sqlite")]
            Self::Pool(_) => true,
            #[cfg(feature = "sqlite")]
            Self::Database(rusqlite::Error::SqliteFailure(e, _)) => matches!(
                e.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn io_transience_follows_error_kind() {
        let busy = StorageError::io("write", io::Error::new(io::ErrorKind::Interrupted, "eintr"));
        assert!(busy.is_transient());
        let denied =
            StorageError::io("write", io::Error::new(io::ErrorKind::PermissionDenied, "ro"));
        assert!(!denied.is_transient());
    }

    #[test]
    fn display_includes_context() {
        let err = StorageError::io("reading key @x", io::Error::other("disk gone"));
        assert_eq!(err.to_string(), "io error: reading key @x");
        assert!(!StorageError::Task("join".to_owned()).is_transient());
    }
}
