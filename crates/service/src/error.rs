//! Typed error enum for the service layer.
//!
//! Unifies storage, domain and location failures so callers can match on
//! specific failure modes.

use thiserror::Error;
use wildlog_core::CoreError;
use wildlog_location::LocationError;
use wildlog_storage::StorageError;

/// Service-layer error unifying storage, domain and location failures.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// Persisting or reading the observation list failed.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Caller provided an invalid value (coordinate, date).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] CoreError),

    /// Location platform failure that could not be absorbed.
    #[error("location: {0}")]
    Location(#[from] LocationError),

    /// No observation carries the requested id.
    #[error("observation not found: {0}")]
    NotFound(String),

    /// Adding at the current position needs a fix and none is available.
    #[error("no location fix available")]
    NoLocation,
}

impl ServiceError {
    /// Whether this error is likely transient (worth retrying).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::Location(LocationError::Unavailable(_)) | Self::NoLocation => true,
            _ => false,
        }
    }

    /// Whether this error represents a not-found condition.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
