use thiserror::Error;

/// Failures reported by the platform location service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LocationError {
    /// Foreground location permission is missing.
    #[error("location permission not granted")]
    PermissionDenied,

    /// No fix could be obtained (no signal, services disabled).
    #[error("location unavailable: {0}")]
    Unavailable(String),

    /// Any other host API failure.
    #[error("location platform error: {0}")]
    Platform(String),
}
