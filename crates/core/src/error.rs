use thiserror::Error;

/// Errors raised while constructing or validating domain values.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum CoreError {
    #[error("invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("invalid date {0:?}: expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid position {0:?}: expected \"lat,lon[,accuracy]\"")]
    InvalidPosition(String),

    #[error("unknown storage backend {0:?}: expected file, sqlite or memory")]
    UnknownBackend(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
