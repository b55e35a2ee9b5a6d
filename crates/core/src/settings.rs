//! Runtime settings resolved from `WILDLOG_*` environment variables.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{DATA_DIR_NAME, OBSERVATIONS_KEY};
use crate::env_config::parse_with_default;
use crate::error::CoreError;
use crate::location::{FixedPosition, WatchOptions};

pub const ENV_DATA_DIR: &str = "WILDLOG_DATA_DIR";
pub const ENV_STORAGE_BACKEND: &str = "WILDLOG_STORAGE_BACKEND";
pub const ENV_STORAGE_KEY: &str = "WILDLOG_STORAGE_KEY";
pub const ENV_WATCH_DISTANCE_M: &str = "WILDLOG_WATCH_DISTANCE_M";
pub const ENV_WATCH_INTERVAL_MS: &str = "WILDLOG_WATCH_INTERVAL_MS";
pub const ENV_FIXED_POSITION: &str = "WILDLOG_FIXED_POSITION";

/// Which key-value backend holds the observation blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    File,
    Sqlite,
    Memory,
}

impl BackendKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::File => "file",
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" | "json" => Ok(Self::File),
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(CoreError::UnknownBackend(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub backend: BackendKind,
    pub storage_key: String,
    pub watch: WatchOptions,
    /// Position reported by the simulated platform, if configured
    pub fixed_position: Option<FixedPosition>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: BackendKind::default(),
            storage_key: OBSERVATIONS_KEY.to_owned(),
            watch: WatchOptions::default(),
            fixed_position: None,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join(DATA_DIR_NAME)
}

impl Settings {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Resolves settings through `lookup`. Invalid values are logged and replaced by defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let present = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let data_dir = present(ENV_DATA_DIR).map_or(defaults.data_dir, PathBuf::from);

        let backend = present(ENV_STORAGE_BACKEND).map_or(defaults.backend, |raw| {
            raw.parse().unwrap_or_else(|e| {
                tracing::warn!(
                    error = %e,
                    default = %defaults.backend,
                    "invalid {}, using default",
                    ENV_STORAGE_BACKEND
                );
                defaults.backend
            })
        });

        let storage_key = present(ENV_STORAGE_KEY).unwrap_or(defaults.storage_key);

        let watch = WatchOptions {
            accuracy: defaults.watch.accuracy,
            distance_interval_m: parse_with_default(
                ENV_WATCH_DISTANCE_M,
                lookup(ENV_WATCH_DISTANCE_M),
                defaults.watch.distance_interval_m,
            )
            .max(0.0),
            time_interval_ms: parse_with_default(
                ENV_WATCH_INTERVAL_MS,
                lookup(ENV_WATCH_INTERVAL_MS),
                defaults.watch.time_interval_ms,
            ),
        };

        let fixed_position = present(ENV_FIXED_POSITION).and_then(|raw| match raw.parse() {
            Ok(position) => Some(position),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring {}", ENV_FIXED_POSITION);
                None
            },
        });

        Self { data_dir, backend, storage_key, watch, fixed_position }
    }
}
