//! Shared constants for wildlog.

/// Storage key holding the serialized observation list.
pub const OBSERVATIONS_KEY: &str = "@observations_v1";

/// Label used when a draft is submitted without a name.
pub const DEFAULT_OBSERVATION_NAME: &str = "Observation";

/// Minimum movement in meters before the watcher emits a new sample.
pub const WATCH_DISTANCE_INTERVAL_M: f64 = 10.0;

/// Minimum time between two watcher samples.
pub const WATCH_TIME_INTERVAL_MS: u64 = 2000;

/// Buffer size of the channel carrying watched samples.
pub const WATCH_CHANNEL_CAPACITY: usize = 16;

/// Directory name under the platform data dir.
pub const DATA_DIR_NAME: &str = "wildlog";
