//! Geolocation value types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{WATCH_DISTANCE_INTERVAL_M, WATCH_TIME_INTERVAL_MS};
use crate::error::CoreError;

/// WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Validates and builds a coordinate.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidCoordinate`] for non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(CoreError::InvalidCoordinate { latitude, longitude });
        }
        Ok(Self { latitude, longitude })
    }

    /// Builds a coordinate from the `[longitude, latitude]` order map SDKs emit.
    ///
    /// # Errors
    /// Same as [`Coordinate::new`].
    pub fn from_lng_lat(lng_lat: [f64; 2]) -> Result<Self, CoreError> {
        let [longitude, latitude] = lng_lat;
        Self::new(latitude, longitude)
    }

    #[must_use]
    pub const fn to_lng_lat(self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Great-circle distance in meters (haversine, mean Earth radius).
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

const EARTH_RADIUS_M: f64 = 6_371_008.8;

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// A single fix reported by the platform. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy radius in meters, when the platform reports one
    pub accuracy: Option<f64>,
    /// Capture time, epoch milliseconds
    pub timestamp: i64,
}

impl LocationSample {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64, accuracy: Option<f64>, timestamp: i64) -> Self {
        Self { latitude, longitude, accuracy, timestamp }
    }

    /// # Errors
    /// Returns an error if the platform reported an out-of-range position.
    pub fn coordinate(&self) -> Result<Coordinate, CoreError> {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Foreground location permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
    #[default]
    Undetermined,
}

impl PermissionStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Undetermined => "undetermined",
        }
    }

    #[must_use]
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

impl fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested fix quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Accuracy {
    Low,
    Balanced,
    #[default]
    High,
}

/// Throttling for continuous location updates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WatchOptions {
    pub accuracy: Accuracy,
    /// Minimum movement in meters between two samples
    pub distance_interval_m: f64,
    /// Minimum time between two samples
    pub time_interval_ms: u64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            accuracy: Accuracy::High,
            distance_interval_m: WATCH_DISTANCE_INTERVAL_M,
            time_interval_ms: WATCH_TIME_INTERVAL_MS,
        }
    }
}

/// A fixed position given as `lat,lon` or `lat,lon,accuracy`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPosition {
    pub coordinate: Coordinate,
    pub accuracy: Option<f64>,
}

impl FromStr for FixedPosition {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidPosition(s.to_owned());
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| invalid())?;
        match parts.as_slice() {
            [lat, lon] => Ok(Self { coordinate: Coordinate::new(*lat, *lon)?, accuracy: None }),
            [lat, lon, acc] if *acc >= 0.0 => {
                Ok(Self { coordinate: Coordinate::new(*lat, *lon)?, accuracy: Some(*acc) })
            },
            _ => Err(invalid()),
        }
    }
}
