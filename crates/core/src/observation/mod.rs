//! Wildlife observation records.

mod draft;

pub use draft::*;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::location::Coordinate;

/// A user-recorded sighting, as persisted in the observation list.
///
/// Field names on disk are camelCase (`imageUri`, `createdAt`). Optional fields
/// are omitted when absent, and both `null` and a missing field read back as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Unique identifier, assigned once at creation
    pub id: String,
    /// Species label
    #[serde(alias = "species")]
    pub name: String,
    /// Free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Day of the sighting as stored. New records are always `YYYY-MM-DD`;
    /// older payloads may carry free text, which is kept verbatim.
    pub date: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Reference to a locally cached photo; never the image bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    /// Epoch milliseconds at which the record was persisted
    pub created_at: i64,
}

impl Observation {
    /// Generates a collision-resistant identifier for a new record.
    #[must_use]
    pub fn new_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Marker position. Not re-validated: stored records are trusted as written.
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate { latitude: self.latitude, longitude: self.longitude }
    }

    /// The sighting day, if `date` is a `YYYY-MM-DD` calendar date.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_observation_date(&self.date).ok()
    }

    #[must_use]
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at)
    }

    /// Returns a copy with the edit applied. `id`, position and timestamps never change.
    #[must_use]
    pub fn with_edit(&self, edit: &ObservationEdit) -> Self {
        let mut updated = self.clone();
        if let Some(name) = &edit.name {
            updated.name = normalize_name(name);
        }
        if let Some(description) = &edit.description {
            updated.description = normalize_description(description.clone());
        }
        updated
    }
}
