//! Form payloads for creating and editing observations.

use chrono::{DateTime, NaiveDate, Utc};

use super::Observation;
use crate::constants::DEFAULT_OBSERVATION_NAME;
use crate::error::CoreError;
use crate::location::Coordinate;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` date as typed in the observation form.
///
/// # Errors
/// Returns [`CoreError::InvalidDate`] if the text is not a calendar date.
pub fn parse_observation_date(raw: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| CoreError::InvalidDate(raw.to_owned()))
}

pub(super) fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() { DEFAULT_OBSERVATION_NAME.to_owned() } else { trimmed.to_owned() }
}

pub(super) fn normalize_description(description: Option<String>) -> Option<String> {
    description.map(|d| d.trim().to_owned()).filter(|d| !d.is_empty())
}

/// A submitted observation form, before an id and creation time are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationDraft {
    name: String,
    coordinate: Coordinate,
    description: Option<String>,
    date: Option<NaiveDate>,
    image_uri: Option<String>,
}

impl ObservationDraft {
    #[must_use]
    pub fn new(name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self { name: name.into(), coordinate, description: None, date: None, image_uri: None }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn maybe_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    #[must_use]
    pub const fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub const fn maybe_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date;
        self
    }

    #[must_use]
    pub fn image_uri(mut self, image_uri: impl Into<String>) -> Self {
        self.image_uri = Some(image_uri.into());
        self
    }

    #[must_use]
    pub fn maybe_image_uri(mut self, image_uri: Option<String>) -> Self {
        self.image_uri = image_uri;
        self
    }

    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Finalizes the draft. A blank name becomes the default label and a
    /// missing date becomes the UTC calendar day of `created_at`.
    #[must_use]
    pub fn into_observation(self, id: String, created_at: DateTime<Utc>) -> Observation {
        Observation {
            id,
            name: normalize_name(&self.name),
            description: normalize_description(self.description),
            date: self
                .date
                .unwrap_or_else(|| created_at.date_naive())
                .format(DATE_FORMAT)
                .to_string(),
            latitude: self.coordinate.latitude,
            longitude: self.coordinate.longitude,
            image_uri: self.image_uri.filter(|uri| !uri.trim().is_empty()),
            created_at: created_at.timestamp_millis(),
        }
    }
}

/// Changes to an existing observation. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationEdit {
    pub name: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
}

impl ObservationEdit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    #[must_use]
    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}
