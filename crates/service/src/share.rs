use std::fmt::Write as _;

use wildlog_core::Observation;

/// Text handed to the host share sheet.
#[must_use]
pub fn share_text(observation: &Observation) -> String {
    let mut text = format!(
        "Wildlife observation: {}\nDate: {}\nLocation: {:.5}, {:.5}",
        observation.name,
        observation.date,
        observation.latitude,
        observation.longitude,
    );
    if let Some(description) = &observation.description {
        let _ = write!(text, "\n\n{description}");
    }
    text
}
