//! Location provider for wildlog
//!
//! [`LocationProvider`] holds the permission state and latest fix that a map
//! screen renders. The host operating system is reached through the
//! [`LocationPlatform`] trait; [`SimulatedPlatform`] stands in for it in tests
//! and on the command line.

mod error;
mod platform;
mod provider;
mod simulated;

pub use error::LocationError;
pub use platform::LocationPlatform;
pub use provider::{LocationProvider, LocationSnapshot};
pub use simulated::SimulatedPlatform;
