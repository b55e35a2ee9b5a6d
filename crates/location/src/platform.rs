//! Host geolocation adapter.

use async_trait::async_trait;
use tokio::sync::mpsc;
use wildlog_core::{Accuracy, LocationSample, PermissionStatus, WatchOptions};

use crate::error::LocationError;

/// Bridge to the operating system's location services.
///
/// Implementations wrap the platform API one-to-one and keep no state of their
/// own beyond what the OS holds.
#[async_trait]
pub trait LocationPlatform: Send + Sync {
    /// Current foreground permission, without prompting.
    async fn permission_status(&self) -> Result<PermissionStatus, LocationError>;

    /// Prompt for foreground permission if the user has not decided yet.
    async fn request_permission(&self) -> Result<PermissionStatus, LocationError>;

    /// One-shot fix.
    async fn current_position(&self, accuracy: Accuracy) -> Result<LocationSample, LocationError>;

    /// Start continuous updates. The subscription lives as long as the
    /// returned receiver; dropping it must release the platform watch.
    async fn watch_position(
        &self,
        options: WatchOptions,
    ) -> Result<mpsc::Receiver<LocationSample>, LocationError>;

    /// Open the system settings page for this app.
    fn open_settings(&self) -> Result<(), LocationError>;
}
