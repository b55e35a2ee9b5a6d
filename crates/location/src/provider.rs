//! Permission and position state for the map screen.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use wildlog_core::{Accuracy, LocationSample, PermissionStatus, WatchOptions};

use crate::error::LocationError;
use crate::platform::LocationPlatform;

/// What the screen needs to render the location part of the UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationSnapshot {
    /// `None` until the platform has been asked
    pub permission: Option<PermissionStatus>,
    /// Latest fix, superseded by every new one
    pub sample: Option<LocationSample>,
    /// True until the first permission check (and fix, if granted) completes
    pub loading: bool,
    pub watching: bool,
}

impl Default for LocationSnapshot {
    fn default() -> Self {
        Self { permission: None, sample: None, loading: true, watching: false }
    }
}

impl LocationSnapshot {
    #[must_use]
    pub fn is_granted(&self) -> bool {
        self.permission.is_some_and(|p| p.is_granted())
    }
}

/// Wraps a [`LocationPlatform`] and keeps the latest permission and fix.
///
/// At most one watch subscription is active. It is released by
/// [`stop_watching`](Self::stop_watching), by starting a new one, or when the
/// provider is dropped.
pub struct LocationProvider {
    platform: Arc<dyn LocationPlatform>,
    watch_options: WatchOptions,
    state: Arc<watch::Sender<LocationSnapshot>>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for LocationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationProvider")
            .field("watch_options", &self.watch_options)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl LocationProvider {
    #[must_use]
    pub fn new(platform: Arc<dyn LocationPlatform>, watch_options: WatchOptions) -> Self {
        let (state, _) = watch::channel(LocationSnapshot::default());
        Self { platform, watch_options, state: Arc::new(state), watcher: Mutex::new(None) }
    }

    #[must_use]
    pub fn snapshot(&self) -> LocationSnapshot {
        *self.state.borrow()
    }

    /// Receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LocationSnapshot> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn latest_sample(&self) -> Option<LocationSample> {
        self.state.borrow().sample
    }

    /// Reads the existing permission without prompting, then fetches a fix if
    /// it is granted. Always leaves `loading` false.
    pub async fn initialize(&self) {
        match self.platform.permission_status().await {
            Ok(status) => {
                self.state.send_modify(|s| s.permission = Some(status));
                if status.is_granted() {
                    self.get_current_location().await;
                    return;
                }
                tracing::info!(permission = %status, "Location permission not granted");
            },
            Err(e) => tracing::warn!("Failed to read location permission: {}", e),
        }
        self.state.send_modify(|s| s.loading = false);
    }

    /// Prompts if needed. A platform failure is logged and reported as
    /// undetermined; the stored status is left unchanged.
    pub async fn request_permission(&self) -> PermissionStatus {
        match self.platform.request_permission().await {
            Ok(status) => {
                self.state.send_modify(|s| s.permission = Some(status));
                status
            },
            Err(e) => {
                tracing::warn!("Location permission request failed: {}", e);
                PermissionStatus::Undetermined
            },
        }
    }

    /// One-shot high-accuracy fix. Returns `None` without a fix when
    /// permission is missing or the platform fails; the previous sample stays.
    pub async fn get_current_location(&self) -> Option<LocationSample> {
        if !self.request_permission().await.is_granted() {
            self.state.send_modify(|s| s.loading = false);
            return None;
        }

        let result = self.platform.current_position(Accuracy::High).await;
        self.state.send_modify(|s| {
            if let Ok(sample) = &result {
                s.sample = Some(*sample);
            }
            s.loading = false;
        });
        match result {
            Ok(sample) => {
                tracing::debug!(
                    latitude = sample.latitude,
                    longitude = sample.longitude,
                    accuracy = ?sample.accuracy,
                    "Location fix"
                );
                Some(sample)
            },
            Err(e) => {
                tracing::warn!("Failed to get current location: {}", e);
                None
            },
        }
    }

    /// Subscribe to continuous updates. Returns `Ok(false)` when permission is
    /// not granted. An existing subscription is replaced.
    ///
    /// # Errors
    /// Returns error if the platform refuses to start the watch.
    pub async fn start_watching(&self) -> Result<bool, LocationError> {
        if !self.request_permission().await.is_granted() {
            return Ok(false);
        }

        let mut rx = self.platform.watch_position(self.watch_options).await?;
        self.state.send_modify(|s| s.watching = true);
        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            while let Some(sample) = rx.recv().await {
                state.send_modify(|s| s.sample = Some(sample));
            }
            state.send_modify(|s| s.watching = false);
            tracing::debug!("Location watch stream ended");
        });

        let previous = self.lock_watcher().replace(handle);
        if let Some(previous) = previous {
            previous.abort();
            tracing::debug!("Replaced existing location watch");
        }
        tracing::info!(
            distance_interval_m = self.watch_options.distance_interval_m,
            time_interval_ms = self.watch_options.time_interval_ms,
            "Started location watch"
        );
        Ok(true)
    }

    /// Release the watch subscription. Returns `false` if none was active.
    pub fn stop_watching(&self) -> bool {
        let Some(handle) = self.lock_watcher().take() else {
            return false;
        };
        handle.abort();
        self.state.send_modify(|s| s.watching = false);
        tracing::info!("Stopped location watch");
        true
    }

    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.lock_watcher().as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Remediation for the unauthorized screen.
    ///
    /// # Errors
    /// Returns error if the platform cannot open its settings page.
    pub fn open_settings(&self) -> Result<(), LocationError> {
        self.platform.open_settings()
    }

    fn lock_watcher(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.watcher.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for LocationProvider {
    fn drop(&mut self) {
        if let Some(handle) = self.lock_watcher().take() {
            handle.abort();
        }
    }
}
