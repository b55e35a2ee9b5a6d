//! In-process platform used by tests and the command line.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{mpsc, watch};
use wildlog_core::constants::WATCH_CHANNEL_CAPACITY;
use wildlog_core::{
    Accuracy, Coordinate, FixedPosition, LocationSample, PermissionStatus, WatchOptions,
};

use crate::error::LocationError;
use crate::platform::LocationPlatform;

/// Scripted [`LocationPlatform`].
///
/// Permission starts at the given status; prompting only changes it while it
/// is undetermined. One-shot fixes return the configured position. A watch
/// replays the configured track, or repeats the fixed position once and then
/// idles until the subscriber goes away.
#[derive(Debug)]
pub struct SimulatedPlatform {
    status: Mutex<PermissionStatus>,
    prompt_answer: PermissionStatus,
    position: Mutex<Option<FixedPosition>>,
    track: Vec<Coordinate>,
    prompts: AtomicUsize,
    settings_opened: AtomicUsize,
    active_watches: Arc<watch::Sender<usize>>,
}

impl SimulatedPlatform {
    #[must_use]
    pub fn new(status: PermissionStatus) -> Self {
        let (active_watches, _) = watch::channel(0);
        Self {
            status: Mutex::new(status),
            prompt_answer: PermissionStatus::Denied,
            position: Mutex::new(None),
            track: Vec::new(),
            prompts: AtomicUsize::new(0),
            settings_opened: AtomicUsize::new(0),
            active_watches: Arc::new(active_watches),
        }
    }

    /// Platform for hosts without a position source: permission granted,
    /// fixes from `position` when given.
    #[must_use]
    pub fn granted(position: Option<FixedPosition>) -> Self {
        let platform = Self::new(PermissionStatus::Granted);
        platform.set_position(position);
        platform
    }

    #[must_use]
    pub fn with_position(self, position: FixedPosition) -> Self {
        self.set_position(Some(position));
        self
    }

    #[must_use]
    pub fn with_track(mut self, track: Vec<Coordinate>) -> Self {
        self.track = track;
        self
    }

    /// What the user answers when prompted. Defaults to denied.
    #[must_use]
    pub const fn answer_prompt_with(mut self, answer: PermissionStatus) -> Self {
        self.prompt_answer = answer;
        self
    }

    pub fn set_position(&self, position: Option<FixedPosition>) {
        *self.position.lock().unwrap_or_else(PoisonError::into_inner) = position;
    }

    pub fn set_permission(&self, status: PermissionStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }

    /// Number of times the user was actually prompted.
    #[must_use]
    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn settings_opened(&self) -> usize {
        self.settings_opened.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn active_watches(&self) -> usize {
        *self.active_watches.borrow()
    }

    /// Resolves once exactly `count` watch subscriptions are open.
    pub async fn wait_for_active_watches(&self, count: usize) {
        let mut rx = self.active_watches.subscribe();
        let _ = rx.wait_for(|n| *n == count).await;
    }

    /// Resolves once every watch subscription has been released.
    pub async fn wait_for_no_watchers(&self) {
        self.wait_for_active_watches(0).await;
    }

    fn current_status(&self) -> PermissionStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_fixed(&self) -> Option<FixedPosition> {
        *self.position.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn sample_at(coordinate: Coordinate, accuracy: Option<f64>) -> LocationSample {
    LocationSample::new(
        coordinate.latitude,
        coordinate.longitude,
        accuracy,
        Utc::now().timestamp_millis(),
    )
}

#[async_trait]
impl LocationPlatform for SimulatedPlatform {
    async fn permission_status(&self) -> Result<PermissionStatus, LocationError> {
        Ok(self.current_status())
    }

    async fn request_permission(&self) -> Result<PermissionStatus, LocationError> {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        if *status == PermissionStatus::Undetermined {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            *status = self.prompt_answer;
        }
        Ok(*status)
    }

    async fn current_position(&self, _accuracy: Accuracy) -> Result<LocationSample, LocationError> {
        if !self.current_status().is_granted() {
            return Err(LocationError::PermissionDenied);
        }
        let fixed = self
            .current_fixed()
            .ok_or_else(|| LocationError::Unavailable("no simulated position".to_owned()))?;
        Ok(sample_at(fixed.coordinate, fixed.accuracy))
    }

    async fn watch_position(
        &self,
        options: WatchOptions,
    ) -> Result<mpsc::Receiver<LocationSample>, LocationError> {
        if !self.current_status().is_granted() {
            return Err(LocationError::PermissionDenied);
        }

        let fixed = self.current_fixed();
        let track = if self.track.is_empty() {
            fixed.map(|f| vec![f.coordinate]).unwrap_or_default()
        } else {
            self.track.clone()
        };
        let accuracy = fixed.and_then(|f| f.accuracy);
        let idle_after_track = self.track.is_empty();
        let interval = Duration::from_millis(options.time_interval_ms);

        let (tx, rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);
        let active = Arc::clone(&self.active_watches);
        active.send_modify(|n| *n += 1);

        tokio::spawn(async move {
            let mut last: Option<Coordinate> = None;
            for point in track {
                if last.is_some_and(|prev| prev.distance_to(&point) < options.distance_interval_m) {
                    continue;
                }
                if last.is_some() {
                    tokio::time::sleep(interval).await;
                }
                if tx.send(sample_at(point, accuracy)).await.is_err() {
                    break;
                }
                last = Some(point);
            }
            if idle_after_track {
                tx.closed().await;
            }
            drop(tx);
            active.send_modify(|n| *n = n.saturating_sub(1));
        });

        Ok(rx)
    }

    fn open_settings(&self) -> Result<(), LocationError> {
        self.settings_opened.fetch_add(1, Ordering::SeqCst);
        tracing::info!("Simulated platform asked to open location settings");
        Ok(())
    }
}
