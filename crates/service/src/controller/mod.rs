use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use wildlog_core::{Coordinate, Observation, ObservationDraft, ObservationEdit};
use wildlog_location::LocationProvider;
use wildlog_storage::ObservationStore;

use crate::error::ServiceError;
use crate::screen::ScreenState;
use crate::share::share_text;

#[derive(Debug, Default)]
struct AddMode {
    active: bool,
    pending: Option<Coordinate>,
}

/// Composition root for the map screen.
///
/// The list lock is held across every store write, so the in-memory list only
/// changes after the persisted one has. Edits and deletes go through the
/// store's own read of the list, never through the in-memory copy.
#[derive(Debug)]
pub struct ObservationController {
    store: ObservationStore,
    location: LocationProvider,
    observations: tokio::sync::Mutex<Vec<Observation>>,
    add_mode: Mutex<AddMode>,
}

impl ObservationController {
    #[must_use]
    pub fn new(store: ObservationStore, location: LocationProvider) -> Self {
        Self {
            store,
            location,
            observations: tokio::sync::Mutex::new(Vec::new()),
            add_mode: Mutex::new(AddMode::default()),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &ObservationStore {
        &self.store
    }

    #[must_use]
    pub const fn location(&self) -> &LocationProvider {
        &self.location
    }

    /// Permission check (and first fix, if granted) followed by a list load.
    pub async fn initialize(&self) {
        self.location.initialize().await;
        let count = self.refresh().await;
        tracing::info!(
            screen = %self.screen_state(),
            observations = count,
            "Observation screen initialized"
        );
    }

    #[must_use]
    pub fn screen_state(&self) -> ScreenState {
        ScreenState::from_snapshot(&self.location.snapshot())
    }

    /// Reloads the in-memory list from the store. Never fails: an unreadable
    /// store shows as an empty list.
    pub async fn refresh(&self) -> usize {
        let mut observations = self.observations.lock().await;
        *observations = self.store.load().await;
        observations.len()
    }

    /// Newest first.
    pub async fn observations(&self) -> Vec<Observation> {
        self.observations.lock().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Observation> {
        self.observations.lock().await.iter().find(|o| o.id == id).cloned()
    }

    /// Flips add mode and returns the new state. Leaving add mode drops any
    /// pending coordinate.
    pub fn toggle_add_mode(&self) -> bool {
        let mut mode = self.lock_add_mode();
        mode.active = !mode.active;
        if !mode.active {
            mode.pending = None;
        }
        mode.active
    }

    #[must_use]
    pub fn is_add_mode(&self) -> bool {
        self.lock_add_mode().active
    }

    /// Map tap. Outside add mode the tap is ignored and `false` returned;
    /// inside it the coordinate becomes pending and add mode ends.
    pub fn handle_map_press(&self, coordinate: Coordinate) -> bool {
        let mut mode = self.lock_add_mode();
        if !mode.active {
            return false;
        }
        mode.active = false;
        mode.pending = Some(coordinate);
        tracing::debug!(%coordinate, "Pending observation position set");
        true
    }

    /// Coordinate picked by the last accepted map tap, awaiting the form.
    #[must_use]
    pub fn pending_coordinate(&self) -> Option<Coordinate> {
        self.lock_add_mode().pending
    }

    /// Form dismissed without saving.
    pub fn cancel_pending(&self) -> Option<Coordinate> {
        self.lock_add_mode().pending.take()
    }

    /// Assigns an id and creation time, persists, then prepends in memory.
    /// On a store failure the in-memory list is left as it was. A pending
    /// map-tap coordinate is consumed when the draft was placed there.
    pub async fn add_observation(
        &self,
        draft: ObservationDraft,
    ) -> Result<Observation, ServiceError> {
        let coordinate = draft.coordinate();
        let observation = self.persist_draft(draft).await?;
        let mut mode = self.lock_add_mode();
        if mode.pending == Some(coordinate) {
            mode.pending = None;
        }
        Ok(observation)
    }

    /// Adds at the latest known position, taking a fresh fix when none is
    /// known yet. `build` turns the position into the submitted form. Any
    /// pending map-tap coordinate is left alone.
    pub async fn add_at_current_location<F>(&self, build: F) -> Result<Observation, ServiceError>
    where
        F: FnOnce(Coordinate) -> ObservationDraft + Send,
    {
        let sample = match self.location.latest_sample() {
            Some(sample) => sample,
            None => self.location.get_current_location().await.ok_or(ServiceError::NoLocation)?,
        };
        let coordinate = sample.coordinate()?;
        self.persist_draft(build(coordinate)).await
    }

    /// Applies the edit to the stored record, then swaps the stored list in.
    /// The store re-reads its list for the edit, so records this controller
    /// never loaded are kept. An empty edit writes nothing.
    pub async fn edit_observation(
        &self,
        id: &str,
        edit: &ObservationEdit,
    ) -> Result<Observation, ServiceError> {
        let mut observations = self.observations.lock().await;
        if edit.is_empty() {
            let stored = self.store.try_load().await?;
            let found = stored.iter().find(|o| o.id == id).cloned();
            *observations = stored;
            return found.ok_or_else(|| ServiceError::NotFound(id.to_owned()));
        }

        let Some((updated, stored)) = self.store.update_by_id(id, edit).await? else {
            return Err(ServiceError::NotFound(id.to_owned()));
        };
        *observations = stored;

        tracing::info!(id = %id, "Observation edited");
        Ok(updated)
    }

    /// Removes every stored record carrying `id` and returns how many were
    /// removed. The in-memory list is replaced by what the store now holds.
    pub async fn delete_observation(&self, id: &str) -> Result<usize, ServiceError> {
        let mut observations = self.observations.lock().await;
        let (removed, stored) = self.store.remove_by_id(id).await?;
        *observations = stored;
        if removed == 0 {
            return Err(ServiceError::NotFound(id.to_owned()));
        }

        tracing::info!(id = %id, removed, "Observation deleted");
        Ok(removed)
    }

    pub async fn share_message(&self, id: &str) -> Result<String, ServiceError> {
        self.get(id)
            .await
            .map(|o| share_text(&o))
            .ok_or_else(|| ServiceError::NotFound(id.to_owned()))
    }

    /// Remediation offered on the unauthorized screen.
    pub fn open_settings(&self) -> Result<(), ServiceError> {
        Ok(self.location.open_settings()?)
    }

    async fn persist_draft(&self, draft: ObservationDraft) -> Result<Observation, ServiceError> {
        let mut observations = self.observations.lock().await;
        let observation = draft.into_observation(Observation::new_id(), Utc::now());
        self.store.save(&observation).await?;
        observations.insert(0, observation.clone());
        drop(observations);

        tracing::info!(
            id = %observation.id,
            name = %observation.name,
            "Observation added"
        );
        Ok(observation)
    }

    fn lock_add_mode(&self) -> std::sync::MutexGuard<'_, AddMode> {
        self.add_mode.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
