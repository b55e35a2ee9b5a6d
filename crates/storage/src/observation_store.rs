//! The observation list, persisted as one JSON array under one key.
//!
//! Read path is fail-soft: a missing key, an empty value or an unparseable
//! payload all load as an empty list. Write path is fail-loud. Every write is
//! a full read-modify-write of the whole list, serialized by an in-process
//! mutex so overlapping saves cannot drop each other's records.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use wildlog_core::{Observation, ObservationEdit};
use wildlog_core::constants::OBSERVATIONS_KEY;

use crate::error::Result;
use crate::traits::KeyValueStore;

/// Called with the storage key and parse error whenever a stored payload is
/// discarded as corrupt.
pub type CorruptionHook = Arc<dyn Fn(&str, &serde_json::Error) + Send + Sync>;

pub struct ObservationStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    write_lock: Mutex<()>,
    on_corrupt: Option<CorruptionHook>,
}

impl fmt::Debug for ObservationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservationStore")
            .field("key", &self.key)
            .field("on_corrupt", &self.on_corrupt.is_some())
            .finish_non_exhaustive()
    }
}

impl ObservationStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self { kv, key: key.into(), write_lock: Mutex::new(()), on_corrupt: None }
    }

    /// Store under the default `@observations_v1` key.
    #[must_use]
    pub fn with_default_key(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::new(kv, OBSERVATIONS_KEY)
    }

    #[must_use]
    pub fn with_corruption_hook(mut self, hook: CorruptionHook) -> Self {
        self.on_corrupt = Some(hook);
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// All saved observations, newest first. Never fails: backend read errors
    /// are logged and reported as an empty list.
    pub async fn load(&self) -> Vec<Observation> {
        match self.read_list().await {
            Ok(list) => list,
            Err(e) => {
                tracing::error!(
                    key = %self.key,
                    "Failed to read observations, showing none: {}",
                    e
                );
                Vec::new()
            },
        }
    }

    /// Like [`load`](Self::load) but surfaces backend read errors. Corrupt
    /// payloads still load as an empty list.
    ///
    /// # Errors
    /// Returns error if the backend read fails.
    pub async fn try_load(&self) -> Result<Vec<Observation>> {
        self.read_list().await
    }

    /// Prepend `observation` and rewrite the list. Records with an existing
    /// `id` are not deduplicated.
    ///
    /// # Errors
    /// Returns error if the current list cannot be read or the new list cannot
    /// be written. Nothing is written when the read fails.
    pub async fn save(&self, observation: &Observation) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut list = self.read_list().await?;
        list.insert(0, observation.clone());
        self.write_list(&list).await?;
        tracing::info!(
            key = %self.key,
            id = %observation.id,
            count = list.len(),
            "Saved observation"
        );
        Ok(())
    }

    /// Replace the stored list. Used after in-memory edits and deletions.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub async fn persist_all(&self, observations: &[Observation]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_list(observations).await?;
        tracing::info!(key = %self.key, count = observations.len(), "Persisted observation list");
        Ok(())
    }

    /// Apply `edit` to every record carrying `id`. The list is re-read under
    /// the write lock, so records missing from any caller's copy survive.
    ///
    /// Returns the first edited record and the list as written, or `None`
    /// when no stored record has that id (nothing is written).
    ///
    /// # Errors
    /// Returns error if the list cannot be read or written.
    pub async fn update_by_id(
        &self,
        id: &str,
        edit: &ObservationEdit,
    ) -> Result<Option<(Observation, Vec<Observation>)>> {
        let _guard = self.write_lock.lock().await;
        let mut list = self.read_list().await?;
        let mut updated = None;
        for observation in list.iter_mut().filter(|o| o.id == id) {
            *observation = observation.with_edit(edit);
            if updated.is_none() {
                updated = Some(observation.clone());
            }
        }
        let Some(updated) = updated else {
            return Ok(None);
        };
        self.write_list(&list).await?;
        tracing::info!(key = %self.key, id = %id, "Updated observation");
        Ok(Some((updated, list)))
    }

    /// Remove every record carrying `id` from the stored list, re-read under
    /// the write lock. Returns the number removed and the list as it now
    /// stands; nothing is written when the count is zero.
    ///
    /// # Errors
    /// Returns error if the list cannot be read or written.
    pub async fn remove_by_id(&self, id: &str) -> Result<(usize, Vec<Observation>)> {
        let _guard = self.write_lock.lock().await;
        let mut list = self.read_list().await?;
        let before = list.len();
        list.retain(|o| o.id != id);
        let removed = before - list.len();
        if removed > 0 {
            self.write_list(&list).await?;
            tracing::info!(key = %self.key, id = %id, removed, "Removed observation");
        }
        Ok((removed, list))
    }

    /// Drop the stored list entirely.
    ///
    /// # Errors
    /// Returns error if the backend delete fails.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.kv.remove_item(&self.key).await?;
        tracing::info!(key = %self.key, "Cleared observations");
        Ok(())
    }

    async fn read_list(&self) -> Result<Vec<Observation>> {
        let Some(raw) = self.kv.get_item(&self.key).await? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Vec<Observation>>(&raw) {
            Ok(list) => Ok(list),
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    bytes = raw.len(),
                    "Stored observations are unreadable, treating as empty: {}",
                    e
                );
                if let Some(hook) = &self.on_corrupt {
                    hook(&self.key, &e);
                }
                Ok(Vec::new())
            },
        }
    }

    async fn write_list(&self, observations: &[Observation]) -> Result<()> {
        let payload = serde_json::to_string(observations)?;
        self.kv.set_item(&self.key, &payload).await
    }
}
