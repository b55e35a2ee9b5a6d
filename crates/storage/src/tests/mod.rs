//! Test utilities and module declarations for storage tests.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;
use wildlog_core::Observation;

use crate::error::{Result, StorageError};
use crate::traits::KeyValueStore;
use crate::{FileKvStore, MemoryKvStore, ObservationStore};

pub fn create_test_observation(id: &str, name: &str) -> Observation {
    Observation {
        id: id.to_owned(),
        name: name.to_owned(),
        description: None,
        date: "2025-09-14".to_owned(),
        latitude: 48.8566,
        longitude: 2.3522,
        image_uri: None,
        created_at: 1_757_808_000_000,
    }
}

pub fn create_memory_store() -> (ObservationStore, Arc<MemoryKvStore>) {
    let kv = Arc::new(MemoryKvStore::new());
    (ObservationStore::with_default_key(kv.clone()), kv)
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_file_store() -> (ObservationStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let kv = FileKvStore::new(temp_dir.path()).unwrap();
    (ObservationStore::with_default_key(Arc::new(kv)), temp_dir)
}

/// Wraps a memory store and fails reads or writes on demand.
#[derive(Debug, Default)]
pub struct FlakyKvStore {
    pub inner: MemoryKvStore,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub writes: AtomicUsize,
}

impl FlakyKvStore {
    fn injected(op: &str) -> StorageError {
        StorageError::Io {
            context: format!("injected {op} failure"),
            source: io::Error::other("disk unavailable"),
        }
    }
}

#[async_trait]
impl KeyValueStore for FlakyKvStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::injected("read"));
        }
        self.inner.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::injected("write"));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::injected("remove"));
        }
        self.inner.remove_item(key).await
    }
}

mod backend_tests;
mod observation_store_tests;
