#![expect(clippy::unwrap_used, reason = "test code")]

use std::sync::Arc;

use tempfile::TempDir;
use wildlog_core::{BackendKind, Settings};

use super::create_test_observation;
use crate::traits::KeyValueStore;
use crate::{KvBackend, ObservationStore};

fn settings_for(kind: BackendKind, temp_dir: &TempDir) -> Settings {
    Settings { data_dir: temp_dir.path().to_path_buf(), backend: kind, ..Settings::default() }
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_open_each_backend_kind() {
    let temp_dir = TempDir::new().unwrap();
    for kind in [BackendKind::Memory, BackendKind::File, BackendKind::Sqlite] {
        let backend = KvBackend::open(&settings_for(kind, &temp_dir)).unwrap();
        assert_eq!(backend.kind(), kind);

        backend.set_item("@probe", "[]").await.unwrap();
        assert_eq!(backend.get_item("@probe").await.unwrap().as_deref(), Some("[]"));
        backend.remove_item("@probe").await.unwrap();
        assert_eq!(backend.get_item("@probe").await.unwrap(), None);
    }
}

#[tokio::test]
async fn test_file_backend_layout() {
    let temp_dir = TempDir::new().unwrap();
    let backend = KvBackend::open(&settings_for(BackendKind::File, &temp_dir)).unwrap();
    backend.set_item("@observations_v1", "[]").await.unwrap();
    assert!(temp_dir.path().join("kv").join("%40observations_v1.json").is_file());
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_sqlite_backend_persists_observations_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_for(BackendKind::Sqlite, &temp_dir);

    {
        let kv = Arc::new(KvBackend::open(&settings).unwrap());
        let store = ObservationStore::with_default_key(kv);
        store.save(&create_test_observation("obs-1", "Beaver")).await.unwrap();
        store.save(&create_test_observation("obs-2", "Muskrat")).await.unwrap();
    }

    let store = ObservationStore::with_default_key(Arc::new(KvBackend::open(&settings).unwrap()));
    let ids: Vec<String> = store.load().await.into_iter().map(|o| o.id).collect();
    assert_eq!(ids, vec!["obs-2", "obs-1"]);
}

#[tokio::test]
async fn test_memory_backend_is_not_shared_between_instances() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_for(BackendKind::Memory, &temp_dir);
    let first = KvBackend::open(&settings).unwrap();
    first.set_item("@k", "v").await.unwrap();
    let second = KvBackend::open(&settings).unwrap();
    assert_eq!(second.get_item("@k").await.unwrap(), None);
}
