#![expect(clippy::unwrap_used, reason = "test code")]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use wildlog_core::{Observation, ObservationEdit};

use super::{FlakyKvStore, create_file_store, create_memory_store, create_test_observation};
use crate::traits::KeyValueStore;
use crate::{MemoryKvStore, ObservationStore};

#[tokio::test]
async fn test_load_empty_store() {
    let (store, _kv) = create_memory_store();
    assert!(store.load().await.is_empty());
    assert!(store.try_load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_load_empty_string_payload() {
    let (store, kv) = create_memory_store();
    kv.set_item(store.key(), "").await.unwrap();
    assert!(store.load().await.is_empty());
}

#[tokio::test]
async fn test_load_corrupted_payload_returns_empty_and_reports() {
    let kv = Arc::new(MemoryKvStore::new());
    kv.set_item("@observations_v1", "{not json").await.unwrap();
    let reports = Arc::new(AtomicUsize::new(0));
    let seen = reports.clone();
    let store = ObservationStore::with_default_key(kv).with_corruption_hook(Arc::new(
        move |key: &str, _err: &serde_json::Error| {
            assert_eq!(key, "@observations_v1");
            seen.fetch_add(1, Ordering::SeqCst);
        },
    ));

    assert!(store.load().await.is_empty());
    assert!(store.try_load().await.unwrap().is_empty());
    assert_eq!(reports.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_load_wrong_shape_is_treated_as_corrupt() {
    let (store, kv) = create_memory_store();
    kv.set_item(store.key(), r#"{"id":"not-a-list"}"#).await.unwrap();
    assert!(store.load().await.is_empty());
}

#[tokio::test]
async fn test_save_then_load_puts_record_first() {
    let (store, _kv) = create_memory_store();
    store.save(&create_test_observation("obs-1", "Heron")).await.unwrap();
    let obs = create_test_observation("obs-2", "Kingfisher");
    store.save(&obs).await.unwrap();

    let loaded = store.load().await;
    assert_eq!(loaded.first(), Some(&obs));
}

#[tokio::test]
async fn test_sequential_saves_load_newest_first() {
    let (store, _kv) = create_file_store();
    for i in 1..=5 {
        store.save(&create_test_observation(&format!("obs-{i}"), "Deer")).await.unwrap();
    }

    let ids: Vec<String> = store.load().await.into_iter().map(|o| o.id).collect();
    assert_eq!(ids, vec!["obs-5", "obs-4", "obs-3", "obs-2", "obs-1"]);
}

#[tokio::test]
async fn test_order_is_insertion_not_created_at() {
    let (store, _kv) = create_memory_store();
    let mut newer = create_test_observation("newer", "Lynx");
    newer.created_at = 2_000;
    let mut older = create_test_observation("older", "Lynx");
    older.created_at = 1_000;

    store.save(&newer).await.unwrap();
    store.save(&older).await.unwrap();

    let ids: Vec<String> = store.load().await.into_iter().map(|o| o.id).collect();
    assert_eq!(ids, vec!["older", "newer"]);
}

#[tokio::test]
async fn test_same_id_saves_are_not_deduplicated() {
    let (store, _kv) = create_memory_store();
    let first = create_test_observation("dup", "Otter");
    let second = create_test_observation("dup", "River otter");

    // given: two saves issued without awaiting in between
    let (a, b) = tokio::join!(store.save(&first), store.save(&second));
    a.unwrap();
    b.unwrap();

    // then: both land; no dedup by id
    let loaded = store.load().await;
    assert_eq!(loaded.len(), 2);
    assert!(loaded.iter().all(|o| o.id == "dup"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_saves_lose_no_update() {
    let (store, _kv) = create_file_store();
    let store = Arc::new(store);

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store.save(&create_test_observation(&format!("obs-{i}"), "Crow")).await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mut ids: Vec<String> = store.load().await.into_iter().map(|o| o.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 20);
}

#[tokio::test]
async fn test_delete_by_id_keeps_same_named_records() {
    let (store, _kv) = create_memory_store();
    for id in ["a", "b", "c"] {
        store.save(&create_test_observation(id, "Mallard")).await.unwrap();
    }

    let remaining: Vec<Observation> =
        store.load().await.into_iter().filter(|o| o.id != "b").collect();
    store.persist_all(&remaining).await.unwrap();

    let ids: Vec<String> = store.load().await.into_iter().map(|o| o.id).collect();
    assert_eq!(ids, vec!["c", "a"]);
}

#[tokio::test]
async fn test_remove_by_id_rereads_stored_list() {
    let (store, _kv) = create_memory_store();
    for id in ["a", "b", "c"] {
        store.save(&create_test_observation(id, "Mallard")).await.unwrap();
    }

    let (removed, list) = store.remove_by_id("b").await.unwrap();

    assert_eq!(removed, 1);
    let ids: Vec<String> = list.into_iter().map(|o| o.id).collect();
    assert_eq!(ids, vec!["c", "a"]);
    assert_eq!(store.load().await.len(), 2);
}

#[tokio::test]
async fn test_remove_by_id_unknown_writes_nothing() {
    let kv = Arc::new(FlakyKvStore::default());
    let store = ObservationStore::with_default_key(kv.clone());
    store.save(&create_test_observation("a", "Coot")).await.unwrap();

    let (removed, list) = store.remove_by_id("zzz").await.unwrap();

    assert_eq!(removed, 0);
    assert_eq!(list.len(), 1);
    assert_eq!(kv.writes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_update_by_id_edits_in_place() {
    let (store, _kv) = create_memory_store();
    store.save(&create_test_observation("a", "Heron")).await.unwrap();
    store.save(&create_test_observation("b", "Egret")).await.unwrap();

    let edit = ObservationEdit::new().name("Great egret");
    let (updated, list) = store.update_by_id("b", &edit).await.unwrap().unwrap();

    assert_eq!(updated.name, "Great egret");
    assert_eq!(list, store.load().await);
    let names: Vec<String> = list.into_iter().map(|o| o.name).collect();
    assert_eq!(names, vec!["Great egret", "Heron"]);
    assert!(store.update_by_id("zzz", &edit).await.unwrap().is_none());
}

#[tokio::test]
async fn test_read_failure_blocks_update_and_remove() {
    let kv = Arc::new(FlakyKvStore::default());
    let store = ObservationStore::with_default_key(kv.clone());
    store.save(&create_test_observation("a", "Mink")).await.unwrap();
    kv.fail_reads.store(true, Ordering::SeqCst);

    assert!(store.remove_by_id("a").await.is_err());
    assert!(store.update_by_id("a", &ObservationEdit::new().name("x")).await.is_err());
    assert_eq!(kv.writes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_free_text_date_does_not_discard_list() {
    let (store, kv) = create_memory_store();
    let payload = r#"[
        {"id":"b","name":"Heron","date":"2025-09-14","latitude":1.0,"longitude":2.0,"createdAt":2},
        {"id":"a","name":"Owl","date":"14/09/2025","latitude":1.0,"longitude":2.0,"createdAt":1}
    ]"#;
    kv.set_item(store.key(), payload).await.unwrap();

    assert_eq!(store.load().await.len(), 2);
    store.save(&create_test_observation("c", "Lynx")).await.unwrap();

    let loaded = store.load().await;
    let ids: Vec<&str> = loaded.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "b", "a"]);
    assert_eq!(loaded[2].date, "14/09/2025");
}

#[tokio::test]
async fn test_file_round_trip_preserves_fields() {
    let (store, temp_dir) = create_file_store();
    let mut full = create_test_observation("full", "Snowy owl");
    full.description = Some("Perched on a fence post".to_owned());
    full.image_uri = Some("file:///data/cache/owl.jpg".to_owned());
    let bare = create_test_observation("bare", "Raven");
    store.persist_all(&[full.clone(), bare.clone()]).await.unwrap();

    let reopened = ObservationStore::with_default_key(Arc::new(
        crate::FileKvStore::new(temp_dir.path()).unwrap(),
    ));
    let loaded = reopened.load().await;
    assert_eq!(loaded, vec![full, bare]);
    assert_eq!(loaded[1].image_uri, None);
    assert_eq!(loaded[1].description, None);
}

#[tokio::test]
async fn test_stores_with_different_keys_are_isolated() {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
    let field = ObservationStore::new(kv.clone(), "@field");
    let backyard = ObservationStore::new(kv, "@backyard");

    field.save(&create_test_observation("f-1", "Elk")).await.unwrap();

    assert_eq!(field.load().await.len(), 1);
    assert!(backyard.load().await.is_empty());
}

#[tokio::test]
async fn test_save_over_corrupted_payload_starts_fresh() {
    let (store, kv) = create_memory_store();
    kv.set_item(store.key(), "garbage").await.unwrap();

    store.save(&create_test_observation("obs-1", "Hare")).await.unwrap();

    let loaded = store.load().await;
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "obs-1");
}

#[tokio::test]
async fn test_read_failure_is_soft_on_load_and_loud_on_save() {
    let kv = Arc::new(FlakyKvStore::default());
    let store = ObservationStore::with_default_key(kv.clone());
    store.save(&create_test_observation("obs-1", "Badger")).await.unwrap();
    assert_eq!(kv.writes.load(Ordering::SeqCst), 1);

    kv.fail_reads.store(true, Ordering::SeqCst);

    assert!(store.load().await.is_empty());
    assert!(store.try_load().await.is_err());
    assert!(store.save(&create_test_observation("obs-2", "Badger")).await.is_err());
    // then: the failed read never turned into a rewrite
    assert_eq!(kv.writes.load(Ordering::SeqCst), 1);

    kv.fail_reads.store(false, Ordering::SeqCst);
    assert_eq!(store.load().await.len(), 1);
}

#[tokio::test]
async fn test_write_failure_propagates() {
    let kv = Arc::new(FlakyKvStore::default());
    let store = ObservationStore::with_default_key(kv.clone());
    kv.fail_writes.store(true, Ordering::SeqCst);

    let err = store.save(&create_test_observation("obs-1", "Wolf")).await.unwrap_err();
    assert!(err.to_string().contains("injected write failure"));
    assert!(store.persist_all(&[]).await.is_err());
    assert!(store.clear().await.is_err());
    assert!(store.load().await.is_empty());
}

#[tokio::test]
async fn test_clear_removes_list() {
    let (store, kv) = create_memory_store();
    store.save(&create_test_observation("obs-1", "Skunk")).await.unwrap();
    store.clear().await.unwrap();
    assert_eq!(kv.get_item(store.key()).await.unwrap(), None);
    assert!(store.load().await.is_empty());
}
