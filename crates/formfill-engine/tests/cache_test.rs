use async_trait::async_trait;
use formfill_common::protocol::{CachedTemplate, FieldShape};
use formfill_engine::cache::{
    FileStore, MemoryStore, StoreError, TemplateCache, TemplateMap, TemplateStore,
};
use formfill_engine::config::CacheConfig;
use std::time::{SystemTime, UNIX_EPOCH};

fn shape(selector: &str, label: &str) -> FieldShape {
    FieldShape {
        selector: selector.to_string(),
        label: label.to_string(),
        field_type: "text".to_string(),
        options: None,
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

#[tokio::test]
async fn test_put_get_round_trip() {
    let store = MemoryStore::new();
    let cache = TemplateCache::new(Box::new(store.clone()));

    let fields = vec![shape("#name", "Full name"), shape("#email", "Email")];
    cache.put("greenhouse:application", fields.clone()).await;

    let template = cache.get("greenhouse:application").await.expect("cache hit");
    assert_eq!(template.fields, fields);
    assert_eq!(template.fail_count, 0);

    // Nothing runtime-only may survive into persistence.
    let json = serde_json::to_string(&store.snapshot()).unwrap();
    assert!(!json.contains("suggested_value"));
    assert!(!json.contains("confidence"));
    assert!(!json.contains("note"));
}

#[tokio::test]
async fn test_get_unknown_key_is_miss() {
    let cache = TemplateCache::new(Box::new(MemoryStore::new()));
    assert!(cache.get("lever:application").await.is_none());
}

#[tokio::test]
async fn test_ttl_expiry_removes_entry_on_read() {
    let store = MemoryStore::new();
    let cache = TemplateCache::new(Box::new(store.clone()));

    store.insert(CachedTemplate {
        key: "lever:application".into(),
        fields: vec![shape("#name", "Name")],
        created_at: unix_now() - 31 * 24 * 60 * 60,
        fail_count: 0,
    });

    assert!(cache.get("lever:application").await.is_none());
    // The read itself performed the deletion.
    assert!(!store.snapshot().contains_key("lever:application"));
}

#[tokio::test]
async fn test_entry_within_ttl_survives() {
    let store = MemoryStore::new();
    let cache = TemplateCache::new(Box::new(store.clone()));

    store.insert(CachedTemplate {
        key: "lever:application".into(),
        fields: vec![shape("#name", "Name")],
        created_at: unix_now() - 29 * 24 * 60 * 60,
        fail_count: 2,
    });

    assert!(cache.get("lever:application").await.is_some());
}

#[tokio::test]
async fn test_fail_threshold_evicts_immediately() {
    let store = MemoryStore::new();
    let cache = TemplateCache::new(Box::new(store.clone()));

    cache.put("workday:application", vec![shape("#a", "A")]).await;

    cache.increment_fail("workday:application").await;
    cache.increment_fail("workday:application").await;
    assert!(cache.get("workday:application").await.is_some());

    cache.increment_fail("workday:application").await;
    // Deleted at the moment the threshold was reached, before any read.
    assert!(!store.snapshot().contains_key("workday:application"));
    assert!(cache.get("workday:application").await.is_none());
}

#[tokio::test]
async fn test_reset_between_increments_prevents_eviction() {
    let store = MemoryStore::new();
    let cache = TemplateCache::new(Box::new(store.clone()));

    cache.put("workday:application", vec![shape("#a", "A")]).await;

    cache.increment_fail("workday:application").await;
    cache.increment_fail("workday:application").await;
    cache.reset_fail("workday:application").await;
    cache.increment_fail("workday:application").await;
    cache.increment_fail("workday:application").await;

    let template = cache.get("workday:application").await.expect("still cached");
    assert_eq!(template.fail_count, 2);
}

#[tokio::test]
async fn test_put_overwrites_and_resets_failures() {
    let store = MemoryStore::new();
    let cache = TemplateCache::new(Box::new(store.clone()));

    cache.put("hh:application", vec![shape("#old", "Old")]).await;
    cache.increment_fail("hh:application").await;

    cache.put("hh:application", vec![shape("#new", "New")]).await;

    let template = cache.get("hh:application").await.unwrap();
    assert_eq!(template.fail_count, 0);
    assert_eq!(template.fields, vec![shape("#new", "New")]);
}

#[tokio::test]
async fn test_empty_shape_is_not_cached() {
    let store = MemoryStore::new();
    let cache = TemplateCache::new(Box::new(store.clone()));

    cache.put("hh:application", vec![]).await;
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_invalidate_and_clear() {
    let store = MemoryStore::new();
    let cache = TemplateCache::new(Box::new(store.clone()));

    cache.put("a:application", vec![shape("#a", "A")]).await;
    cache.put("b:application", vec![shape("#b", "B")]).await;

    cache.invalidate("a:application").await;
    assert!(cache.get("a:application").await.is_none());
    assert!(cache.get("b:application").await.is_some());

    cache.clear().await;
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_custom_fail_threshold() {
    let store = MemoryStore::new();
    let config = CacheConfig {
        fail_threshold: 1,
        ..Default::default()
    };
    let cache = TemplateCache::with_config(Box::new(store.clone()), &config);

    cache.put("a:application", vec![shape("#a", "A")]).await;
    cache.increment_fail("a:application").await;
    assert!(cache.get("a:application").await.is_none());
}

struct FailingStore;

#[async_trait]
impl TemplateStore for FailingStore {
    async fn load(&self) -> Result<TemplateMap, StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk gone")))
    }

    async fn save(&self, _map: &TemplateMap) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk gone")))
    }
}

#[tokio::test]
async fn test_store_errors_degrade_to_miss() {
    let cache = TemplateCache::new(Box::new(FailingStore));

    // Every operation is best-effort: nothing panics, nothing propagates.
    assert!(cache.get("greenhouse:application").await.is_none());
    cache.put("greenhouse:application", vec![shape("#a", "A")]).await;
    cache.increment_fail("greenhouse:application").await;
    cache.reset_fail("greenhouse:application").await;
    cache.invalidate("greenhouse:application").await;
    cache.clear().await;
    assert!(cache.get("greenhouse:application").await.is_none());
}

#[tokio::test]
async fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("templates.json");

    let cache = TemplateCache::new(Box::new(FileStore::new(&path)));
    cache
        .put("greenhouse:application", vec![shape("#name", "Name")])
        .await;

    // A second store over the same file sees the entry.
    let reopened = TemplateCache::new(Box::new(FileStore::new(&path)));
    let template = reopened.get("greenhouse:application").await.unwrap();
    assert_eq!(template.fields, vec![shape("#name", "Name")]);
}

#[tokio::test]
async fn test_file_store_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("does-not-exist.json"));
    assert!(store.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_file_store_corrupt_file_is_miss() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("templates.json");
    tokio::fs::write(&path, "{ not json").await.unwrap();

    let cache = TemplateCache::new(Box::new(FileStore::new(&path)));
    assert!(cache.get("greenhouse:application").await.is_none());
}
