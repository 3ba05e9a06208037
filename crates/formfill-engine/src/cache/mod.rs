pub mod store;

pub use store::{FileStore, MemoryStore, StoreError, TemplateMap, TemplateStore};

use crate::config::CacheConfig;
use formfill_common::protocol::{CachedTemplate, FieldShape};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Persistent cache of learned field layouts, one entry per ATS platform.
///
/// The cache is the sole writer of [`CachedTemplate`] entries. Eviction is
/// lazy: a stale entry (TTL-expired or at the failure threshold) is deleted
/// by the read that observed it, except that `increment_fail` deletes at the
/// threshold immediately so no further read can see an untrustworthy entry.
///
/// All operations are best-effort. Storage errors are logged and degrade to
/// "cache miss / nothing persisted"; they never reach the caller.
pub struct TemplateCache {
    store: Box<dyn TemplateStore>,
    ttl: Duration,
    fail_threshold: u32,
}

impl TemplateCache {
    pub fn new(store: Box<dyn TemplateStore>) -> Self {
        Self::with_config(store, &CacheConfig::default())
    }

    pub fn with_config(store: Box<dyn TemplateStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            ttl: config.ttl(),
            fail_threshold: config.fail_threshold,
        }
    }

    /// Look up the template for a platform key. Returns `None` if absent or
    /// stale; a stale entry is removed as a side effect of this call.
    pub async fn get(&self, key: &str) -> Option<CachedTemplate> {
        let mut map = self.load().await;
        let template = map.get(key)?;

        if self.is_stale(template) {
            debug!(key, fail_count = template.fail_count, "evicting stale template");
            map.remove(key);
            self.persist(&map).await;
            return None;
        }

        Some(template.clone())
    }

    /// Store a freshly-learned shape, overwriting any existing entry for the
    /// key and resetting its failure count. An empty shape is not worth
    /// remembering and is ignored.
    pub async fn put(&self, key: &str, fields: Vec<FieldShape>) {
        if fields.is_empty() {
            warn!(key, "refusing to cache an empty field shape");
            return;
        }

        let mut map = self.load().await;
        map.insert(
            key.to_string(),
            CachedTemplate {
                key: key.to_string(),
                fields,
                created_at: unix_now(),
                fail_count: 0,
            },
        );
        self.persist(&map).await;
    }

    /// Penalize the entry. At the failure threshold the entry is deleted on
    /// the spot, not left for the next read to clean up.
    pub async fn increment_fail(&self, key: &str) {
        let mut map = self.load().await;
        let Some(template) = map.get_mut(key) else {
            return;
        };

        template.fail_count += 1;
        if template.fail_count >= self.fail_threshold {
            debug!(key, "failure threshold reached, deleting template");
            map.remove(key);
        }
        self.persist(&map).await;
    }

    /// Called when a cached template produced a successful fill.
    pub async fn reset_fail(&self, key: &str) {
        let mut map = self.load().await;
        let Some(template) = map.get_mut(key) else {
            return;
        };
        template.fail_count = 0;
        self.persist(&map).await;
    }

    /// Explicit removal of one entry.
    pub async fn invalidate(&self, key: &str) {
        let mut map = self.load().await;
        if map.remove(key).is_some() {
            self.persist(&map).await;
        }
    }

    /// User-triggered cache reset.
    pub async fn clear(&self) {
        self.persist(&TemplateMap::new()).await;
    }

    fn is_stale(&self, template: &CachedTemplate) -> bool {
        let age = unix_now().saturating_sub(template.created_at);
        age > self.ttl.as_secs()
            || template.fail_count >= self.fail_threshold
            || template.fields.is_empty()
    }

    async fn load(&self) -> TemplateMap {
        match self.store.load().await {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "template store unreadable, treating as empty");
                TemplateMap::new()
            }
        }
    }

    async fn persist(&self, map: &TemplateMap) {
        if let Err(e) = self.store.save(map).await {
            warn!(error = %e, "failed to persist template cache");
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
