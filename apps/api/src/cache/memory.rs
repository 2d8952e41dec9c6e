use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheEntry, CacheError, CachePolicy, ListingStore};

/// Process-local store. Used in tests and when no Redis URL is configured.
///
/// Entries older than `retention` are pruned on every write; the entry being
/// written (which becomes the latest) always survives.
pub struct InMemoryListingStore {
    inner: RwLock<Inner>,
    retention: Duration,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    latest_key: Option<String>,
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::with_retention(CachePolicy::default().fallback)
    }

    pub fn with_retention(retention: Duration) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            retention,
        }
    }
}

impl Default for InMemoryListingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListingStore for InMemoryListingStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.inner.read().await.entries.get(key).cloned())
    }

    async fn put(&self, key: &str, entry: &CacheEntry) -> Result<(), CacheError> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;

        let before = inner.entries.len();
        inner
            .entries
            .retain(|existing, cached| existing == key || cached.age(now) <= self.retention);
        let pruned = before - inner.entries.len();
        if pruned > 0 {
            debug!("Pruned {} expired cache entries", pruned);
        }

        inner.entries.insert(key.to_string(), entry.clone());
        inner.latest_key = Some(key.to_string());
        Ok(())
    }

    async fn latest_key(&self) -> Result<Option<String>, CacheError> {
        Ok(self.inner.read().await.latest_key.clone())
    }
}
