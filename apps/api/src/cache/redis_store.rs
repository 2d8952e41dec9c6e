//! Redis-backed listing store. Entries are JSON documents under
//! `jobmatch:cache:{key}`; the latest-key pointer lives at `jobmatch:cache:latest`.
//! Both expire after the retention window, since nothing older is ever read.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::cache::{CacheEntry, CacheError, ListingStore};

const KEY_PREFIX: &str = "jobmatch:cache";

#[derive(Clone)]
pub struct RedisListingStore {
    redis: ConnectionManager,
    retention: Duration,
}

impl RedisListingStore {
    pub fn new(redis: ConnectionManager, retention: Duration) -> Self {
        Self { redis, retention }
    }

    fn ttl_seconds(&self) -> u64 {
        expiry_seconds(self.retention)
    }
}

fn entry_key(key: &str) -> String {
    format!("{KEY_PREFIX}:{key}")
}

fn latest_pointer() -> String {
    format!("{KEY_PREFIX}:latest")
}

/// `SET .. EX` rejects zero, so sub-second windows round up to one second.
fn expiry_seconds(retention: Duration) -> u64 {
    retention.as_secs().max(1)
}

#[async_trait]
impl ListingStore for RedisListingStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let mut conn = self.redis.clone();
        let raw: Option<String> = conn.get(entry_key(key)).await?;
        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(CacheError::from)
    }

    async fn put(&self, key: &str, entry: &CacheEntry) -> Result<(), CacheError> {
        let json = serde_json::to_string(entry)?;
        let ttl = self.ttl_seconds();
        let mut conn = self.redis.clone();
        let _: () = redis::pipe()
            .atomic()
            .set_ex(entry_key(key), json, ttl)
            .set_ex(latest_pointer(), key, ttl)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn latest_key(&self) -> Result<Option<String>, CacheError> {
        let mut conn = self.redis.clone();
        let key: Option<String> = conn.get(latest_pointer()).await?;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(entry_key("abc123"), "jobmatch:cache:abc123");
        assert_eq!(latest_pointer(), "jobmatch:cache:latest");
    }

    #[test]
    fn test_expiry_follows_retention_window() {
        assert_eq!(expiry_seconds(Duration::from_secs(86_400)), 86_400);
        assert_eq!(expiry_seconds(Duration::from_millis(200)), 1);
    }
}
