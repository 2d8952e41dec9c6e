//! Two-tier result cache over a pluggable key-value store.
//!
//! One entry per query hash plus a "latest key" pointer. The fresh tier answers
//! before any source is contacted; the fallback tier is read only after a live
//! aggregation came back empty.

pub mod memory;
pub mod redis_store;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::aggregation::query::SearchQuery;
use crate::models::JobListing;

pub use memory::InMemoryListingStore;
pub use redis_store::RedisListingStore;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache entry (de)serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// One cached aggregation result. Always written whole, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub created_at: DateTime<Utc>,
    pub jobs: Vec<JobListing>,
    pub keywords: Vec<String>,
    pub location: String,
}

impl CacheEntry {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.created_at).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Durable or in-memory storage for cache entries.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Stores the entry and points the latest-key marker at it.
    async fn put(&self, key: &str, entry: &CacheEntry) -> Result<(), CacheError>;

    async fn latest_key(&self) -> Result<Option<String>, CacheError>;
}

#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    pub fresh: Duration,
    pub fallback: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            fresh: Duration::from_secs(600),
            fallback: Duration::from_secs(24 * 3600),
        }
    }
}

/// Freshness-tiered reads and write-on-success over a `ListingStore`.
/// Store failures are logged and treated as misses.
#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn ListingStore>,
    policy: CachePolicy,
}

impl ResultCache {
    pub fn new(store: Arc<dyn ListingStore>, policy: CachePolicy) -> Self {
        Self { store, policy }
    }

    pub async fn fresh(&self, key: &str) -> Option<Vec<JobListing>> {
        let jobs = self.read(key, self.policy.fresh).await?;
        info!("Using fresh cache for query: {} jobs", jobs.len());
        Some(jobs)
    }

    pub async fn fallback(&self, key: &str) -> Option<Vec<JobListing>> {
        let jobs = self.read(key, self.policy.fallback).await?;
        info!("Using fallback cache for query: {} jobs", jobs.len());
        Some(jobs)
    }

    /// Last resort: the most recently written entry for any query.
    pub async fn latest_fallback(&self) -> Option<Vec<JobListing>> {
        let key = match self.store.latest_key().await {
            Ok(key) => key?,
            Err(e) => {
                warn!("Failed to read latest cache key: {e}");
                return None;
            }
        };
        let jobs = self.read(&key, self.policy.fallback).await?;
        info!("Using latest fallback cache: {} jobs", jobs.len());
        Some(jobs)
    }

    /// Writes only non-empty results.
    pub async fn store(&self, key: &str, query: &SearchQuery, jobs: &[JobListing]) {
        if jobs.is_empty() {
            return;
        }
        let entry = CacheEntry {
            created_at: Utc::now(),
            jobs: jobs.to_vec(),
            keywords: query.keywords.clone(),
            location: query.location.clone(),
        };
        if let Err(e) = self.store.put(key, &entry).await {
            warn!("Failed to save result cache: {e}");
        }
    }

    async fn read(&self, key: &str, max_age: Duration) -> Option<Vec<JobListing>> {
        let entry = match self.store.get(key).await {
            Ok(entry) => entry?,
            Err(e) => {
                warn!("Failed to load result cache: {e}");
                return None;
            }
        };
        if entry.jobs.is_empty() || entry.age(Utc::now()) > max_age {
            return None;
        }
        Some(entry.jobs)
    }
}
