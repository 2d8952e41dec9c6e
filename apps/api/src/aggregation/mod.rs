//! Live job search: cache tiers around the parallel aggregator.

pub mod aggregator;
pub mod dedup;
pub mod query;

use tracing::info;

use crate::aggregation::aggregator::ParallelAggregator;
use crate::aggregation::query::SearchQuery;
use crate::cache::ResultCache;
use crate::models::JobListing;

pub struct LiveSearch {
    aggregator: ParallelAggregator,
    cache: ResultCache,
}

impl LiveSearch {
    pub fn new(aggregator: ParallelAggregator, cache: ResultCache) -> Self {
        Self { aggregator, cache }
    }

    /// Fresh cache, then a live run (written through when non-empty), then the
    /// query's fallback entry, then the latest entry for any query.
    /// An empty result means every tier came up dry.
    pub async fn search(&self, query: &SearchQuery) -> Vec<JobListing> {
        let key = query.cache_key();

        if let Some(jobs) = self.cache.fresh(&key).await {
            return jobs;
        }

        info!(
            "Fetching live jobs for {:?} in {}",
            query.keywords.iter().take(5).collect::<Vec<_>>(),
            query.location
        );
        let live = self.aggregator.aggregate(&query.keywords, &query.location).await;
        if !live.is_empty() {
            self.cache.store(&key, query, &live).await;
            return live;
        }

        if let Some(jobs) = self.cache.fallback(&key).await {
            return jobs;
        }
        self.cache.latest_fallback().await.unwrap_or_default()
    }
}
