//! Concurrent fan-out across every source adapter under one wall-clock deadline.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

use crate::aggregation::dedup::merge_listings;
use crate::models::{JobListing, Platform};
use crate::sources::SourceAdapter;

pub struct ParallelAggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    wall_clock: Duration,
}

impl ParallelAggregator {
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>, wall_clock: Duration) -> Self {
        Self {
            adapters,
            wall_clock,
        }
    }

    /// Runs all adapters concurrently and merges whatever finished before the
    /// deadline. A failed, panicked or late adapter contributes nothing; this
    /// never returns an error.
    pub async fn aggregate(&self, keywords: &[String], location: &str) -> Vec<JobListing> {
        let deadline = Instant::now() + self.wall_clock;
        let mut tasks = JoinSet::new();

        for (idx, adapter) in self.adapters.iter().enumerate() {
            let adapter = Arc::clone(adapter);
            let keywords = keywords.to_vec();
            let location = location.to_string();
            tasks.spawn(async move { (idx, adapter.search(&keywords, &location).await) });
        }

        let mut collected: Vec<Option<Vec<JobListing>>> = vec![None; self.adapters.len()];
        let mut finished = vec![false; self.adapters.len()];

        loop {
            match timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((idx, result)))) => {
                    finished[idx] = true;
                    let platform = self.adapters[idx].platform();
                    match result {
                        Ok(listings) => {
                            info!("[{platform}] Returned {} listings", listings.len());
                            collected[idx] = Some(listings);
                        }
                        Err(e) => warn!("[{platform}] Source failed, continuing without it: {e}"),
                    }
                }
                Ok(Some(Err(e))) => warn!("Source task aborted: {e}"),
                Ok(None) => break,
                Err(_) => {
                    let pending: Vec<Platform> = self
                        .adapters
                        .iter()
                        .zip(&finished)
                        .filter(|(_, done)| !**done)
                        .map(|(adapter, _)| adapter.platform())
                        .collect();
                    warn!(
                        "Aggregation deadline of {:?} reached; abandoning {pending:?}",
                        self.wall_clock
                    );
                    tasks.abort_all();
                    break;
                }
            }
        }

        let total: usize = collected.iter().flatten().map(Vec::len).sum();
        let merged = merge_listings(collected.into_iter().flatten().flatten());
        info!("Aggregated {} unique listings from {total} raw", merged.len());
        merged
    }
}
