//! In-process recommendation job queue with a fixed worker pool.
//!
//! One tokio mutex guards the jobs map; the pending FIFO has its own lock.
//! Terminal jobs are swept lazily on enqueue/get once older than the TTL.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::queue::job::{JobSnapshot, JobStatus, RecommendationJob};
use crate::queue::pending::PendingQueue;
use crate::recommendation::{RecommendationRequest, Recommender};

#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub workers: usize,
    pub max_workers: usize,
    pub job_ttl: Duration,
    pub max_active_per_owner: usize,
    pub poll_interval: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            max_workers: 6,
            job_ttl: Duration::from_secs(900),
            max_active_per_owner: 2,
            poll_interval: Duration::from_millis(1500),
        }
    }
}

impl QueueConfig {
    pub fn worker_count(&self) -> usize {
        self.workers.clamp(1, self.max_workers.max(1))
    }

    fn poll_interval_ms(&self) -> u64 {
        u64::try_from(self.poll_interval.as_millis()).unwrap_or(u64::MAX)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum QueueError {
    #[error("Too many active recommendation jobs (max {max}); retry later")]
    Capacity { max: usize },

    #[error("Recommendation job not found")]
    NotFound,

    #[error("Job is {status} and can no longer be cancelled")]
    NotCancellable { status: JobStatus },
}

/// Outcome of a submission: the job's poll payload and whether it is new.
#[derive(Debug, Clone)]
pub struct Enqueued {
    pub snapshot: JobSnapshot,
    pub created: bool,
}

pub struct RecommendationQueue {
    config: QueueConfig,
    recommender: Arc<dyn Recommender>,
    jobs: Mutex<HashMap<Uuid, RecommendationJob>>,
    pending: PendingQueue,
    started: AtomicBool,
}

impl RecommendationQueue {
    pub fn new(recommender: Arc<dyn Recommender>, config: QueueConfig) -> Self {
        Self {
            config,
            recommender,
            jobs: Mutex::new(HashMap::new()),
            pending: PendingQueue::new(),
            started: AtomicBool::new(false),
        }
    }

    /// Spawns the worker pool. Later calls are no-ops.
    pub fn start(self: &Arc<Self>) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let workers = self.config.worker_count();
        for worker in 0..workers {
            tokio::spawn(self.clone().run_worker(worker));
        }
        info!("Recommendation queue started with {} workers", workers);
    }

    /// Submits a job, or returns the owner's active job with identical inputs.
    pub async fn enqueue(
        self: &Arc<Self>,
        owner: &str,
        request: RecommendationRequest,
    ) -> Result<Enqueued, QueueError> {
        self.start();
        let job = RecommendationJob::new(owner, request.normalized());

        let mut jobs = self.jobs.lock().await;
        self.sweep(&mut jobs);

        if let Some(existing) = jobs.values().find(|existing| {
            existing.owner == job.owner
                && existing.payload_hash == job.payload_hash
                && existing.status.is_active()
        }) {
            debug!("Returning active duplicate job {} for {}", existing.id, owner);
            return Ok(Enqueued {
                snapshot: self.snapshot(existing),
                created: false,
            });
        }

        let active = jobs
            .values()
            .filter(|existing| existing.owner == job.owner && existing.status.is_active())
            .count();
        if active >= self.config.max_active_per_owner {
            warn!("Owner {} is at the active job cap ({})", owner, active);
            return Err(QueueError::Capacity {
                max: self.config.max_active_per_owner,
            });
        }

        let id = job.id;
        jobs.insert(id, job);
        self.pending.push(id);
        info!("Queued recommendation job {} for {}", id, owner);

        let snapshot = jobs
            .get(&id)
            .map(|job| self.snapshot(job))
            .ok_or(QueueError::NotFound)?;
        Ok(Enqueued {
            snapshot,
            created: true,
        })
    }

    /// Poll payload for the owner's job. Foreign jobs read as not found.
    pub async fn get(&self, id: Uuid, owner: &str) -> Result<JobSnapshot, QueueError> {
        let mut jobs = self.jobs.lock().await;
        self.sweep(&mut jobs);
        jobs.get(&id)
            .filter(|job| job.owner == owner)
            .map(|job| self.snapshot(job))
            .ok_or(QueueError::NotFound)
    }

    /// Cancels a job that has not started yet.
    pub async fn cancel(&self, id: Uuid, owner: &str) -> Result<JobSnapshot, QueueError> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs
            .get_mut(&id)
            .filter(|job| job.owner == owner)
            .ok_or(QueueError::NotFound)?;

        if job.status != JobStatus::Queued {
            return Err(QueueError::NotCancellable { status: job.status });
        }
        self.pending.remove(&id);
        job.cancel();
        info!("Cancelled recommendation job {}", id);
        Ok(self.snapshot(job))
    }

    fn snapshot(&self, job: &RecommendationJob) -> JobSnapshot {
        let position = self.pending.position(&job.id).unwrap_or(0);
        job.snapshot(position, self.config.poll_interval_ms())
    }

    fn sweep(&self, jobs: &mut HashMap<Uuid, RecommendationJob>) {
        let ttl = self.config.job_ttl;
        let before = jobs.len();
        jobs.retain(|_, job| match job.finished {
            Some(finished) if job.status.is_terminal() => finished.elapsed() < ttl,
            _ => true,
        });
        let removed = before - jobs.len();
        if removed > 0 {
            debug!("Swept {} expired recommendation jobs", removed);
        }
    }

    async fn run_worker(self: Arc<Self>, worker: usize) {
        loop {
            let id = self.pending.pop().await;

            // Only queued -> running happens here, so a cancelled job is skipped.
            let request = {
                let mut jobs = self.jobs.lock().await;
                match jobs.get_mut(&id) {
                    Some(job) if job.status == JobStatus::Queued => {
                        job.start();
                        job.request.clone()
                    }
                    _ => continue,
                }
            };
            info!("Worker {} running recommendation job {}", worker, id);

            // A panicking run surfaces as a JoinError instead of killing the worker.
            let recommender = self.recommender.clone();
            let outcome =
                tokio::spawn(async move { recommender.recommend(&request).await }).await;

            let mut jobs = self.jobs.lock().await;
            let Some(job) = jobs.get_mut(&id) else {
                continue;
            };
            match outcome {
                Ok(Ok(results)) => {
                    info!("Job {} finished with {} recommendations", id, results.len());
                    job.succeed(results);
                }
                Ok(Err(e)) => {
                    warn!("Job {} failed: {:#}", id, e);
                    job.fail(format!("{e:#}"));
                }
                Err(e) => {
                    warn!("Job {} aborted: {}", id, e);
                    job.fail(format!("Recommendation run aborted: {e}"));
                }
            }
        }
    }
}
