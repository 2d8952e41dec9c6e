pub mod job;
pub mod pending;
pub mod service;

pub use job::{JobSnapshot, JobStatus};
pub use service::{Enqueued, QueueConfig, QueueError, RecommendationQueue};
