use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use tokio::time::Instant;
use uuid::Uuid;

use crate::models::MatchResult;
use crate::recommendation::RecommendationRequest;

pub const CANCELLED_MESSAGE: &str = "Cancelled by user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Queued or running: counts toward the owner's cap and dedup.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct RecommendationJob {
    pub id: Uuid,
    pub owner: String,
    pub payload_hash: String,
    pub request: RecommendationRequest,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Monotonic completion time; the TTL sweep measures from here.
    pub finished: Option<Instant>,
    pub error: Option<String>,
    pub result: Option<Vec<MatchResult>>,
}

impl RecommendationJob {
    pub fn new(owner: impl Into<String>, request: RecommendationRequest) -> Self {
        let owner = owner.into();
        Self {
            id: Uuid::new_v4(),
            payload_hash: payload_hash(&owner, &request),
            owner,
            request,
            status: JobStatus::Queued,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            finished: None,
            error: None,
            result: None,
        }
    }

    pub fn start(&mut self) {
        self.status = JobStatus::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn succeed(&mut self, results: Vec<MatchResult>) {
        self.result = Some(results);
        self.finish(JobStatus::Succeeded);
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.finish(JobStatus::Failed);
    }

    pub fn cancel(&mut self) {
        self.error = Some(CANCELLED_MESSAGE.to_string());
        self.finish(JobStatus::Cancelled);
    }

    fn finish(&mut self, status: JobStatus) {
        self.status = status;
        self.completed_at = Some(Utc::now());
        self.finished = Some(Instant::now());
    }

    /// Poll payload. `queue_position` is only meaningful while queued.
    pub fn snapshot(&self, queue_position: usize, poll_interval_ms: u64) -> JobSnapshot {
        let active = self.status.is_active();
        let (recommendations, total) = match (&self.status, &self.result) {
            (JobStatus::Succeeded, Some(results)) => (Some(results.clone()), Some(results.len())),
            _ => (None, None),
        };
        JobSnapshot {
            job_id: self.id,
            status: self.status,
            created_at: self.created_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
            retry_after_ms: active.then_some(poll_interval_ms),
            queue_position: (self.status == JobStatus::Queued).then_some(queue_position),
            recommendations,
            total,
            error: match self.status {
                JobStatus::Failed | JobStatus::Cancelled => self.error.clone(),
                _ => None,
            },
        }
    }
}

/// Hex SHA-256 over `{owner, request}` serialized with sorted keys.
pub fn payload_hash(owner: &str, request: &RecommendationRequest) -> String {
    // serde_json::Value keeps object keys ordered, so the encoding is canonical.
    let payload = json!({
        "owner": owner,
        "request": serde_json::to_value(request).unwrap_or_default(),
    });
    hex::encode(Sha256::digest(payload.to_string().as_bytes()))
}

#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<MatchResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
