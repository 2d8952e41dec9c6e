use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::queue::JobSnapshot;
use crate::recommendation::RecommendationRequest;
use crate::state::AppState;

/// Set by the upstream auth layer to the authenticated user's id.
pub const OWNER_HEADER: &str = "x-owner-id";

/// Requesting owner, taken from the `X-Owner-Id` header.
#[derive(Debug, Clone)]
pub struct OwnerId(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for OwnerId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| OwnerId(value.to_string()))
            .ok_or(AppError::Unauthorized)
    }
}

#[derive(Serialize)]
pub struct EnqueueResponse {
    #[serde(flatten)]
    pub job: JobSnapshot,
    pub enqueued: bool,
    pub poll_url: String,
}

fn parse_job_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("'{raw}' is not a valid job id")))
}

/// POST /api/v1/recommendations
/// 202 for a new job, 200 when an identical active job already exists.
pub async fn handle_enqueue(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Json(req): Json<RecommendationRequest>,
) -> Result<(StatusCode, Json<EnqueueResponse>), AppError> {
    let outcome = state.queue.enqueue(&owner, req).await?;
    let status = if outcome.created {
        StatusCode::ACCEPTED
    } else {
        StatusCode::OK
    };
    let poll_url = format!("/api/v1/recommendations/{}", outcome.snapshot.job_id);
    Ok((
        status,
        Json(EnqueueResponse {
            job: outcome.snapshot,
            enqueued: outcome.created,
            poll_url,
        }),
    ))
}

/// GET /api/v1/recommendations/:job_id
/// 202 while queued or running, 200 once terminal.
pub async fn handle_poll(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(job_id): Path<String>,
) -> Result<(StatusCode, Json<JobSnapshot>), AppError> {
    let snapshot = state.queue.get(parse_job_id(&job_id)?, &owner).await?;
    let status = if snapshot.status.is_active() {
        StatusCode::ACCEPTED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(snapshot)))
}

/// DELETE /api/v1/recommendations/:job_id
pub async fn handle_cancel(
    State(state): State<AppState>,
    OwnerId(owner): OwnerId,
    Path(job_id): Path<String>,
) -> Result<Json<JobSnapshot>, AppError> {
    let snapshot = state.queue.cancel(parse_job_id(&job_id)?, &owner).await?;
    Ok(Json(snapshot))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Method, Request};
    use axum::Router;
    use serde_json::{json, Value};
    use tokio::sync::Semaphore;
    use tower::ServiceExt;

    use crate::models::MatchResult;
    use crate::queue::{QueueConfig, RecommendationQueue};
    use crate::recommendation::Recommender;
    use crate::routes::build_router;
    use crate::state::AppState;

    use super::*;

    struct GatedRecommender {
        gate: Arc<Semaphore>,
    }

    #[async_trait]
    impl Recommender for GatedRecommender {
        async fn recommend(
            &self,
            _request: &RecommendationRequest,
        ) -> anyhow::Result<Vec<MatchResult>> {
            let _permit = self.gate.acquire().await?;
            Ok(Vec::new())
        }
    }

    fn app(permits: usize) -> (Router, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(permits));
        let queue = Arc::new(RecommendationQueue::new(
            Arc::new(GatedRecommender { gate: gate.clone() }),
            QueueConfig {
                workers: 1,
                ..QueueConfig::default()
            },
        ));
        (build_router(AppState { queue }), gate)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        owner: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(owner) = owner {
            builder = builder.header(OWNER_HEADER, owner);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn submission(skill: &str) -> Value {
        json!({"resume_analysis": {"skills": [skill]}, "location": "Pune"})
    }

    #[tokio::test]
    async fn test_missing_owner_is_unauthorized() {
        let (app, _) = app(0);
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/recommendations",
            None,
            Some(submission("python")),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_enqueue_then_duplicate_then_capacity() {
        let (app, _) = app(0);
        let uri = "/api/v1/recommendations";

        let (status, first) = send(&app, Method::POST, uri, Some("u1"), Some(submission("python"))).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(first["enqueued"], true);
        let job_id = first["job_id"].as_str().unwrap().to_string();
        assert_eq!(first["poll_url"], format!("/api/v1/recommendations/{job_id}"));

        let (status, again) = send(&app, Method::POST, uri, Some("u1"), Some(submission("python"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again["enqueued"], false);
        assert_eq!(again["job_id"], job_id.as_str());

        send(&app, Method::POST, uri, Some("u1"), Some(submission("rust"))).await;
        let (status, body) = send(&app, Method::POST, uri, Some("u1"), Some(submission("go"))).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"]["code"], "RATE_LIMITED");
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_reports_pending_then_result() {
        let (app, gate) = app(0);
        let (_, created) = send(
            &app,
            Method::POST,
            "/api/v1/recommendations",
            Some("u1"),
            Some(submission("python")),
        )
        .await;
        let poll_url = created["poll_url"].as_str().unwrap().to_string();

        let (status, pending) = send(&app, Method::GET, &poll_url, Some("u1"), None).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(pending["retry_after_ms"], 1500);

        let (status, _) = send(&app, Method::GET, &poll_url, Some("u2"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        gate.add_permits(1);
        let mut done = Value::Null;
        for _ in 0..200 {
            let (status, body) = send(&app, Method::GET, &poll_url, Some("u1"), None).await;
            if status == StatusCode::OK {
                done = body;
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(done["status"], "succeeded");
        assert_eq!(done["total"], 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_queued_job_and_conflict_on_running() {
        let (app, _) = app(0);
        let uri = "/api/v1/recommendations";
        let (_, running) = send(&app, Method::POST, uri, Some("u1"), Some(submission("python"))).await;
        let running_url = running["poll_url"].as_str().unwrap().to_string();

        for _ in 0..200 {
            let (_, body) = send(&app, Method::GET, &running_url, Some("u1"), None).await;
            if body["status"] == "running" {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let (_, queued) = send(&app, Method::POST, uri, Some("u1"), Some(submission("rust"))).await;
        assert_eq!(queued["queue_position"], 1);
        let queued_url = queued["poll_url"].as_str().unwrap().to_string();

        let (status, cancelled) = send(&app, Method::DELETE, &queued_url, Some("u1"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cancelled["status"], "cancelled");
        assert_eq!(cancelled["error"], "Cancelled by user");

        let (status, body) = send(&app, Method::DELETE, &running_url, Some("u1"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_malformed_job_id_is_rejected() {
        let (app, _) = app(0);
        let (status, body) = send(
            &app,
            Method::GET,
            "/api/v1/recommendations/not-a-uuid",
            Some("u1"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app(0);
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "jobmatch-api");
    }
}
