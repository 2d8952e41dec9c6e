//! Apify client. Runs a scraping actor synchronously and returns its dataset items.
//!
//! This is the only module that talks to the Apify REST API. Adapters reach it
//! through the `ActorRunner` capability so they can be driven by a fake in tests.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::sources::SourceError;

const APIFY_API_URL: &str = "https://api.apify.com/v2";
/// Extra time granted to the HTTP request beyond the actor's own run timeout.
const REQUEST_GRACE: Duration = Duration::from_secs(5);

/// Capability to run one actor with one credential.
#[async_trait]
pub trait ActorRunner: Send + Sync {
    async fn run_actor(
        &self,
        token: &str,
        actor_id: &str,
        input: &Value,
        timeout: Duration,
    ) -> Result<Vec<Value>, SourceError>;
}

#[derive(Debug, Deserialize)]
struct ApifyErrorEnvelope {
    error: ApifyErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApifyErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct ApifyClient {
    client: Client,
    base_url: String,
}

impl ApifyClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: APIFY_API_URL.to_string(),
        }
    }
}

impl Default for ApifyClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActorRunner for ApifyClient {
    async fn run_actor(
        &self,
        token: &str,
        actor_id: &str,
        input: &Value,
        timeout: Duration,
    ) -> Result<Vec<Value>, SourceError> {
        let url = format!(
            "{}/acts/{}/run-sync-get-dataset-items?timeout={}&format=json",
            self.base_url,
            actor_path(actor_id),
            timeout.as_secs().max(1)
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .timeout(timeout + REQUEST_GRACE)
            .json(input)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApifyErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            if status.as_u16() == 402 || is_quota_message(&message) {
                return Err(SourceError::QuotaExceeded(message));
            }
            return Err(SourceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let items: Vec<Value> = response.json().await?;
        debug!("Actor {actor_id} returned {} dataset items", items.len());
        Ok(items)
    }
}

/// Actor ids of the form `user/actor` are addressed as `user~actor` in API paths.
fn actor_path(actor_id: &str) -> String {
    actor_id.trim().replace('/', "~")
}

/// Apify reports exhausted monthly credits with this wording on several status codes.
pub fn is_quota_message(message: &str) -> bool {
    message.to_lowercase().contains("usage hard limit exceeded")
}
