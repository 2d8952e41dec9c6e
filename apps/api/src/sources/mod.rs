//! Source adapters: one per external scraping backend.
//!
//! Each adapter turns `(keywords, location)` into canonical `JobListing`s. The
//! three Apify-backed platforms share one generic adapter, `ApifySource`,
//! parameterised by a static `RecordSchema` describing that platform's actor
//! input and output fields.

pub mod apify;
pub mod credentials;
pub mod internshala;
pub mod linkedin;
pub mod location;
pub mod naukri;
pub mod record;
pub mod urls;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ApifyConfig;
use crate::models::{JobListing, Platform};
use crate::sources::apify::{is_quota_message, ActorRunner};
use crate::sources::credentials::{call_with_rotation, CredentialPool};
use crate::sources::location::sanitize_location;
use crate::sources::record::RecordSchema;

/// Number of leading keywords joined into an actor's search query.
const QUERY_KEYWORDS: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Apify API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Apify quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Actor call timed out after {0:?}")]
    Timeout(Duration),

    #[error("No Apify credentials configured for {0}")]
    NoCredentials(Platform),
}

impl SourceError {
    /// Whether this failure is the quota signal that triggers credential rotation.
    pub fn is_quota(&self) -> bool {
        match self {
            SourceError::QuotaExceeded(_) => true,
            SourceError::Api { status, message } => *status == 402 || is_quota_message(message),
            _ => false,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Adapter trait
// ────────────────────────────────────────────────────────────────────────────

/// One external job backend. Zero results is `Ok(vec![])`; hard failures are errors.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    async fn search(
        &self,
        keywords: &[String],
        location: &str,
    ) -> Result<Vec<JobListing>, SourceError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Apify-backed adapter
// ────────────────────────────────────────────────────────────────────────────

pub struct ApifySource {
    schema: &'static RecordSchema,
    runner: Arc<dyn ActorRunner>,
    credentials: CredentialPool,
    actor_id: Option<String>,
    call_timeout: Duration,
    default_location: String,
}

impl ApifySource {
    pub fn new(
        schema: &'static RecordSchema,
        runner: Arc<dyn ActorRunner>,
        credentials: CredentialPool,
        actor_id: Option<String>,
        call_timeout: Duration,
        default_location: impl Into<String>,
    ) -> Self {
        Self {
            schema,
            runner,
            credentials,
            actor_id,
            call_timeout,
            default_location: default_location.into(),
        }
    }
}

#[async_trait]
impl SourceAdapter for ApifySource {
    fn platform(&self) -> Platform {
        self.schema.platform
    }

    async fn search(
        &self,
        keywords: &[String],
        location: &str,
    ) -> Result<Vec<JobListing>, SourceError> {
        let platform = self.schema.platform;
        let Some(actor_id) = self.actor_id.as_deref() else {
            info!("[{platform}] Actor ID not configured, skipping");
            return Ok(Vec::new());
        };
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let location = sanitize_location(location, &self.default_location);
        let query = keywords
            .iter()
            .take(QUERY_KEYWORDS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        let input = (self.schema.build_input)(&query, &location);
        info!("[{platform}] Searching for '{query}' in {location}");

        // One deadline covers the whole rotation, not each credential attempt.
        let call_timeout = self.call_timeout;
        let rotation = call_with_rotation(&self.credentials, platform, |token| {
            let input = &input;
            async move {
                self.runner
                    .run_actor(&token, actor_id, input, call_timeout)
                    .await
            }
        });
        let items = tokio::time::timeout(call_timeout, rotation)
            .await
            .map_err(|_| SourceError::Timeout(call_timeout))??;

        let mut listings = Vec::with_capacity(items.len());
        let mut synthesized = 0usize;
        for item in &items {
            match self.schema.map_record(item, &location) {
                Ok(mapped) => {
                    if mapped.synthesized_url {
                        synthesized += 1;
                    }
                    listings.push(mapped.listing);
                }
                Err(e) => debug!("[{platform}] Dropping record: {e}"),
            }
        }

        if synthesized > 0 {
            info!("[{platform}] Synthesized search URLs for {synthesized} listing(s)");
        }
        info!(
            "[{platform}] Found {} listings from {} records",
            listings.len(),
            items.len()
        );
        Ok(listings)
    }
}

/// Builds the LinkedIn, Naukri and Internshala adapters from configuration.
/// Platform-specific token pools take precedence over the shared pool.
pub fn build_adapters(
    config: &ApifyConfig,
    runner: Arc<dyn ActorRunner>,
    default_location: &str,
) -> Vec<Arc<dyn SourceAdapter>> {
    let platforms: [(&'static RecordSchema, &CredentialPool, &Option<String>); 3] = [
        (
            &linkedin::SCHEMA,
            &config.linkedin_tokens,
            &config.linkedin_actor_id,
        ),
        (&naukri::SCHEMA, &config.naukri_tokens, &config.naukri_actor_id),
        (
            &internshala::SCHEMA,
            &config.internshala_tokens,
            &config.internshala_actor_id,
        ),
    ];

    platforms
        .into_iter()
        .map(|(schema, tokens, actor_id)| {
            let credentials = tokens.chained(&config.default_tokens);
            if credentials.is_empty() {
                warn!("[{}] No Apify tokens configured", schema.platform);
            }
            Arc::new(ApifySource::new(
                schema,
                runner.clone(),
                credentials,
                actor_id.clone(),
                config.actor_timeout,
                default_location,
            )) as Arc<dyn SourceAdapter>
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Fake actor runner: answers per token, records every call.
    struct FakeRunner {
        responses: Vec<(&'static str, Result<Vec<Value>, u16>)>,
        calls: Mutex<Vec<(String, Value)>>,
        delay: Option<Duration>,
    }

    impl FakeRunner {
        fn new(responses: Vec<(&'static str, Result<Vec<Value>, u16>)>) -> Self {
            Self {
                responses,
                calls: Mutex::new(Vec::new()),
                delay: None,
            }
        }
    }

    #[async_trait]
    impl ActorRunner for FakeRunner {
        async fn run_actor(
            &self,
            token: &str,
            _actor_id: &str,
            input: &Value,
            _timeout: Duration,
        ) -> Result<Vec<Value>, SourceError> {
            self.calls
                .lock()
                .unwrap()
                .push((token.to_string(), input.clone()));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.responses.iter().find(|(t, _)| *t == token) {
                Some((_, Ok(items))) => Ok(items.clone()),
                Some((_, Err(402))) => Err(SourceError::QuotaExceeded(
                    "Monthly usage hard limit exceeded".to_string(),
                )),
                Some((_, Err(status))) => Err(SourceError::Api {
                    status: *status,
                    message: "failed".to_string(),
                }),
                None => Ok(Vec::new()),
            }
        }
    }

    fn source(runner: Arc<FakeRunner>, tokens: &str, actor: Option<&str>) -> ApifySource {
        ApifySource::new(
            &linkedin::SCHEMA,
            runner,
            CredentialPool::from_raw([tokens]),
            actor.map(str::to_string),
            Duration::from_secs(35),
            "India",
        )
    }

    fn keywords(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_quota_detection() {
        assert!(SourceError::QuotaExceeded("x".into()).is_quota());
        assert!(SourceError::Api {
            status: 402,
            message: "payment required".into()
        }
        .is_quota());
        assert!(SourceError::Api {
            status: 403,
            message: "Monthly usage hard limit exceeded".into()
        }
        .is_quota());
        assert!(!SourceError::Timeout(Duration::from_secs(1)).is_quota());
    }

    #[tokio::test]
    async fn test_search_maps_records_and_drops_untitled() {
        let runner = Arc::new(FakeRunner::new(vec![(
            "tok",
            Ok(vec![
                json!({"title": "Python Developer", "companyName": "Acme", "link": "https://www.linkedin.com/jobs/view/1"}),
                json!({"companyName": "No Title Inc"}),
                json!({"jobTitle": "Data Engineer", "company": {"name": "Beta"}}),
            ]),
        )]));
        let adapter = source(runner.clone(), "tok", Some("bebity/linkedin-jobs-scraper"));

        let listings = adapter
            .search(&keywords(&["python", "sql", "django", "flask"]), "Pune")
            .await
            .unwrap();

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].url, "https://www.linkedin.com/jobs/view/1");
        assert_eq!(listings[1].company, "Beta");
        assert!(listings[1].url.starts_with("https://www.linkedin.com/jobs/search/"));

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls[0].1["keyword"], "python sql django");
        assert_eq!(calls[0].1["location"], "Pune");
    }

    #[tokio::test]
    async fn test_search_rotates_past_quota_error() {
        let runner = Arc::new(FakeRunner::new(vec![
            ("first", Err(402)),
            ("second", Ok(vec![json!({"title": "Rust Engineer"})])),
        ]));
        let adapter = source(runner.clone(), "first,second", Some("actor"));

        let listings = adapter.search(&keywords(&["rust"]), "").await.unwrap();

        assert_eq!(listings.len(), 1);
        assert_eq!(runner.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_pool_propagates_error() {
        let runner = Arc::new(FakeRunner::new(vec![("a", Err(500)), ("b", Err(402))]));
        let adapter = source(runner, "a,b", Some("actor"));

        let err = adapter.search(&keywords(&["rust"]), "").await.unwrap_err();
        assert!(err.is_quota());
    }

    #[tokio::test]
    async fn test_unconfigured_actor_returns_empty() {
        let runner = Arc::new(FakeRunner::new(vec![]));
        let adapter = source(runner.clone(), "tok", None);

        let listings = adapter.search(&keywords(&["rust"]), "").await.unwrap();
        assert!(listings.is_empty());
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_actor_times_out() {
        let mut runner = FakeRunner::new(vec![("tok", Ok(vec![json!({"title": "Late"})]))]);
        runner.delay = Some(Duration::from_secs(60));
        let adapter = source(Arc::new(runner), "tok", Some("actor"));

        let err = adapter.search(&keywords(&["rust"]), "").await.unwrap_err();
        assert!(matches!(err, SourceError::Timeout(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rotation_shares_a_single_deadline() {
        // Each attempt fits the 35s budget on its own; together they do not.
        let mut runner = FakeRunner::new(vec![
            ("a", Err(500)),
            ("b", Ok(vec![json!({"title": "Late"})])),
        ]);
        runner.delay = Some(Duration::from_secs(30));
        let runner = Arc::new(runner);
        let adapter = source(runner.clone(), "a,b", Some("actor"));

        let started = tokio::time::Instant::now();
        let err = adapter.search(&keywords(&["rust"]), "").await.unwrap_err();

        assert!(matches!(err, SourceError::Timeout(_)));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(35) && elapsed < Duration::from_secs(36));
        assert_eq!(runner.calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_build_adapters_covers_three_platforms() {
        let config = ApifyConfig {
            default_tokens: CredentialPool::from_raw(["shared"]),
            ..ApifyConfig::default()
        };
        let runner: Arc<dyn ActorRunner> = Arc::new(FakeRunner::new(vec![]));
        let platforms: Vec<Platform> = build_adapters(&config, runner, "India")
            .iter()
            .map(|a| a.platform())
            .collect();
        assert_eq!(
            platforms,
            vec![Platform::Linkedin, Platform::Naukri, Platform::Internshala]
        );
    }
}
