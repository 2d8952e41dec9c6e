use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::cache::CachePolicy;
use crate::queue::QueueConfig;
use crate::sources::credentials::CredentialPool;
use crate::sources::linkedin;
use crate::sources::location::DEFAULT_LOCATION;

/// Application configuration loaded from environment variables.
/// Everything has a default; only malformed values fail start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Unset: cache entries live in process memory.
    pub redis_url: Option<String>,
    /// Unset: the internal opportunity catalog is empty.
    pub database_url: Option<String>,
    pub default_location: String,
    /// Origin of the student web app. Unset: internal apply links stay app-relative.
    pub app_base_url: Option<String>,
    pub apify: ApifyConfig,
    pub cache: CachePolicy,
    pub queue: QueueConfig,
}

/// Source adapter settings: token pools, actor ids and timeouts.
#[derive(Debug, Clone)]
pub struct ApifyConfig {
    pub default_tokens: CredentialPool,
    pub linkedin_tokens: CredentialPool,
    pub naukri_tokens: CredentialPool,
    pub internshala_tokens: CredentialPool,
    pub linkedin_actor_id: Option<String>,
    pub naukri_actor_id: Option<String>,
    pub internshala_actor_id: Option<String>,
    /// Per actor call.
    pub actor_timeout: Duration,
    /// Aggregator wall clock across all adapters.
    pub platform_timeout: Duration,
}

impl Default for ApifyConfig {
    fn default() -> Self {
        Self {
            default_tokens: CredentialPool::default(),
            linkedin_tokens: CredentialPool::default(),
            naukri_tokens: CredentialPool::default(),
            internshala_tokens: CredentialPool::default(),
            linkedin_actor_id: Some(linkedin::DEFAULT_ACTOR_ID.to_string()),
            naukri_actor_id: None,
            internshala_actor_id: None,
            actor_timeout: Duration::from_secs(35),
            platform_timeout: Duration::from_secs(45),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = Env { lookup };
        let apify_defaults = ApifyConfig::default();
        let cache_defaults = CachePolicy::default();
        let queue_defaults = QueueConfig::default();

        let apify = ApifyConfig {
            default_tokens: CredentialPool::from_raw(
                ["APIFY_API_TOKENS", "APIFY_API_TOKEN"]
                    .into_iter()
                    .filter_map(|key| env.text(key)),
            ),
            linkedin_tokens: env.tokens("LINKEDIN_APIFY_API_TOKEN"),
            naukri_tokens: env.tokens("NAUKRI_APIFY_API_TOKEN"),
            internshala_tokens: env.tokens("INTERNSHALA_APIFY_API_TOKEN"),
            linkedin_actor_id: env
                .text("LINKEDIN_ACTOR_ID")
                .or(apify_defaults.linkedin_actor_id),
            naukri_actor_id: env.text("NAUKRI_ACTOR_ID"),
            internshala_actor_id: env.text("INTERNSHALA_ACTOR_ID"),
            actor_timeout: env.seconds("APIFY_ACTOR_TIMEOUT_SECONDS", apify_defaults.actor_timeout)?,
            platform_timeout: env.seconds(
                "APIFY_PLATFORM_TIMEOUT_SECONDS",
                apify_defaults.platform_timeout,
            )?,
        };

        let cache = CachePolicy {
            fresh: env.seconds("APIFY_CACHE_FRESH_SECONDS", cache_defaults.fresh)?,
            fallback: env.seconds("APIFY_CACHE_FALLBACK_SECONDS", cache_defaults.fallback)?,
        };

        let queue = QueueConfig {
            workers: env.positive("APIFY_ASYNC_WORKERS", queue_defaults.workers)?,
            max_workers: env.positive("APIFY_ASYNC_MAX_WORKERS", queue_defaults.max_workers)?,
            job_ttl: env.seconds("APIFY_ASYNC_JOB_TTL_SECONDS", queue_defaults.job_ttl)?,
            max_active_per_owner: env.positive(
                "APIFY_ASYNC_MAX_ACTIVE_JOBS_PER_USER",
                queue_defaults.max_active_per_owner,
            )?,
            poll_interval: Duration::from_millis(env.positive(
                "APIFY_ASYNC_POLL_INTERVAL_MS",
                u64::try_from(queue_defaults.poll_interval.as_millis()).unwrap_or(1500),
            )?),
        };

        Ok(Config {
            port: env
                .text("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env.text("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            redis_url: env.text("REDIS_URL"),
            database_url: env.text("DATABASE_URL"),
            default_location: env
                .text("DEFAULT_LOCATION")
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            app_base_url: env
                .text("APP_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            apify,
            cache,
            queue,
        })
    }
}

struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Trimmed value; blank counts as unset.
    fn text(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn tokens(&self, key: &str) -> CredentialPool {
        CredentialPool::from_raw(self.text(key))
    }

    /// Parses a positive integer. Zero or negative values fall back to `default`.
    fn positive<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr + PartialOrd + Default,
    {
        let Some(raw) = self.text(key) else {
            return Ok(default);
        };
        if raw.starts_with('-') {
            return Ok(default);
        }
        let value = raw
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{key} must be a whole number, got '{raw}'"))?;
        Ok(if value > T::default() { value } else { default })
    }

    fn seconds(&self, key: &str, default: Duration) -> Result<Duration> {
        self.positive(key, default.as_secs()).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.default_location, "India");
        assert!(config.redis_url.is_none());
        assert!(config.database_url.is_none());
        assert!(config.app_base_url.is_none());
        assert_eq!(
            config.apify.linkedin_actor_id.as_deref(),
            Some("bebity/linkedin-jobs-scraper")
        );
        assert!(config.apify.naukri_actor_id.is_none());
        assert_eq!(config.apify.platform_timeout, Duration::from_secs(45));
        assert_eq!(config.cache.fresh, Duration::from_secs(600));
        assert_eq!(config.queue.workers, 2);
        assert_eq!(config.queue.poll_interval, Duration::from_millis(1500));
    }

    #[test]
    fn test_token_pools_merge_and_dedupe() {
        let config = config(&[
            ("APIFY_API_TOKENS", "a, b;c"),
            ("APIFY_API_TOKEN", "b"),
            ("NAUKRI_APIFY_API_TOKEN", "n1\nn2"),
        ])
        .unwrap();
        assert_eq!(config.apify.default_tokens, CredentialPool::from_raw(["a", "b", "c"]));
        assert_eq!(config.apify.naukri_tokens, CredentialPool::from_raw(["n1", "n2"]));
        assert!(config.apify.linkedin_tokens.is_empty());
    }

    #[test]
    fn test_non_positive_values_fall_back() {
        let config = config(&[
            ("APIFY_ASYNC_WORKERS", "0"),
            ("APIFY_ASYNC_JOB_TTL_SECONDS", "-5"),
            ("APIFY_ASYNC_MAX_ACTIVE_JOBS_PER_USER", "4"),
            ("DEFAULT_LOCATION", "  "),
        ])
        .unwrap();
        assert_eq!(config.queue.workers, 2);
        assert_eq!(config.queue.job_ttl, Duration::from_secs(900));
        assert_eq!(config.queue.max_active_per_owner, 4);
        assert_eq!(config.default_location, "India");
    }

    #[test]
    fn test_app_base_url_drops_trailing_slash() {
        let cfg = config(&[("APP_BASE_URL", " https://app.example.com/ ")]).unwrap();
        assert_eq!(cfg.app_base_url.as_deref(), Some("https://app.example.com"));
        assert!(config(&[("APP_BASE_URL", "/")]).unwrap().app_base_url.is_none());
    }

    #[test]
    fn test_malformed_numbers_are_errors() {
        assert!(config(&[("PORT", "eighty")]).is_err());
        assert!(config(&[("APIFY_CACHE_FRESH_SECONDS", "ten")]).is_err());
    }
}
