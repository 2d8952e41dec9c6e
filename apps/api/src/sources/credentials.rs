//! Ordered credential pools and the rotation policy applied to every actor call.

use std::future::Future;

use tracing::{info, warn};

use crate::models::Platform;
use crate::sources::SourceError;

/// An ordered, de-duplicated list of API tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialPool {
    tokens: Vec<String>,
}

impl CredentialPool {
    /// Builds a pool from raw config values. Each value may hold several tokens
    /// separated by commas, semicolons or newlines; order of first appearance wins.
    pub fn from_raw<I, S>(raw_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tokens: Vec<String> = Vec::new();
        for raw in raw_values {
            for token in raw.as_ref().split([',', ';', '\n']) {
                let token = token.trim();
                if !token.is_empty() && !tokens.iter().any(|t| t == token) {
                    tokens.push(token.to_string());
                }
            }
        }
        Self { tokens }
    }

    /// A platform-specific pool followed by the shared default pool.
    pub fn chained(&self, fallback: &CredentialPool) -> Self {
        Self::from_raw(self.tokens.iter().chain(fallback.tokens.iter()))
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Runs `call` with each credential in order until one succeeds.
///
/// A quota signal rotates silently to the next token; any other failure also
/// advances (best-effort) while tokens remain. The last error is returned only
/// once the pool is exhausted.
pub async fn call_with_rotation<T, F, Fut>(
    pool: &CredentialPool,
    platform: Platform,
    mut call: F,
) -> Result<T, SourceError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let last_index = match pool.tokens.len().checked_sub(1) {
        Some(i) => i,
        None => return Err(SourceError::NoCredentials(platform)),
    };

    for (idx, token) in pool.tokens.iter().enumerate() {
        match call(token.clone()).await {
            Ok(value) => {
                if idx > 0 {
                    info!("[{platform}] Recovered using fallback token #{}", idx + 1);
                }
                return Ok(value);
            }
            Err(e) if idx < last_index => {
                if e.is_quota() {
                    warn!("[{platform}] Token #{} quota exceeded, rotating token", idx + 1);
                } else {
                    warn!("[{platform}] Token #{} failed ({e}), trying next token", idx + 1);
                }
            }
            Err(e) => return Err(e),
        }
    }

    Err(SourceError::NoCredentials(platform))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_pool_splits_and_dedupes_in_order() {
        let pool = CredentialPool::from_raw(["tok-a, tok-b;tok-a", "tok-c\ntok-b", ""]);
        assert_eq!(pool.tokens, vec!["tok-a", "tok-b", "tok-c"]);
    }

    #[test]
    fn test_chained_pool_prefers_platform_tokens() {
        let platform = CredentialPool::from_raw(["p1"]);
        let shared = CredentialPool::from_raw(["s1,p1"]);
        assert_eq!(platform.chained(&shared).tokens, vec!["p1", "s1"]);
    }

    #[tokio::test]
    async fn test_quota_error_rotates_to_next_token() {
        let pool = CredentialPool::from_raw(["first,second"]);
        let seen = Mutex::new(Vec::new());

        let result = call_with_rotation(&pool, Platform::Linkedin, |token| {
            seen.lock().unwrap().push(token.clone());
            async move {
                if token == "first" {
                    Err(SourceError::QuotaExceeded(
                        "Monthly usage hard limit exceeded".to_string(),
                    ))
                } else {
                    Ok(token)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "second");
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_other_errors_also_advance() {
        let pool = CredentialPool::from_raw(["a,b"]);
        let result = call_with_rotation(&pool, Platform::Naukri, |token| async move {
            if token == "a" {
                Err(SourceError::Api {
                    status: 500,
                    message: "boom".to_string(),
                })
            } else {
                Ok(1)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_pool_returns_last_error() {
        let pool = CredentialPool::from_raw(["a,b,c"]);
        let calls = Mutex::new(0);

        let result: Result<(), SourceError> =
            call_with_rotation(&pool, Platform::Internshala, |token| {
                *calls.lock().unwrap() += 1;
                async move { Err(SourceError::QuotaExceeded(format!("limit on {token}"))) }
            })
            .await;

        assert_eq!(*calls.lock().unwrap(), 3);
        match result {
            Err(SourceError::QuotaExceeded(msg)) => assert_eq!(msg, "limit on c"),
            other => panic!("expected quota error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_pool_is_an_error() {
        let result: Result<(), SourceError> =
            call_with_rotation(&CredentialPool::default(), Platform::Linkedin, |_| async {
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(SourceError::NoCredentials(Platform::Linkedin))));
    }
}
