//! Cache-backed reference-data fetching with bounded linear retry.

use athena_config::AthenaConfig;
use athena_core::{CacheOptions, CacheStore, PluginError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first one.
    pub max_attempts: u32,
    /// Attempt `n` (1-based) is followed by a pause of `n * backoff_step`.
    pub backoff_step: Duration,
    /// Per-request socket timeout for loaders that make HTTP calls.
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_secs(1),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

/// TTL and retry settings for one family of reference lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDataPolicy {
    pub ttl: Duration,
    pub retry: RetryPolicy,
}

impl Default for ReferenceDataPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            retry: RetryPolicy::default(),
        }
    }
}

impl ReferenceDataPolicy {
    pub fn from_config(config: &AthenaConfig) -> Self {
        Self {
            ttl: config.cache.ttl(),
            retry: RetryPolicy {
                max_attempts: config.fetch.max_attempts.max(1),
                backoff_step: config.fetch.backoff_step(),
                request_timeout: config.fetch.request_timeout(),
            },
        }
    }
}

/// Run `loader` until it succeeds or the policy's attempts are used up.
///
/// There is no pause after the final attempt. Exhaustion yields
/// [`PluginError::UpstreamUnavailable`] wrapping the last error.
pub async fn fetch_with_retry<T, F, Fut>(
    resource: &str,
    policy: &RetryPolicy,
    mut loader: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match loader().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                let delay = policy.delay_after(attempt);
                warn!(
                    resource,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "reference fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                error!(resource, attempts, error = %e, "reference fetch exhausted retries");
                return Err(PluginError::UpstreamUnavailable {
                    resource: resource.to_string(),
                    attempts,
                    source: Box::new(e),
                });
            }
        }
    }
}

/// Return the cached value under `key`, or load it with retry and cache it
/// for `policy.ttl`.
///
/// Concurrent misses may each load independently.
pub async fn fetch_cached<T, F, Fut>(
    cache: &dyn CacheStore,
    key: &str,
    policy: &ReferenceDataPolicy,
    loader: F,
) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if let Some(cached) = cache.get(key).await {
        match serde_json::from_value(cached) {
            Ok(value) => {
                debug!(key, "reference data cache hit");
                return Ok(value);
            }
            Err(e) => warn!(key, error = %e, "discarding unreadable cache entry"),
        }
    }

    let value = fetch_with_retry(key, &policy.retry, loader).await?;
    let stored = serde_json::to_value(&value)?;
    if let Err(e) = cache
        .set(key, stored, CacheOptions::expires_in(policy.ttl))
        .await
    {
        warn!(key, error = %e, "failed to cache reference data");
    }
    Ok(value)
}

/// Loader guard: an empty list is an invalid upstream payload.
pub fn require_non_empty<T>(items: Vec<T>, what: &str) -> Result<Vec<T>> {
    if items.is_empty() {
        Err(PluginError::InvalidResponse(format!("empty {what} list received")))
    } else {
        Ok(items)
    }
}
