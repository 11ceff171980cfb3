// Resilient data access: TTL caching, retries with exponential backoff, and
// stale-data fallback around an arbitrary async producer.
//
// Per key, a fetch moves through these cases:
// 1. fresh entry          -> return it as `cached`, producer not called
// 2. missing or expired   -> try the producer up to `max_attempts` times
//    success              -> overwrite the entry, return `live`
// 3. all attempts failed, entry present -> return it as `stale`
// 4. all attempts failed, no entry      -> return `unavailable`
//
// Concurrent misses on the same key are not de-duplicated; each call runs
// its own producer attempts.

pub mod cache;
pub mod response;
pub mod retry;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
pub use cache::{CacheEntry, CacheState, ResponseCache};
pub use response::{DataStatus, ServiceResponse};
pub use retry::RetryPolicy;

/// Cache + retry policy + clock. Construct one per process (or per test) and
/// share it behind an `Arc`.
pub struct DataAccess {
    cache: ResponseCache,
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl DataAccess {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: RetryPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: ResponseCache::new(),
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Fetch the value for `key`, calling `producer` only when the cached
    /// entry is missing or older than `ttl`.
    ///
    /// Never fails: producer errors are logged per attempt and, once the
    /// retry budget is spent, reported through the response status.
    pub async fn fetch<T, F, Fut, E>(&self, key: &str, ttl: Duration, producer: F) -> ServiceResponse<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let prior = self.cache.get::<T>(key);
        if let Some(entry) = &prior {
            if entry.is_fresh(self.clock.now()) {
                debug!(key, "cache hit");
                return ServiceResponse::cached(entry.data.clone(), entry.timestamp);
            }
            debug!(key, "cache entry expired; refetching");
        }

        let max_attempts = self.policy.max_attempts;
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            match producer().await {
                Ok(data) => {
                    let fetched_at = self.clock.now();
                    self.cache
                        .insert(key, CacheEntry::new(data.clone(), fetched_at, ttl));
                    info!(key, attempt, "fetched live data");
                    return ServiceResponse::live(data, fetched_at);
                }
                Err(e) => {
                    last_error = e.to_string();
                    warn!(key, attempt, max_attempts, error = %last_error, "fetch attempt failed");
                    if self.policy.has_next(attempt) {
                        tokio::time::sleep(self.policy.backoff(attempt)).await;
                    }
                }
            }
        }

        match prior {
            Some(entry) => {
                warn!(key, "all attempts failed; serving stale data");
                let message = format!(
                    "Live data unavailable ({last_error}); showing data from {}",
                    entry.timestamp.to_rfc3339()
                );
                ServiceResponse::stale(entry.data, entry.timestamp, message)
            }
            None => {
                error!(key, "all attempts failed and nothing is cached");
                ServiceResponse::unavailable(format!(
                    "Data unavailable after {max_attempts} attempts: {last_error}"
                ))
            }
        }
    }
}

impl std::fmt::Debug for DataAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataAccess")
            .field("cache", &self.cache)
            .field("policy", &self.policy)
            .finish()
    }
}
