// Keyed response cache shared by every service behind one `DataAccess`.
//
// Entries of different payload types live side by side: each value is stored
// type-erased and downcast on read. Entries are overwritten on refresh and
// never evicted; they live as long as the cache instance.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::warn;

/// A cached value with the time it was fetched and the time it goes stale.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Entry fetched at `timestamp` that stays fresh for `ttl`.
    pub fn new(data: T, timestamp: DateTime<Utc>, ttl: Duration) -> Self {
        let expires = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| timestamp.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            data,
            timestamp,
            expires,
        }
    }

    /// Fresh strictly before `expires`; a zero TTL is never fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires
    }
}

/// What the cache holds for a key at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Missing,
    Fresh,
    Expired,
}

type Payload = Arc<dyn Any + Send + Sync>;

/// Thread-safe map from cache key to the latest successful fetch.
#[derive(Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry<Payload>>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<Payload>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self, key: &str, now: DateTime<Utc>) -> CacheState {
        match self.lock().get(key) {
            None => CacheState::Missing,
            Some(entry) if entry.is_fresh(now) => CacheState::Fresh,
            Some(_) => CacheState::Expired,
        }
    }

    /// Typed copy of the entry under `key`. An entry holding a different
    /// payload type reads as absent.
    pub fn get<T>(&self, key: &str) -> Option<CacheEntry<T>>
    where
        T: Clone + 'static,
    {
        let entries = self.lock();
        let entry = entries.get(key)?;
        match entry.data.downcast_ref::<T>() {
            Some(data) => Some(CacheEntry {
                data: data.clone(),
                timestamp: entry.timestamp,
                expires: entry.expires,
            }),
            None => {
                warn!(key, "cache entry holds a different payload type; ignoring it");
                None
            }
        }
    }

    /// Store `entry` under `key`, replacing whatever was there.
    pub fn insert<T>(&self, key: &str, entry: CacheEntry<T>)
    where
        T: Send + Sync + 'static,
    {
        let erased = CacheEntry {
            data: Arc::new(entry.data) as Payload,
            timestamp: entry.timestamp,
            expires: entry.expires,
        };
        self.lock().insert(key.to_string(), erased);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<String> = self.lock().keys().cloned().collect();
        f.debug_struct("ResponseCache").field("keys", &keys).finish()
    }
}
