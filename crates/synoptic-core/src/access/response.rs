// Freshness-tagged response returned by every data-access fetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How fresh the data in a [`ServiceResponse`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataStatus {
    /// Just fetched from the producer.
    Live,
    /// Served from a cache entry still inside its TTL.
    Cached,
    /// The producer failed; this is the last good value, past its TTL.
    Stale,
    /// The producer failed and nothing was cached.
    Unavailable,
}

impl std::fmt::Display for DataStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DataStatus::Live => "live",
            DataStatus::Cached => "cached",
            DataStatus::Stale => "stale",
            DataStatus::Unavailable => "unavailable",
        };
        f.write_str(label)
    }
}

/// Result of a data-access call. Failures are carried in `status` and
/// `error`; an unavailable response never carries data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse<T> {
    pub data: Option<T>,
    pub status: DataStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ServiceResponse<T> {
    pub fn live(data: T, fetched_at: DateTime<Utc>) -> Self {
        Self {
            data: Some(data),
            status: DataStatus::Live,
            last_updated: Some(fetched_at),
            error: None,
        }
    }

    pub fn cached(data: T, fetched_at: DateTime<Utc>) -> Self {
        Self {
            data: Some(data),
            status: DataStatus::Cached,
            last_updated: Some(fetched_at),
            error: None,
        }
    }

    pub fn stale(data: T, fetched_at: DateTime<Utc>, error: String) -> Self {
        Self {
            data: Some(data),
            status: DataStatus::Stale,
            last_updated: Some(fetched_at),
            error: Some(error),
        }
    }

    pub fn unavailable(error: String) -> Self {
        Self {
            data: None,
            status: DataStatus::Unavailable,
            last_updated: None,
            error: Some(error),
        }
    }

    /// True for live and cached responses.
    pub fn is_fresh(&self) -> bool {
        matches!(self.status, DataStatus::Live | DataStatus::Cached)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ServiceResponse<U> {
        ServiceResponse {
            data: self.data.map(f),
            status: self.status,
            last_updated: self.last_updated,
            error: self.error,
        }
    }
}
