// Game-day weather per venue. Conditions are mocked deterministically from the
// venue code so repeated runs print the same board.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use synoptic_core::{Config, DataAccess, ServiceResponse};
use thiserror::Error;

/// Home venues by team code, with whether the stadium is enclosed.
const VENUES: &[(&str, &str, bool)] = &[
    ("ARI", "State Farm Stadium", true),
    ("ATL", "Mercedes-Benz Stadium", true),
    ("BAL", "M&T Bank Stadium", false),
    ("BUF", "Highmark Stadium", false),
    ("CHI", "Soldier Field", false),
    ("CIN", "Paycor Stadium", false),
    ("DAL", "AT&T Stadium", true),
    ("DEN", "Empower Field at Mile High", false),
    ("DET", "Ford Field", true),
    ("GB", "Lambeau Field", false),
    ("HOU", "NRG Stadium", true),
    ("KC", "GEHA Field at Arrowhead Stadium", false),
    ("LV", "Allegiant Stadium", true),
    ("MIA", "Hard Rock Stadium", false),
    ("MIN", "U.S. Bank Stadium", true),
    ("NO", "Caesars Superdome", true),
    ("PHI", "Lincoln Financial Field", false),
    ("SF", "Levi's Stadium", false),
];

pub fn weather_key(venue: &str) -> String {
    format!("weather:{venue}")
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How much the conditions should move outdoor stat projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherImpact {
    None,
    Minor,
    Significant,
}

impl WeatherImpact {
    pub fn classify(wind_mph: f64, precipitation_pct: f64, dome: bool) -> Self {
        if dome {
            WeatherImpact::None
        } else if wind_mph >= 20.0 || precipitation_pct >= 60.0 {
            WeatherImpact::Significant
        } else if wind_mph >= 12.0 || precipitation_pct >= 30.0 {
            WeatherImpact::Minor
        } else {
            WeatherImpact::None
        }
    }
}

impl std::fmt::Display for WeatherImpact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            WeatherImpact::None => "none",
            WeatherImpact::Minor => "minor",
            WeatherImpact::Significant => "significant",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    /// Team code of the home venue.
    pub venue: String,
    pub stadium: String,
    pub temperature_f: f64,
    pub wind_mph: f64,
    pub precipitation_pct: f64,
    pub dome: bool,
    pub impact: WeatherImpact,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("no weather station for venue `{0}`")]
    UnknownVenue(String),
}

// ---------------------------------------------------------------------------
// Mock feed
// ---------------------------------------------------------------------------

/// FNV-1a over the venue code; seeds the mock conditions.
fn seed(venue: &str) -> u64 {
    venue.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Deterministic conditions for `venue`. Enclosed stadiums report a
/// climate-controlled 72°F with no wind or precipitation.
pub fn mock_weather(venue: &str) -> Result<Weather, WeatherError> {
    let (code, stadium, dome) = VENUES
        .iter()
        .find(|(code, _, _)| code.eq_ignore_ascii_case(venue))
        .ok_or_else(|| WeatherError::UnknownVenue(venue.to_string()))?;

    let (temperature_f, wind_mph, precipitation_pct) = if *dome {
        (72.0, 0.0, 0.0)
    } else {
        let s = seed(code);
        (
            (20 + s % 66) as f64,
            ((s >> 8) % 26) as f64,
            ((s >> 16) % 9 * 10) as f64,
        )
    };

    Ok(Weather {
        venue: code.to_string(),
        stadium: stadium.to_string(),
        temperature_f,
        wind_mph,
        precipitation_pct,
        dome: *dome,
        impact: WeatherImpact::classify(wind_mph, precipitation_pct, *dome),
    })
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct WeatherService {
    access: Arc<DataAccess>,
    ttl: Duration,
    latency: Duration,
}

impl WeatherService {
    pub fn new(access: Arc<DataAccess>, ttl: Duration, latency: Duration) -> Self {
        Self {
            access,
            ttl,
            latency,
        }
    }

    pub fn from_config(access: Arc<DataAccess>, config: &Config) -> Self {
        Self::new(access, config.cache_ttl.weather(), config.mock.latency())
    }

    pub async fn for_venue(&self, venue: &str) -> ServiceResponse<Weather> {
        let key = weather_key(venue);
        let latency = self.latency;
        self.access
            .fetch(&key, self.ttl, move || async move {
                tokio::time::sleep(latency).await;
                mock_weather(venue)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synoptic_core::{DataStatus, RetryPolicy};

    #[test]
    fn impact_thresholds() {
        assert_eq!(WeatherImpact::classify(25.0, 90.0, true), WeatherImpact::None);
        assert_eq!(WeatherImpact::classify(20.0, 0.0, false), WeatherImpact::Significant);
        assert_eq!(WeatherImpact::classify(0.0, 60.0, false), WeatherImpact::Significant);
        assert_eq!(WeatherImpact::classify(12.0, 0.0, false), WeatherImpact::Minor);
        assert_eq!(WeatherImpact::classify(5.0, 30.0, false), WeatherImpact::Minor);
        assert_eq!(WeatherImpact::classify(11.9, 29.9, false), WeatherImpact::None);
    }

    #[test]
    fn domes_are_climate_controlled() {
        let w = mock_weather("MIN").unwrap();
        assert!(w.dome);
        assert_eq!(w.wind_mph, 0.0);
        assert_eq!(w.impact, WeatherImpact::None);
    }

    #[test]
    fn outdoor_conditions_are_deterministic_and_in_range() {
        let a = mock_weather("GB").unwrap();
        let b = mock_weather("gb").unwrap();
        assert_eq!(a, b);
        assert!((20.0..=85.0).contains(&a.temperature_f));
        assert!((0.0..=25.0).contains(&a.wind_mph));
        assert!((0.0..=80.0).contains(&a.precipitation_pct));
        assert_eq!(
            a.impact,
            WeatherImpact::classify(a.wind_mph, a.precipitation_pct, false)
        );
    }

    #[test]
    fn unknown_venue_is_an_error() {
        assert_eq!(
            mock_weather("LON"),
            Err(WeatherError::UnknownVenue("LON".into()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_venue_is_unavailable_after_retries() {
        let access = Arc::new(DataAccess::new(RetryPolicy::default()));
        let service = WeatherService::new(access, Duration::from_secs(300), Duration::ZERO);

        let resp = service.for_venue("LON").await;
        assert_eq!(resp.status, DataStatus::Unavailable);
        assert!(resp.error.unwrap().contains("LON"));
    }

    #[tokio::test(start_paused = true)]
    async fn venues_are_cached_under_their_own_keys() {
        let access = Arc::new(DataAccess::new(RetryPolicy::default()));
        let service =
            WeatherService::new(access.clone(), Duration::from_secs(300), Duration::from_millis(150));

        assert_eq!(service.for_venue("KC").await.status, DataStatus::Live);
        assert_eq!(service.for_venue("KC").await.status, DataStatus::Cached);
        assert_eq!(service.for_venue("BUF").await.status, DataStatus::Live);
        assert_eq!(access.cache().len(), 2);
    }
}
