// Mock data feeds. Every service fetches through one shared `DataAccess`, so
// all of them get the same caching, retry and stale-fallback behaviour.

pub mod leaderboard;
pub mod props;
pub mod weather;

use std::sync::Arc;

use synoptic_core::{Config, DataAccess, RetryPolicy};

pub use leaderboard::{LeaderboardEntry, LeaderboardService, Streak};
pub use props::{PlayerProp, PropsError, PropsService};
pub use weather::{Weather, WeatherImpact, WeatherService};

pub struct Services {
    pub props: PropsService,
    pub weather: WeatherService,
    pub leaderboard: LeaderboardService,
}

impl Services {
    /// Build every service over a fresh `DataAccess` configured from `config`.
    pub fn from_config(config: &Config) -> Self {
        let access = Arc::new(DataAccess::new(RetryPolicy::from_config(&config.data_access)));
        Self::with_access(config, access)
    }

    pub fn with_access(config: &Config, access: Arc<DataAccess>) -> Self {
        Self {
            props: PropsService::from_config(Arc::clone(&access), config),
            weather: WeatherService::from_config(Arc::clone(&access), config),
            leaderboard: LeaderboardService::from_config(access, config),
        }
    }
}
