// Weekly community leaderboard (mocked), ranked by units won.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use synoptic_core::{Config, DataAccess, ServiceResponse};

pub const LEADERBOARD_KEY: &str = "leaderboard:weekly";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetResult {
    Win,
    Loss,
    Push,
}

/// Run of identical results at the head of a most-recent-first history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Streak {
    Win(u32),
    Loss(u32),
    None,
}

impl Streak {
    /// A push, or an empty history, means no streak.
    pub fn from_recent(results: &[BetResult]) -> Self {
        let Some(&head) = results.first() else {
            return Streak::None;
        };
        let run = results.iter().take_while(|r| **r == head).count() as u32;
        match head {
            BetResult::Win => Streak::Win(run),
            BetResult::Loss => Streak::Loss(run),
            BetResult::Push => Streak::None,
        }
    }
}

impl std::fmt::Display for Streak {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Streak::Win(n) => write!(f, "W{n}"),
            Streak::Loss(n) => write!(f, "L{n}"),
            Streak::None => f.write_str("-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub handle: String,
    pub wins: u32,
    pub losses: u32,
    pub units_won: f64,
    /// Most recent first.
    pub recent: Vec<BetResult>,
    /// Units won per unit risked, as a percentage, at one unit per graded bet.
    pub roi: f64,
    pub streak: Streak,
}

/// Units won per graded bet as a percentage; 0 with no graded bets.
pub fn roi(units_won: f64, wins: u32, losses: u32) -> f64 {
    let graded = wins + losses;
    if graded == 0 {
        return 0.0;
    }
    units_won / f64::from(graded) * 100.0
}

/// Sort by units won (ties by handle), then assign 1-based ranks.
pub fn rank_entries(mut entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    entries.sort_by(|a, b| {
        b.units_won
            .total_cmp(&a.units_won)
            .then_with(|| a.handle.cmp(&b.handle))
    });
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    entries
}

fn entry(handle: &str, wins: u32, losses: u32, units_won: f64, recent: &[BetResult]) -> LeaderboardEntry {
    LeaderboardEntry {
        rank: 0,
        handle: handle.to_string(),
        wins,
        losses,
        units_won,
        recent: recent.to_vec(),
        roi: roi(units_won, wins, losses),
        streak: Streak::from_recent(recent),
    }
}

pub fn mock_leaderboard() -> Vec<LeaderboardEntry> {
    use BetResult::{Loss as L, Push as P, Win as W};

    rank_entries(vec![
        entry("sharpside", 31, 19, 9.4, &[W, W, W, L, W]),
        entry("fade_the_public", 27, 22, 3.1, &[L, L, W, W, P]),
        entry("overunder_oracle", 35, 28, 5.8, &[W, L, W, W, L]),
        entry("kelly_crit", 18, 12, 4.6, &[P, W, W, L, W]),
        entry("chalk_eater", 22, 29, -8.2, &[L, L, L, W, L]),
        entry("middle_man", 14, 14, -0.7, &[W, W, L, L, W]),
    ])
}

pub struct LeaderboardService {
    access: Arc<DataAccess>,
    ttl: Duration,
    latency: Duration,
}

impl LeaderboardService {
    pub fn new(access: Arc<DataAccess>, ttl: Duration, latency: Duration) -> Self {
        Self {
            access,
            ttl,
            latency,
        }
    }

    pub fn from_config(access: Arc<DataAccess>, config: &Config) -> Self {
        Self::new(access, config.cache_ttl.leaderboard(), config.mock.latency())
    }

    pub async fn weekly(&self) -> ServiceResponse<Vec<LeaderboardEntry>> {
        let latency = self.latency;
        self.access
            .fetch(LEADERBOARD_KEY, self.ttl, move || async move {
                tokio::time::sleep(latency).await;
                Ok::<_, std::convert::Infallible>(mock_leaderboard())
            })
            .await
    }
}
