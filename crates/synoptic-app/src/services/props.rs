// Player-prop board: a CSV-backed mock feed fetched through the data-access
// layer under a single cache key.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use synoptic_core::{Config, DataAccess, ServiceResponse};
use synoptic_quant::error::validate_american_odds;
use tracing::{debug, warn};

pub const PROPS_KEY: &str = "props:board";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One posted over/under line for a player stat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProp {
    pub id: String,
    pub player: String,
    pub team: String,
    pub opponent: String,
    /// Stat being offered, e.g. "Passing Yards".
    pub market: String,
    pub line: f64,
    pub over_odds: f64,
    pub under_odds: f64,
    /// Model projection for the stat.
    pub projection: f64,
    /// Standard deviation of the projection.
    pub std_dev: f64,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PropsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("props CSV {0} produced zero valid rows")]
    Empty(String),
}

// ---------------------------------------------------------------------------
// CSV loading
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawProp {
    id: String,
    player: String,
    #[serde(default)]
    team: String,
    #[serde(default)]
    opponent: String,
    market: String,
    line: f64,
    over_odds: f64,
    under_odds: f64,
    projection: f64,
    std_dev: f64,
}

fn load_props_from_reader<R: Read>(rdr: R) -> Result<Vec<PlayerProp>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut props = Vec::new();
    for result in reader.deserialize::<RawProp>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed prop row: {}", e);
                continue;
            }
        };
        if ![raw.line, raw.projection, raw.std_dev].iter().all(|v| v.is_finite()) {
            warn!("skipping prop '{}': non-finite line/projection/std_dev", raw.id);
            continue;
        }
        if let Err(e) = validate_american_odds(raw.over_odds)
            .and_then(|_| validate_american_odds(raw.under_odds))
        {
            warn!("skipping prop '{}': {}", raw.id, e);
            continue;
        }
        props.push(PlayerProp {
            id: raw.id,
            player: raw.player,
            team: raw.team,
            opponent: raw.opponent,
            market: raw.market,
            line: raw.line,
            over_odds: raw.over_odds,
            under_odds: raw.under_odds,
            projection: raw.projection,
            std_dev: raw.std_dev,
        });
    }
    Ok(props)
}

/// Load the prop board from a CSV file. Malformed rows are skipped; a file
/// with no usable rows is an error.
pub fn load_props(path: &Path) -> Result<Vec<PlayerProp>, PropsError> {
    let file = std::fs::File::open(path).map_err(|e| PropsError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let props = load_props_from_reader(file).map_err(|e| PropsError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if props.is_empty() {
        return Err(PropsError::Empty(path.display().to_string()));
    }
    Ok(props)
}

// ---------------------------------------------------------------------------
// Sources and service
// ---------------------------------------------------------------------------

/// Where the board comes from.
#[async_trait]
pub trait PropSource: Send + Sync {
    async fn load(&self) -> Result<Vec<PlayerProp>, PropsError>;
}

/// Reads the board from a CSV file after a simulated network delay.
pub struct CsvPropSource {
    path: PathBuf,
    latency: Duration,
}

impl CsvPropSource {
    pub fn new(path: impl Into<PathBuf>, latency: Duration) -> Self {
        Self {
            path: path.into(),
            latency,
        }
    }
}

#[async_trait]
impl PropSource for CsvPropSource {
    async fn load(&self) -> Result<Vec<PlayerProp>, PropsError> {
        tokio::time::sleep(self.latency).await;
        let props = load_props(&self.path)?;
        debug!(count = props.len(), path = %self.path.display(), "loaded props");
        Ok(props)
    }
}

pub struct PropsService {
    access: Arc<DataAccess>,
    source: Arc<dyn PropSource>,
    ttl: Duration,
}

impl PropsService {
    pub fn new(access: Arc<DataAccess>, source: Arc<dyn PropSource>, ttl: Duration) -> Self {
        Self {
            access,
            source,
            ttl,
        }
    }

    pub fn from_config(access: Arc<DataAccess>, config: &Config) -> Self {
        let source = CsvPropSource::new(&config.data_paths.props, config.mock.latency());
        Self::new(access, Arc::new(source), config.cache_ttl.props())
    }

    pub async fn board(&self) -> ServiceResponse<Vec<PlayerProp>> {
        let source = &self.source;
        self.access
            .fetch(PROPS_KEY, self.ttl, move || source.load())
            .await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use synoptic_core::{DataStatus, RetryPolicy};

    const HEADER: &str =
        "id,player,team,opponent,market,line,over_odds,under_odds,projection,std_dev\n";

    fn csv(rows: &str) -> String {
        format!("{HEADER}{rows}")
    }

    #[test]
    fn parses_well_formed_rows() {
        let data = csv(
            "mahomes-pass-yds,Patrick Mahomes,KC,BUF,Passing Yards,274.5,-115,-105,289.0,38.0\n\
             allen-rush-yds,Josh Allen,BUF,KC,Rushing Yards,38.5,-110,-110,41.2,14.5\n",
        );
        let props = load_props_from_reader(data.as_bytes()).unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(props[0].id, "mahomes-pass-yds");
        assert_eq!(props[0].over_odds, -115.0);
        assert_eq!(props[1].projection, 41.2);
    }

    #[test]
    fn whitespace_is_trimmed() {
        let data = csv(" kelce-rec , Travis Kelce , KC , BUF , Receptions , 5.5 , +105 , -125 , 6.1 , 1.8\n");
        let props = load_props_from_reader(data.as_bytes()).unwrap();
        assert_eq!(props[0].player, "Travis Kelce");
        assert_eq!(props[0].over_odds, 105.0);
    }

    #[test]
    fn malformed_rows_skipped() {
        let data = csv(
            "good,Player A,KC,BUF,Receptions,4.5,-110,-110,5.0,1.5\n\
             bad-line,Player B,KC,BUF,Receptions,not_a_number,-110,-110,5.0,1.5\n\
             bad-odds,Player C,KC,BUF,Receptions,4.5,-50,-110,5.0,1.5\n\
             nan-proj,Player D,KC,BUF,Receptions,4.5,-110,-110,NaN,1.5\n",
        );
        let props = load_props_from_reader(data.as_bytes()).unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].id, "good");
    }

    #[test]
    fn empty_csv_returns_empty_vec() {
        let props = load_props_from_reader(HEADER.as_bytes()).unwrap();
        assert!(props.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_props(Path::new("/nonexistent/props.csv")).unwrap_err();
        assert!(matches!(err, PropsError::Io { .. }));
    }

    #[test]
    fn file_without_valid_rows_is_empty_error() {
        let dir = std::env::temp_dir().join("synoptic_props_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("props.csv");
        std::fs::write(&path, HEADER).unwrap();

        let err = load_props(&path).unwrap_err();
        assert!(matches!(err, PropsError::Empty(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    /// Serves a fixed board until switched off.
    struct ToggleSource {
        up: AtomicBool,
    }

    #[async_trait]
    impl PropSource for ToggleSource {
        async fn load(&self) -> Result<Vec<PlayerProp>, PropsError> {
            if self.up.load(Ordering::SeqCst) {
                let data = csv("a,Player A,KC,BUF,Receptions,4.5,-110,-110,5.0,1.5\n");
                Ok(load_props_from_reader(data.as_bytes()).unwrap())
            } else {
                Err(PropsError::Empty("feed".into()))
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn board_is_cached_then_served_stale_when_feed_fails() {
        let clock = Arc::new(synoptic_core::ManualClock::default());
        let access = Arc::new(DataAccess::with_clock(RetryPolicy::default(), clock.clone()));
        let source = Arc::new(ToggleSource {
            up: AtomicBool::new(true),
        });
        let service = PropsService::new(access, source.clone(), Duration::from_secs(30));

        assert_eq!(service.board().await.status, DataStatus::Live);
        assert_eq!(service.board().await.status, DataStatus::Cached);

        source.up.store(false, Ordering::SeqCst);
        clock.advance(Duration::from_secs(31));
        let stale = service.board().await;
        assert_eq!(stale.status, DataStatus::Stale);
        assert_eq!(stale.data.map(|b| b.len()), Some(1));
    }
}
