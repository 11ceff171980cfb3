// Configuration loading and parsing (settings.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub bankroll: BankrollConfig,
    pub data_access: DataAccessConfig,
    pub cache_ttl: CacheTtlConfig,
    pub mock: MockConfig,
    pub parlay: ParlayConfig,
    pub llm: LlmConfig,
    pub data_paths: DataPaths,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// settings.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire settings.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SettingsFile {
    bankroll: BankrollConfig,
    #[serde(default)]
    data_access: DataAccessConfig,
    cache_ttl: CacheTtlConfig,
    #[serde(default)]
    mock: MockConfig,
    parlay: ParlayConfig,
    llm: LlmConfig,
    data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BankrollConfig {
    /// Bankroll in dollars used for stake sizing.
    pub amount: f64,
    /// Fraction of full Kelly applied to single-leg stakes.
    pub fractional_kelly: f64,
}

/// Retry budget for every data-access fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct DataAccessConfig {
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
}

impl Default for DataAccessConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base_ms: 100,
        }
    }
}

/// Per-service freshness windows in milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheTtlConfig {
    pub props_ms: u64,
    pub weather_ms: u64,
    pub leaderboard_ms: u64,
}

impl CacheTtlConfig {
    pub fn props(&self) -> Duration {
        Duration::from_millis(self.props_ms)
    }

    pub fn weather(&self) -> Duration {
        Duration::from_millis(self.weather_ms)
    }

    pub fn leaderboard(&self) -> Duration {
        Duration::from_millis(self.leaderboard_ms)
    }
}

/// Knobs for the mocked data services.
#[derive(Debug, Clone, Deserialize)]
pub struct MockConfig {
    /// Simulated round-trip latency of every mock service call.
    pub latency_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self { latency_ms: 150 }
    }
}

impl MockConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParlayConfig {
    pub max_legs: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub props: String,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub anthropic_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/settings.toml` and
/// (optionally) `config/credentials.toml`, relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- settings.toml (required) ---
    let settings_path = config_dir.join("settings.toml");
    let settings_text = read_file(&settings_path)?;
    let settings = parse_settings(&settings_text).map_err(|e| ConfigError::ParseError {
        path: settings_path.clone(),
        source: e,
    })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        bankroll: settings.bankroll,
        data_access: settings.data_access,
        cache_ttl: settings.cache_ttl,
        mock: settings.mock,
        parlay: settings.parlay,
        llm: settings.llm,
        data_paths: settings.data_paths,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Parse a settings document on its own, without credentials or validation.
fn parse_settings(text: &str) -> Result<SettingsFile, toml::de::Error> {
    toml::from_str(text)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the workspace root",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| ConfigError::DefaultsCopyError {
                message: format!("failed to read defaults entry: {e}"),
            })?
            .path();

        let Some(file_name) = path.file_name().filter(|_| path.is_file()) else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        if copy_if_absent(&path, &target)? {
            copied.push(target);
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory
/// after copying any missing defaults.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// Copy `source` to `target` unless `target` already exists. Returns whether
/// a copy happened.
fn copy_if_absent(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let copy_err = |message: String| ConfigError::DefaultsCopyError { message };

    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(mut dest) => {
            let content = std::fs::read(source)
                .map_err(|e| copy_err(format!("failed to read {}: {e}", source.display())))?;
            std::io::Write::write_all(&mut dest, &content)
                .map_err(|e| copy_err(format!("failed to write {}: {e}", target.display())))?;
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(copy_err(format!("failed to create {}: {e}", target.display()))),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message,
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let amount = config.bankroll.amount;
    if !(amount.is_finite() && amount > 0.0) {
        return Err(invalid("bankroll.amount", format!("must be > 0, got {amount}")));
    }

    let fraction = config.bankroll.fractional_kelly;
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(invalid(
            "bankroll.fractional_kelly",
            format!("must be in (0.0, 1.0], got {fraction}"),
        ));
    }

    if config.data_access.max_attempts == 0 {
        return Err(invalid(
            "data_access.max_attempts",
            "must be at least 1".into(),
        ));
    }

    if config.parlay.max_legs < 2 {
        return Err(invalid(
            "parlay.max_legs",
            format!("must be at least 2, got {}", config.parlay.max_legs),
        ));
    }

    if config.llm.max_tokens == 0 {
        return Err(invalid("llm.max_tokens", "must be > 0".into()));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
