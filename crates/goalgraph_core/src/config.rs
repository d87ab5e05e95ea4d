//! Store configuration.
//!
//! # Responsibility
//! - Describe pool sizing, timeouts and logging targets for the core.
//! - Load those values from the process environment with defaults.
//!
//! # Invariants
//! - Unset variables fall back to defaults; malformed values are rejected.
//! - `pool_size` is never zero.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

const ENV_DATABASE_PATH: &str = "GOALGRAPH_DATABASE_PATH";
const ENV_POOL_SIZE: &str = "GOALGRAPH_POOL_SIZE";
const ENV_ACQUIRE_TIMEOUT_MS: &str = "GOALGRAPH_ACQUIRE_TIMEOUT_MS";
const ENV_BUSY_TIMEOUT_MS: &str = "GOALGRAPH_BUSY_TIMEOUT_MS";
const ENV_LOG_LEVEL: &str = "GOALGRAPH_LOG_LEVEL";
const ENV_LOG_DIR: &str = "GOALGRAPH_LOG_DIR";

const DEFAULT_DATABASE_PATH: &str = "goalgraph.sqlite3";
const DEFAULT_POOL_SIZE: u32 = 8;
const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Configuration loading error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but cannot be parsed into the expected type.
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for `{key}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Connection pool and logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file. Created on first open.
    pub database_path: PathBuf,
    /// Maximum number of pooled connections.
    pub pool_size: u32,
    /// How long a request waits for a free connection.
    pub acquire_timeout_ms: u64,
    /// SQLite busy handler timeout per connection.
    pub busy_timeout_ms: u64,
    /// Log level passed to `init_logging`. `None` keeps the build default.
    pub log_level: Option<String>,
    /// Absolute log directory. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            pool_size: DEFAULT_POOL_SIZE,
            acquire_timeout_ms: DEFAULT_ACQUIRE_TIMEOUT_MS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            log_level: None,
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Loads configuration from `GOALGRAPH_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DATABASE_PATH) {
            config.database_path = PathBuf::from(path);
        }
        if let Some(value) = read(ENV_POOL_SIZE) {
            config.pool_size = parse_number::<u32>(ENV_POOL_SIZE, &value)?;
            if config.pool_size == 0 {
                return Err(ConfigError::InvalidValue {
                    key: ENV_POOL_SIZE,
                    value,
                });
            }
        }
        if let Some(value) = read(ENV_ACQUIRE_TIMEOUT_MS) {
            config.acquire_timeout_ms = parse_number(ENV_ACQUIRE_TIMEOUT_MS, &value)?;
        }
        if let Some(value) = read(ENV_BUSY_TIMEOUT_MS) {
            config.busy_timeout_ms = parse_number(ENV_BUSY_TIMEOUT_MS, &value)?;
        }
        config.log_level = read(ENV_LOG_LEVEL);
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        Ok(config)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
