//! Configuration for the sharing core
//!
//! Defaults work out of the box (in-memory store, info logging); a TOML
//! file and `GENAITED_*` environment variables override them, in that
//! order.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::logging::LogLevel;

mod error;

pub use error::ConfigError;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration
    pub storage: StorageConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Sharing behaviour knobs
    pub sharing: SharingConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file; `None` runs on a shared-cache in-memory database
    pub path: Option<PathBuf>,

    /// Maximum pooled connections
    pub pool_size: u32,

    /// How long a connection waits on a locked database
    #[serde(with = "humantime_serde")]
    pub busy_timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            pool_size: 8,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level when `RUST_LOG` is not set
    pub level: LogLevel,

    /// Emit JSON lines
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            json: false,
        }
    }
}

/// Sharing behaviour knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SharingConfig {
    /// Attempts before giving up on finding an unused passcode
    pub max_code_attempts: u32,
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            max_code_attempts: 8,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead(e.to_string()))?;
        let mut config: Config =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(path) = env::var("GENAITED_DB_PATH") {
            if path.is_empty() {
                self.storage.path = None;
            } else {
                self.storage.path = Some(PathBuf::from(path));
            }
        }
        if let Ok(size) = env::var("GENAITED_POOL_SIZE") {
            if let Ok(size) = size.parse() {
                self.storage.pool_size = size;
            }
        }
        if let Ok(level) = env::var("GENAITED_LOG_LEVEL") {
            if let Ok(level) = level.parse() {
                self.logging.level = level;
            }
        }
        if let Ok(json) = env::var("GENAITED_LOG_JSON") {
            self.logging.json = json == "1" || json.eq_ignore_ascii_case("true");
        }
        if let Ok(attempts) = env::var("GENAITED_MAX_CODE_ATTEMPTS") {
            if let Ok(attempts) = attempts.parse() {
                self.sharing.max_code_attempts = attempts;
            }
        }
    }

    /// Check invariants the rest of the crate relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.pool_size == 0 {
            return Err(ConfigError::InvalidValue(
                "storage.pool_size must be at least 1".to_string(),
            ));
        }
        if self.sharing.max_code_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "sharing.max_code_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
