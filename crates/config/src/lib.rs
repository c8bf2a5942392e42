use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Environment variable naming a YAML configuration file
pub const CONFIG_FILE_ENV: &str = "ICN_COMMITTEE_CONFIG";

/// Errors that can occur in configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidEnvVar(String, String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read file: {0}")]
    FileReadError(String),

    #[error("Failed to parse YAML: {0}")]
    YamlParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Node configuration for the committee state machine runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Genesis state to load before the first block
    #[serde(default)]
    pub genesis_file: Option<PathBuf>,
    /// Seconds between consecutive blocks when a scenario does not pin times
    #[serde(default = "default_block_time_secs")]
    pub block_time_secs: u64,
    /// Time of the first block
    #[serde(default = "default_genesis_time")]
    pub genesis_time: DateTime<Utc>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_block_time_secs() -> u64 {
    6
}

fn default_genesis_time() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            genesis_file: None,
            block_time_secs: default_block_time_secs(),
            genesis_time: default_genesis_time(),
        }
    }
}

impl NodeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// If `ICN_COMMITTEE_CONFIG` names an existing file it is loaded as is,
    /// otherwise individual `ICN_*` variables override the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(CONFIG_FILE_ENV) {
            if Path::new(&path).exists() {
                return Self::from_file(&path);
            }
            return Err(ConfigError::FileNotFound(path));
        }

        let mut config = NodeConfig::default();

        if let Some(level) = lookup("ICN_LOG_LEVEL") {
            config.log_level = level;
        }
        if let Some(path) = lookup("ICN_GENESIS_FILE") {
            config.genesis_file = Some(PathBuf::from(path));
        }
        if let Some(secs) = lookup("ICN_BLOCK_TIME_SECS") {
            config.block_time_secs = secs
                .parse::<u64>()
                .map_err(|e| {
                    ConfigError::InvalidEnvVar("ICN_BLOCK_TIME_SECS".to_string(), e.to_string())
                })?;
        }
        if let Some(time) = lookup("ICN_GENESIS_TIME") {
            config.genesis_time = DateTime::parse_from_rfc3339(&time)
                .map_err(|e| {
                    ConfigError::InvalidEnvVar("ICN_GENESIS_TIME".to_string(), e.to_string())
                })?
                .with_timezone(&Utc);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let contents = fs::read_to_string(path).map_err(|e| {
            ConfigError::FileReadError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: NodeConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_time_secs == 0 {
            return Err(ConfigError::Invalid("block_time_secs must be positive".to_string()));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!("unknown log level {}", self.log_level)));
        }
        Ok(())
    }
}
