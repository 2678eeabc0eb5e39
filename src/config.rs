//! Configuration
//!
//! `EngineConfig` is layered from built-in defaults, an optional TOML file
//! and `KANBAN_ORDER__<SECTION>__<KEY>` environment variables, e.g.
//! `KANBAN_ORDER__ORDERING__INDEX_POLICY=reject`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::domain::IndexPolicy;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigurationError>;

const ENV_PREFIX: &str = "KANBAN_ORDER";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file, or `:memory:`
    pub path: PathBuf,
    /// How long a transaction waits for the write lock
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("kanban_order.db"),
            busy_timeout_ms: 5_000,
        }
    }
}

impl DatabaseConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingConfig {
    pub index_policy: IndexPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub app_name: String,
    pub filter: String,
    pub max_file_bytes: u64,
    pub max_files: usize,
    pub buffer_lines: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let options = rolling_logger::LoggerOptions::default();
        Self {
            directory: PathBuf::from("logs"),
            app_name: "KanbanOrder".to_string(),
            filter: options.filter,
            max_file_bytes: options.max_file_bytes,
            max_files: options.max_files,
            buffer_lines: options.buffer_lines,
        }
    }
}

impl LoggingConfig {
    pub fn logger_options(&self) -> rolling_logger::LoggerOptions {
        rolling_logger::LoggerOptions {
            max_file_bytes: self.max_file_bytes,
            max_files: self.max_files,
            buffer_lines: self.buffer_lines,
            filter: self.filter.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub database: DatabaseConfig,
    pub ordering: OrderingConfig,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load from defaults, `path` (if given) and the process environment
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with_env(path, None)
    }

    /// Like `load`, but read environment overrides from `env` instead of the
    /// process environment when it is `Some`
    pub fn load_with_env(path: Option<&Path>, env: Option<config::Map<String, String>>) -> ConfigResult<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&EngineConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: EngineConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        log::debug!(
            "Configuration loaded: {}",
            serde_json::to_string(&config).unwrap_or_else(|_| "[serialization error]".to_string())
        );
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigurationError::Invalid("database.path must not be empty".to_string()));
        }
        if self.logging.app_name.trim().is_empty() {
            return Err(ConfigurationError::Invalid("logging.app_name must not be empty".to_string()));
        }
        if self.logging.max_file_bytes == 0 {
            return Err(ConfigurationError::Invalid("logging.max_file_bytes must be positive".to_string()));
        }
        Ok(())
    }
}

/// Install the rolling file logger described by `config`
pub fn init_logging(config: &LoggingConfig) -> Result<(), rolling_logger::LoggerError> {
    rolling_logger::init_logger_with(config.directory.clone(), &config.app_name, config.logger_options())
}
