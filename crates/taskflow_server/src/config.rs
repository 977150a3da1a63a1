//! Layered server configuration.
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. `taskflow.toml` in the working directory, or the file named by
//!    `TASKFLOW_CONFIG`
//! 3. `TASKFLOW_*` environment variables (`TASKFLOW_BIND`,
//!    `TASKFLOW_SESSION_TTL_HOURS`, ...)

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use taskflow_core::service::auth_service::{DEFAULT_SESSION_TTL_HOURS, MAX_SESSION_TTL_HOURS};
use taskflow_core::{LogLevel, LogSpec, LoggingError};
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "TASKFLOW_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "taskflow.toml";
const ENV_PREFIX: &str = "TASKFLOW_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] figment::Error),

    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("invalid logging configuration: {0}")]
    Logging(#[from] LoggingError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address, `host:port`.
    pub bind: String,
    pub database_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rotating log files; stderr when unset.
    pub log_dir: Option<String>,
    pub session_ttl_hours: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            database_path: PathBuf::from("taskflow.sqlite3"),
            log_level: LogLevel::default_for_build().to_string(),
            log_dir: None,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }
}

impl ServerConfig {
    /// Loads and validates configuration from every source.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Provider chain, exposed so tests can inspect or extend it.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let file = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if file.exists() {
            figment = figment.merge(Toml::file(file));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        self.log_spec()?;
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database_path",
                reason: "must not be empty".to_string(),
            });
        }
        self.session_ttl()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|err| ConfigError::InvalidValue {
                field: "bind",
                reason: format!("`{}` is not a socket address: {err}", self.bind),
            })
    }

    pub fn log_spec(&self) -> Result<LogSpec, ConfigError> {
        Ok(LogSpec::parse(&self.log_level, self.log_dir.as_deref())?)
    }

    /// Session lifetime; must lie in `1..=MAX_SESSION_TTL_HOURS`.
    pub fn session_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.session_ttl_hours) {
            return Err(ConfigError::InvalidValue {
                field: "session_ttl_hours",
                reason: format!(
                    "must be between 1 and {MAX_SESSION_TTL_HOURS}, got {}",
                    self.session_ttl_hours
                ),
            });
        }
        Ok(chrono::Duration::hours(self.session_ttl_hours))
    }
}
