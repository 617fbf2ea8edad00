//! Database and connection pool configuration.

use serde::Deserialize;

use crate::error::ConfigError;

/// SQLite store and pool sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file (or `:memory:`).
    #[serde(default = "default_path")]
    pub path: String,
    /// Upper bound on waiting for a connection, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Idle connections kept open once the pool is initialized.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Maximum connections checked out at once.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// SQLite `busy_timeout` applied to every connection (milliseconds).
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,
}

fn default_path() -> String {
    "pipeline.db".to_string()
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

const fn default_min_connections() -> u32 {
    1
}

const fn default_max_connections() -> u32 {
    5
}

const fn default_busy_timeout_ms() -> u32 {
    5000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            connect_timeout_secs: default_connect_timeout_secs(),
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl DatabaseConfig {
    /// Config pointing at the given database path, defaults elsewhere.
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Check pool bounds before they reach r2d2, which panics on bad sizes.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "path" });
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "connect_timeout_secs",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_connections",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigError::InvalidValue {
                field: "min_connections",
                reason: "must be <= max_connections".to_string(),
            });
        }
        Ok(())
    }
}
