//! Application configuration loading and validation.
//!
//! Configuration is read from an optional TOML file, then overridden by
//! `PIPELINE_DATABASE_*` environment variables, then validated. Every field
//! has a default, so an empty file (or no file) yields a working config.
//!
//! # Example
//!
//! ```no_run
//! use stagetrack::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_or_default("stagetrack.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod logging;

use std::path::Path;

use serde::Deserialize;

pub use database::DatabaseConfig;
pub use logging::{LoggingConfig, LOG_FORMATS};

use crate::error::{ConfigError, Result};

/// Environment variable overriding [`DatabaseConfig::path`].
pub const ENV_DATABASE_PATH: &str = "PIPELINE_DATABASE_PATH";
/// Environment variable overriding [`DatabaseConfig::connect_timeout_secs`].
pub const ENV_CONNECT_TIMEOUT: &str = "PIPELINE_DATABASE_CONNECT_TIMEOUT";
/// Environment variable overriding [`DatabaseConfig::min_connections`].
pub const ENV_POOL_MIN: &str = "PIPELINE_DATABASE_POOL_MIN";
/// Environment variable overriding [`DatabaseConfig::max_connections`].
pub const ENV_POOL_MAX: &str = "PIPELINE_DATABASE_POOL_MAX";
/// Environment variable overriding [`DatabaseConfig::busy_timeout_ms`].
pub const ENV_BUSY_TIMEOUT: &str = "PIPELINE_DATABASE_BUSY_TIMEOUT_MS";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Store location and pool sizing.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content, apply environment overrides,
    /// and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML content is malformed
    /// - An environment override is not a number where one is expected
    /// - Validation fails
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or on any
    /// [`Config::parse_toml`] failure.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load from `path` if it exists, otherwise start from defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file is invalid or overrides fail.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Self::parse_toml("")
        }
    }

    /// Apply overrides from a key lookup.
    ///
    /// The lookup is injected so tests can drive it without touching the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a non-numeric value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db = &mut self.database;
        if let Some(path) = lookup(ENV_DATABASE_PATH) {
            db.path = path;
        }
        if let Some(value) = lookup(ENV_CONNECT_TIMEOUT) {
            db.connect_timeout_secs = parse_number("connect_timeout_secs", &value)?;
        }
        if let Some(value) = lookup(ENV_POOL_MIN) {
            db.min_connections = parse_number("min_connections", &value)?;
        }
        if let Some(value) = lookup(ENV_POOL_MAX) {
            db.max_connections = parse_number("max_connections", &value)?;
        }
        if let Some(value) = lookup(ENV_BUSY_TIMEOUT) {
            db.busy_timeout_ms = parse_number("busy_timeout_ms", &value)?;
        }
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found in any section.
    pub fn validate(&self) -> Result<()> {
        self.database.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Initialize the tracing subscriber.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        ConfigError::InvalidValue {
            field,
            reason: format!("expected a number, got '{value}'"),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn toml_sections_are_optional() {
        let mut config: Config = toml::from_str("").unwrap();
        config.apply_overrides(|_| None).unwrap();
        assert_eq!(config.database, DatabaseConfig::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn toml_values_are_read() {
        let config: Config = toml::from_str(
            r#"
            [database]
            path = "/var/lib/pipeline/status.db"
            max_connections = 8

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.database.path, "/var/lib/pipeline/status.db");
        assert_eq!(config.database.max_connections, 8);
        assert_eq!(config.database.min_connections, 1);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup_from(&[
                (ENV_DATABASE_PATH, "override.db"),
                (ENV_CONNECT_TIMEOUT, "3"),
                (ENV_POOL_MIN, "2"),
                (ENV_POOL_MAX, " 4 "),
                (ENV_BUSY_TIMEOUT, "250"),
            ]))
            .unwrap();
        assert_eq!(config.database.path, "override.db");
        assert_eq!(config.database.connect_timeout_secs, 3);
        assert_eq!(config.database.min_connections, 2);
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.database.busy_timeout_ms, 250);
    }

    #[test]
    fn non_numeric_override_is_invalid() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(lookup_from(&[(ENV_POOL_MAX, "five")]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "max_connections",
                ..
            })
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::parse_toml("[database\npath = 1").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Config::load("/nonexistent/stagetrack.toml").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));
    }
}
