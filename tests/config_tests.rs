use std::fs;

use stagetrack::config::Config;
use stagetrack::error::{ConfigError, Error};
use tempfile::TempDir;

#[test]
fn loads_full_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stagetrack.toml");
    fs::write(
        &path,
        r#"
[database]
path = "/tmp/pipeline-status.db"
connect_timeout_secs = 3
min_connections = 2
max_connections = 4
busy_timeout_ms = 750

[logging]
level = "debug"
format = "json"
"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();

    assert_eq!(config.database.connect_timeout_secs, 3);
    assert_eq!(config.database.min_connections, 2);
    assert_eq!(config.database.max_connections, 4);
    assert_eq!(config.database.busy_timeout_ms, 750);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
}

#[test]
fn rejects_min_above_max() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stagetrack.toml");
    fs::write(&path, "[database]\nmin_connections = 9\nmax_connections = 2\n").unwrap();

    let err = Config::load(&path).unwrap_err();

    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidValue {
            field: "min_connections",
            ..
        })
    ));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();

    let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();

    assert_eq!(config.database.max_connections, 5);
    assert_eq!(config.database.connect_timeout_secs, 10);
    assert_eq!(config.logging.format, "pretty");
}

#[test]
fn rejects_unknown_log_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stagetrack.toml");
    fs::write(&path, "[logging]\nformat = \"xml\"\n").unwrap();

    let err = Config::load(&path).unwrap_err();

    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidValue {
            field: "logging.format",
            ..
        })
    ));
}
