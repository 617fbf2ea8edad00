//! Stagetrack - pipeline stage status tracking.
//!
//! Independent pipeline stages (ingestion, preprocessing, forecasting,
//! anomaly detection, statistics) report their lifecycle into a shared
//! SQLite store. Each (job, stage) pair owns one row; repeated reports are
//! merged into it rather than appended.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML files and environment
//! - [`domain`] - Reports, stored records, and the upsert merge policy
//! - [`port`] - The [`StatusRecorder`](port::outbound::status::StatusRecorder) trait
//! - [`adapter`] - SQLite pool manager and recorder
//! - [`error`] - Error types for the crate
//! - [`cli`] - Command-line interface for shell-driven pipelines
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use stagetrack::adapter::outbound::sqlite::database::connection::PoolManager;
//! use stagetrack::adapter::outbound::sqlite::recorder::create_recorder;
//! use stagetrack::config::DatabaseConfig;
//! use stagetrack::domain::{Metadata, Stage};
//!
//! let pool = Arc::new(PoolManager::new(DatabaseConfig::with_path("pipeline.db")));
//! let tracker = create_recorder(Arc::clone(&pool));
//!
//! tracker.start_stage("J1", "AAPL", Stage::Ingestion, None);
//! tracker.complete_stage("J1", "AAPL", Stage::Ingestion, Some(Metadata::new().with("rows", 100)));
//! tracker.shutdown();
//! ```

pub mod adapter;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
