//! Command-line interface definitions.

pub mod record;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::{JobStatus, Metadata, Stage};

/// Stagetrack - pipeline stage status tracker.
#[derive(Parser, Debug)]
#[command(name = "stagetrack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (optional; defaults apply when missing)
    #[arg(short, long, global = true, default_value = "stagetrack.toml")]
    pub config: PathBuf,

    /// Override log level (debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record an arbitrary status for a stage
    Record(RecordArgs),

    /// Mark a stage as running
    Start(StageArgs),

    /// Mark a stage as completed
    Complete(StageArgs),

    /// Mark a stage as failed
    Fail(FailArgs),

    /// Create or upgrade the status table
    Migrate,
}

/// Identity of the stage being reported.
#[derive(Args, Debug, Clone)]
pub struct StageArgs {
    /// Job identifier
    #[arg(long = "job")]
    pub job_id: String,

    /// Series identifier (e.g. ticker)
    #[arg(long = "series")]
    pub series_id: String,

    /// Pipeline stage (ingestion, preprocessing, forecasting, anomaly, stats)
    #[arg(long)]
    pub stage: Stage,

    /// JSON object merged into the stored metadata
    #[arg(long, value_parser = parse_metadata)]
    pub metadata: Option<Metadata>,

    /// Exit non-zero if the status could not be stored
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `record` subcommand.
#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    #[command(flatten)]
    pub stage: StageArgs,

    /// Status (pending, running, completed, failed)
    #[arg(long)]
    pub status: JobStatus,

    /// Error message to store with the status
    #[arg(long)]
    pub error: Option<String>,
}

/// Arguments for the `fail` subcommand.
#[derive(Args, Debug, Clone)]
pub struct FailArgs {
    #[command(flatten)]
    pub stage: StageArgs,

    /// Error that stopped the stage
    #[arg(long)]
    pub error: String,
}

fn parse_metadata(value: &str) -> Result<Metadata, String> {
    Metadata::from_json(value).map_err(|e| format!("metadata must be a JSON object: {e}"))
}
