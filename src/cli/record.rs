//! Handlers for the status-reporting subcommands.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use super::{Commands, FailArgs, RecordArgs, StageArgs};
use crate::adapter::outbound::sqlite::database::connection::PoolManager;
use crate::adapter::outbound::sqlite::recorder::SqliteStatusRecorder;
use crate::config::Config;
use crate::domain::{JobStatus, StatusReport};

/// Execute a parsed subcommand against the configured store.
///
/// Reporting commands are best-effort unless `--strict` is given; `migrate`
/// always fails loudly because it exists to prove the store is usable.
///
/// # Errors
/// Returns an error for a failed `migrate` or a failed `--strict` report.
pub fn execute(command: Commands, config: &Config) -> anyhow::Result<()> {
    let manager = Arc::new(PoolManager::new(config.database.clone()));
    let recorder = SqliteStatusRecorder::new(Arc::clone(&manager));

    let result = match command {
        Commands::Record(args) => report(&recorder, record_report(args)),
        Commands::Start(args) => report(&recorder, stage_report(args, JobStatus::Running)),
        Commands::Complete(args) => report(&recorder, stage_report(args, JobStatus::Completed)),
        Commands::Fail(args) => report(&recorder, fail_report(args)),
        Commands::Migrate => manager
            .init()
            .with_context(|| format!("failed to migrate {}", config.database.path))
            .map(|()| info!(path = %config.database.path, "Status table is up to date")),
    };

    manager.shutdown();
    result
}

fn report(
    recorder: &SqliteStatusRecorder,
    (report, strict): (StatusReport, bool),
) -> anyhow::Result<()> {
    if strict {
        report.validate()?;
        recorder.try_record(&report).with_context(|| {
            format!("failed to record {} for job {}", report.stage, report.job_id)
        })?;
    } else {
        recorder.record(&report);
    }
    Ok(())
}

fn stage_report(args: StageArgs, status: JobStatus) -> (StatusReport, bool) {
    let strict = args.strict;
    let mut report = StatusReport::new(args.job_id, args.series_id, args.stage, status);
    report.metadata = args.metadata;
    (report, strict)
}

fn record_report(args: RecordArgs) -> (StatusReport, bool) {
    let (mut report, strict) = stage_report(args.stage, args.status);
    report.error_message = args.error;
    (report, strict)
}

fn fail_report(args: FailArgs) -> (StatusReport, bool) {
    let (report, strict) = stage_report(args.stage, JobStatus::Failed);
    (report.with_error(args.error), strict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::domain::{Metadata, Stage};

    fn args(stage: Stage) -> StageArgs {
        StageArgs {
            job_id: "J1".into(),
            series_id: "AAPL".into(),
            stage,
            metadata: Some(Metadata::new().with("rows", 5)),
            strict: true,
        }
    }

    #[test]
    fn fail_report_carries_error_and_status() {
        let (report, strict) = fail_report(FailArgs {
            stage: args(Stage::Anomaly),
            error: "bad format".into(),
        });
        assert!(strict);
        assert_eq!(report.status, JobStatus::Failed);
        assert_eq!(report.error_message.as_deref(), Some("bad format"));
        assert!(report.metadata.is_some());
    }

    #[test]
    fn record_report_uses_given_status() {
        let (report, _) = record_report(RecordArgs {
            stage: args(Stage::Stats),
            status: JobStatus::Pending,
            error: None,
        });
        assert_eq!(report.status, JobStatus::Pending);
        assert_eq!(report.stage, Stage::Stats);
    }

    #[test]
    fn strict_report_against_unreachable_store_fails() {
        let config = Config {
            database: DatabaseConfig {
                connect_timeout_secs: 1,
                ..DatabaseConfig::with_path("/nonexistent/dir/stagetrack.db")
            },
            ..Config::default()
        };
        let result = execute(Commands::Start(args(Stage::Ingestion)), &config);
        assert!(result.is_err());
    }

    #[test]
    fn lenient_report_against_unreachable_store_succeeds() {
        let config = Config {
            database: DatabaseConfig {
                connect_timeout_secs: 1,
                ..DatabaseConfig::with_path("/nonexistent/dir/stagetrack.db")
            },
            ..Config::default()
        };
        let mut lenient = args(Stage::Ingestion);
        lenient.strict = false;
        assert!(execute(Commands::Start(lenient), &config).is_ok());
    }
}
