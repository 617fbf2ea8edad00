//! SQLite stage status persistence.
//!
//! Folds status reports into the `stage_status` table, one row per
//! (job, stage). Implements the
//! [`StatusRecorder`](crate::port::outbound::status::StatusRecorder) port.
//!
//! Recording is best-effort: every failure is logged with the job, stage and
//! status it concerned, and never returned to the reporting stage.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::OptionalExtension;
use diesel::SqliteConnection;
use tracing::{error, info, warn};

use crate::adapter::outbound::sqlite::database::connection::PoolManager;
use crate::adapter::outbound::sqlite::database::model::{StageChangeset, StageRow};
use crate::adapter::outbound::sqlite::database::schema::stage_status;
use crate::domain::{JobId, Stage, StageRecord, StatusReport};
use crate::error::Result;
use crate::port::outbound::status::StatusRecorder;

/// SQLite-backed stage status recorder.
///
/// Cheap to construct; any number of recorders may share one
/// [`PoolManager`].
pub struct SqliteStatusRecorder {
    /// Shared connection pool.
    pool: Arc<PoolManager>,
}

impl SqliteStatusRecorder {
    /// Create a new status recorder over the given pool manager.
    #[must_use]
    pub fn new(pool: Arc<PoolManager>) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &Arc<PoolManager> {
        &self.pool
    }

    /// Record a status report, absorbing and logging any failure.
    pub fn record(&self, report: &StatusReport) {
        if let Err(e) = report.validate() {
            warn!(
                error = %e,
                job_id = %report.job_id,
                stage = %report.stage,
                status = %report.status,
                "Rejected invalid status report"
            );
            return;
        }

        match self.try_record(report) {
            Ok(record) => {
                info!(
                    job_id = %record.job_id,
                    stage = %record.stage,
                    status = %record.status,
                    "Job {}: {} at {}",
                    record.job_id,
                    record.status,
                    record.stage
                );
            }
            Err(e) => {
                error!(
                    error = %e,
                    job_id = %report.job_id,
                    stage = %report.stage,
                    status = %report.status,
                    "Failed to record stage status"
                );
            }
        }
    }

    /// Record a status report, returning the stored record or the error.
    ///
    /// The connection is returned to the pool on every path.
    ///
    /// # Errors
    /// Returns pool acquisition, database, or stored-row decoding errors.
    /// The transaction is rolled back on any of the latter two.
    pub fn try_record(&self, report: &StatusReport) -> Result<StageRecord> {
        let mut conn = self.pool.acquire()?;
        let now = Utc::now();
        conn.immediate_transaction(|conn| upsert_with_conn(conn, report, now))
    }
}

/// Load the stored record for a key, if any.
///
/// # Errors
/// Returns a database error or a decoding error for a corrupt row.
pub fn load_with_conn(
    conn: &mut SqliteConnection,
    job_id: &JobId,
    stage: Stage,
) -> Result<Option<StageRecord>> {
    let row: Option<StageRow> = stage_status::table
        .find((job_id.as_str(), stage.as_str()))
        .select(StageRow::as_select())
        .first(conn)
        .optional()?;
    row.map(StageRecord::try_from).transpose()
}

/// Merge `report` into the stored row for its key and write the result.
///
/// Callers must hold a write transaction so the read and the write see the
/// same row.
///
/// # Errors
/// Returns a database error or a decoding error for a corrupt row.
pub fn upsert_with_conn(
    conn: &mut SqliteConnection,
    report: &StatusReport,
    now: DateTime<Utc>,
) -> Result<StageRecord> {
    let existing = load_with_conn(conn, &report.job_id, report.stage)?;
    let record = StageRecord::upsert(existing, report, now);
    let row = StageRow::try_from(&record)?;

    diesel::insert_into(stage_status::table)
        .values(&row)
        .on_conflict((stage_status::job_id, stage_status::stage))
        .do_update()
        .set(&StageChangeset::from(&row))
        .execute(conn)?;

    Ok(record)
}

impl StatusRecorder for SqliteStatusRecorder {
    fn record(&self, report: &StatusReport) {
        SqliteStatusRecorder::record(self, report);
    }

    fn shutdown(&self) {
        self.pool.shutdown();
    }
}

/// Create a status recorder over a shared pool manager.
#[must_use]
pub fn create_recorder(pool: Arc<PoolManager>) -> Arc<dyn StatusRecorder> {
    Arc::new(SqliteStatusRecorder::new(pool))
}
