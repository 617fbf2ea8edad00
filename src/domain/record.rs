//! The persisted view of one stage of one job.
//!
//! [`StageRecord::upsert`] is the whole merge policy. Storage adapters load
//! the current record (if any), call it, and write the result back inside
//! one write transaction.

use chrono::{DateTime, Utc};

use super::id::{JobId, SeriesId};
use super::metadata::Metadata;
use super::report::StatusReport;
use super::stage::{JobStatus, Stage};

/// Stored state for a (job, stage) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct StageRecord {
    pub job_id: JobId,
    pub series_id: SeriesId,
    pub stage: Stage,
    pub status: JobStatus,
    pub error_message: Option<String>,
    pub metadata: Option<Metadata>,
    /// First write for this key. Never changes afterwards.
    pub started_at: DateTime<Utc>,
    /// Entry into a terminal status. Never cleared.
    pub completed_at: Option<DateTime<Utc>>,
    /// Most recent write.
    pub updated_at: DateTime<Utc>,
}

impl StageRecord {
    /// Record created by the first report for a key.
    #[must_use]
    pub fn from_report(report: &StatusReport, now: DateTime<Utc>) -> Self {
        Self {
            job_id: report.job_id.clone(),
            series_id: report.series_id.clone(),
            stage: report.stage,
            status: report.status,
            error_message: report.error_message.clone(),
            metadata: Metadata::merge_optional(None, report.metadata.clone()),
            started_at: now,
            completed_at: report.status.is_terminal().then_some(now),
            updated_at: now,
        }
    }

    /// Fold a later report into this record.
    ///
    /// `status` and `error_message` are overwritten, metadata is merged,
    /// `started_at` and `series_id` are kept. `completed_at` is stamped when
    /// the record enters a terminal status and left alone otherwise.
    #[must_use]
    pub fn apply(self, report: &StatusReport, now: DateTime<Utc>) -> Self {
        let entering_terminal = report.status.is_terminal()
            && (!self.status.is_terminal() || self.completed_at.is_none());
        let completed_at = if entering_terminal {
            Some(now)
        } else {
            self.completed_at
        };

        Self {
            status: report.status,
            error_message: report.error_message.clone(),
            metadata: Metadata::merge_optional(self.metadata, report.metadata.clone()),
            completed_at,
            updated_at: now,
            ..self
        }
    }

    /// Insert-or-merge: the record that should be stored after `report`.
    #[must_use]
    pub fn upsert(existing: Option<Self>, report: &StatusReport, now: DateTime<Utc>) -> Self {
        match existing {
            Some(record) => record.apply(report, now),
            None => Self::from_report(report, now),
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn t(offset_secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_767_225_600, 0).unwrap() + Duration::seconds(offset_secs)
    }

    fn report(status: JobStatus) -> StatusReport {
        StatusReport::new("J1", "AAPL", Stage::Ingestion, status)
    }

    #[test]
    fn insert_non_terminal_leaves_completed_at_empty() {
        let record = StageRecord::upsert(None, &report(JobStatus::Running), t(0));
        assert_eq!(record.started_at, t(0));
        assert_eq!(record.updated_at, t(0));
        assert!(record.completed_at.is_none());
    }

    #[test]
    fn insert_terminal_sets_completed_at() {
        let record = StageRecord::upsert(None, &report(JobStatus::Failed), t(0));
        assert_eq!(record.completed_at, Some(t(0)));
    }

    #[test]
    fn terminal_after_running_stamps_completion_and_keeps_start() {
        let running = StageRecord::from_report(&report(JobStatus::Running), t(0));
        let done = running.apply(&report(JobStatus::Completed), t(5));
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.started_at, t(0));
        assert_eq!(done.completed_at, Some(t(5)));
        assert_eq!(done.updated_at, t(5));
    }

    #[test]
    fn running_after_terminal_keeps_completed_at() {
        let done = StageRecord::from_report(&report(JobStatus::Completed), t(0));
        let rerun = done.apply(&report(JobStatus::Running), t(9));
        assert_eq!(rerun.status, JobStatus::Running);
        assert_eq!(rerun.completed_at, Some(t(0)));
    }

    #[test]
    fn repeated_terminal_report_keeps_first_completion() {
        let done = StageRecord::from_report(&report(JobStatus::Completed), t(0));
        let again = done.apply(&report(JobStatus::Completed), t(3));
        assert_eq!(again.completed_at, Some(t(0)));
        assert_eq!(again.started_at, t(0));
    }

    #[test]
    fn reentering_terminal_after_rerun_restamps() {
        let record = StageRecord::from_report(&report(JobStatus::Failed), t(0))
            .apply(&report(JobStatus::Running), t(1))
            .apply(&report(JobStatus::Completed), t(2));
        assert_eq!(record.completed_at, Some(t(2)));
    }

    #[test]
    fn error_message_is_overwritten_even_with_none() {
        let failed = StageRecord::from_report(&report(JobStatus::Failed).with_error("boom"), t(0));
        let retried = failed.apply(&report(JobStatus::Running), t(1));
        assert!(retried.error_message.is_none());
    }

    #[test]
    fn series_id_is_kept_on_update() {
        let first = StageRecord::from_report(&report(JobStatus::Running), t(0));
        let other_series = StatusReport::new("J1", "MSFT", Stage::Ingestion, JobStatus::Completed);
        let updated = first.apply(&other_series, t(1));
        assert_eq!(updated.series_id.as_str(), "AAPL");
    }

    #[test]
    fn empty_metadata_on_insert_is_null() {
        let record = StageRecord::from_report(
            &report(JobStatus::Running).with_metadata(Metadata::new()),
            t(0),
        );
        assert!(record.metadata.is_none());
    }

    #[test]
    fn metadata_is_merged_across_reports() {
        let first = StageRecord::from_report(
            &report(JobStatus::Running).with_metadata(Metadata::new().with("a", 1)),
            t(0),
        );
        let second = first.apply(
            &report(JobStatus::Running).with_metadata(Metadata::new().with("b", 2)),
            t(1),
        );
        assert_eq!(
            second.metadata,
            Some(Metadata::new().with("a", 1).with("b", 2))
        );

        let third = second.apply(&report(JobStatus::Completed), t(2));
        assert_eq!(third.metadata.as_ref().and_then(|m| m.get("a")), Some(&json!(1)));
    }
}
