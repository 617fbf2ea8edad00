//! Stage status recording port.
//!
//! Defines the interface pipeline stages use to report their lifecycle.

use crate::domain::{JobStatus, Metadata, Stage, StatusReport};

/// Port for recording pipeline stage status.
///
/// Implementations persist one record per (job, stage) and merge repeated
/// reports into it. Recording never fails from the caller's point of view:
/// status tracking must not abort the stage doing the real work, so
/// implementations log errors instead of returning them.
///
/// There is no transition check. Reporting `running` twice, or jumping
/// straight to `completed`, is accepted and merged like any other report.
pub trait StatusRecorder: Send + Sync {
    /// Record a status report.
    fn record(&self, report: &StatusReport);

    /// Release pooled resources. Safe to call more than once.
    fn shutdown(&self);

    /// Record a status given as loose fields.
    fn update_status(
        &self,
        job_id: &str,
        series_id: &str,
        status: JobStatus,
        stage: Stage,
        error_message: Option<&str>,
        metadata: Option<Metadata>,
    ) {
        let report = StatusReport {
            error_message: error_message.map(str::to_string),
            metadata,
            ..StatusReport::new(job_id, series_id, stage, status)
        };
        self.record(&report);
    }

    /// Mark a stage as running.
    fn start_stage(&self, job_id: &str, series_id: &str, stage: Stage, metadata: Option<Metadata>) {
        self.update_status(job_id, series_id, JobStatus::Running, stage, None, metadata);
    }

    /// Mark a stage as completed.
    fn complete_stage(
        &self,
        job_id: &str,
        series_id: &str,
        stage: Stage,
        metadata: Option<Metadata>,
    ) {
        self.update_status(job_id, series_id, JobStatus::Completed, stage, None, metadata);
    }

    /// Mark a stage as failed with the error that stopped it.
    fn fail_stage(
        &self,
        job_id: &str,
        series_id: &str,
        stage: Stage,
        error_message: &str,
        metadata: Option<Metadata>,
    ) {
        self.update_status(
            job_id,
            series_id,
            JobStatus::Failed,
            stage,
            Some(error_message),
            metadata,
        );
    }
}
