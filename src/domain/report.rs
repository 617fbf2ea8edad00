//! Status reports submitted by pipeline stages.

use super::error::DomainError;
use super::id::{JobId, SeriesId};
use super::metadata::Metadata;
use super::stage::{JobStatus, Stage};

/// One lifecycle report for a (job, stage) pair.
///
/// Reports are transient: the recorder folds each one into the stored
/// stage row and discards it.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub job_id: JobId,
    pub series_id: SeriesId,
    pub stage: Stage,
    pub status: JobStatus,
    /// Meaningful for `failed`, accepted for any status.
    pub error_message: Option<String>,
    pub metadata: Option<Metadata>,
}

impl StatusReport {
    /// Create a report with no error message or metadata.
    pub fn new(
        job_id: impl Into<JobId>,
        series_id: impl Into<SeriesId>,
        stage: Stage,
        status: JobStatus,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            series_id: series_id.into(),
            stage,
            status,
            error_message: None,
            metadata: None,
        }
    }

    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Check that the identifiers are non-empty.
    ///
    /// # Errors
    /// Returns [`DomainError::EmptyJobId`] or [`DomainError::EmptySeriesId`].
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.job_id.as_str().is_empty() {
            return Err(DomainError::EmptyJobId);
        }
        if self.series_id.as_str().is_empty() {
            return Err(DomainError::EmptySeriesId);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_report_has_no_optional_fields() {
        let report = StatusReport::new("J1", "AAPL", Stage::Ingestion, JobStatus::Running);
        assert_eq!(report.job_id.as_str(), "J1");
        assert!(report.error_message.is_none());
        assert!(report.metadata.is_none());
        assert!(report.validate().is_ok());
    }

    #[test]
    fn builders_set_optional_fields() {
        let report = StatusReport::new("J1", "AAPL", Stage::Forecasting, JobStatus::Failed)
            .with_error("model diverged")
            .with_metadata(Metadata::new().with("epoch", 7));
        assert_eq!(report.error_message.as_deref(), Some("model diverged"));
        assert_eq!(report.metadata.map(|m| m.len()), Some(1));
    }

    #[test]
    fn validate_rejects_empty_ids() {
        let report = StatusReport::new("", "AAPL", Stage::Stats, JobStatus::Pending);
        assert_eq!(report.validate(), Err(DomainError::EmptyJobId));

        let report = StatusReport::new("J1", "", Stage::Stats, JobStatus::Pending);
        assert_eq!(report.validate(), Err(DomainError::EmptySeriesId));
    }
}
