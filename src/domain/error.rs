//! Domain validation errors for status reports.
//!
//! These errors are returned when a report or one of its enumerated fields
//! violates a domain rule. The recorder never propagates them to callers; it
//! logs them and drops the report.
//!
//! # Examples
//!
//! ```
//! use stagetrack::domain::error::DomainError;
//! use stagetrack::domain::Stage;
//!
//! let result = "training".parse::<Stage>();
//! assert!(matches!(result, Err(DomainError::UnknownStage { .. })));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Job identifiers must be non-empty.
    #[error("job_id cannot be empty")]
    EmptyJobId,

    /// Series identifiers must be non-empty.
    #[error("series_id cannot be empty")]
    EmptySeriesId,

    /// Stage name outside the known pipeline stages.
    #[error("unknown stage '{value}'")]
    UnknownStage {
        /// The rejected input.
        value: String,
    },

    /// Status name outside the known lifecycle statuses.
    #[error("unknown status '{value}'")]
    UnknownStatus {
        /// The rejected input.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = DomainError::UnknownStage {
            value: "training".into(),
        };
        assert_eq!(err.to_string(), "unknown stage 'training'");

        let err = DomainError::UnknownStatus {
            value: "done".into(),
        };
        assert_eq!(err.to_string(), "unknown status 'done'");
    }

    #[test]
    fn empty_id_messages() {
        assert_eq!(DomainError::EmptyJobId.to_string(), "job_id cannot be empty");
        assert_eq!(
            DomainError::EmptySeriesId.to_string(),
            "series_id cannot be empty"
        );
    }
}
