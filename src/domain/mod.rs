//! Domain types for stage status tracking.
//!
//! - [`StatusReport`] - one lifecycle report from a pipeline stage
//! - [`Stage`] / [`JobStatus`] - the enumerated stage and status sets
//! - [`StageRecord`] - the stored row and the upsert merge policy
//! - [`Metadata`] - free-form JSON object with merge semantics
//! - [`JobId`] / [`SeriesId`] - opaque identifiers

pub mod error;
pub mod id;
pub mod metadata;
pub mod record;
pub mod report;
pub mod stage;

pub use error::DomainError;
pub use id::{JobId, SeriesId};
pub use metadata::Metadata;
pub use record::StageRecord;
pub use report::StatusReport;
pub use stage::{JobStatus, Stage};
