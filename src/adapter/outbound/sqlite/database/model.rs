//! Database model types for Diesel ORM.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;

use super::schema::stage_status;
use crate::domain::{JobId, Metadata, SeriesId, StageRecord};
use crate::error::{Error, Result};

/// Database row for a stage status.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = stage_status)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StageRow {
    pub job_id: String,
    pub stage: String,
    pub series_id: String,
    pub status: String,
    pub error_message: Option<String>,
    pub metadata: Option<String>,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub updated_at: String,
}

/// Columns rewritten when a row for the key already exists.
///
/// `None` writes NULL; `error_message` must be cleared by a report that
/// carries none.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = stage_status)]
#[diesel(treat_none_as_null = true)]
pub struct StageChangeset {
    pub status: String,
    pub error_message: Option<String>,
    pub metadata: Option<String>,
    pub completed_at: Option<String>,
    pub updated_at: String,
}

impl From<&StageRow> for StageChangeset {
    fn from(row: &StageRow) -> Self {
        Self {
            status: row.status.clone(),
            error_message: row.error_message.clone(),
            metadata: row.metadata.clone(),
            completed_at: row.completed_at.clone(),
            updated_at: row.updated_at.clone(),
        }
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(text)?.with_timezone(&Utc))
}

impl TryFrom<&StageRecord> for StageRow {
    type Error = Error;

    fn try_from(record: &StageRecord) -> Result<Self> {
        Ok(Self {
            job_id: record.job_id.to_string(),
            stage: record.stage.as_str().to_string(),
            series_id: record.series_id.to_string(),
            status: record.status.as_str().to_string(),
            error_message: record.error_message.clone(),
            metadata: record.metadata.as_ref().map(Metadata::to_json).transpose()?,
            started_at: format_timestamp(record.started_at),
            completed_at: record.completed_at.map(format_timestamp),
            updated_at: format_timestamp(record.updated_at),
        })
    }
}

impl TryFrom<StageRow> for StageRecord {
    type Error = Error;

    fn try_from(row: StageRow) -> Result<Self> {
        Ok(Self {
            job_id: JobId::from(row.job_id),
            series_id: SeriesId::from(row.series_id),
            stage: row.stage.parse()?,
            status: row.status.parse()?,
            error_message: row.error_message,
            metadata: row.metadata.as_deref().map(Metadata::from_json).transpose()?,
            started_at: parse_timestamp(&row.started_at)?,
            completed_at: row.completed_at.as_deref().map(parse_timestamp).transpose()?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}
