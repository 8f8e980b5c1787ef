use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::error::AppError;

/// The completion status of a single (enrollment, subject) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSql, FromSql)]
#[postgres(name = "progress_status")]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    /// The subject has not been completed yet.
    #[postgres(name = "pending")]
    Pending,
    /// The subject has been completed.
    #[postgres(name = "done")]
    Done,
}

/// One progress row per (enrollment, subject) pair.
///
/// Rows are created lazily the first time a subject is marked done and are
/// never deleted in normal flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectProgress {
    /// The unique identifier for the progress row.
    pub id: Uuid,
    /// The ID of the enrollment this row belongs to.
    pub enrollment_id: Uuid,
    /// The subject label this row tracks.
    pub subject: String,
    /// The completion status.
    pub status: ProgressStatus,
    /// The timestamp when the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&Row> for SubjectProgress {
    type Error = AppError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
            enrollment_id: row.try_get("enrollment_id").map_err(|_| AppError::MissingData("enrollment_id".to_string()))?,
            subject: row.try_get("subject").map_err(|_| AppError::MissingData("subject".to_string()))?,
            status: row.try_get("status").map_err(|_| AppError::MissingData("status".to_string()))?,
            updated_at: row.try_get("updated_at").map_err(|_| AppError::MissingData("updated_at".to_string()))?,
        })
    }
}
