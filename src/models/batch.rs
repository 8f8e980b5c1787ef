use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::error::AppError;

/// Represents a named cohort of students.
///
/// `current_subject` is the subject the batch is live on. It is mutated only
/// by the explicit admin advance-subject action; no other write path touches
/// it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    /// The unique identifier for the batch.
    pub id: Uuid,
    /// The batch's display name.
    pub name: String,
    /// The subject the batch is currently live on.
    pub current_subject: String,
    /// The courses attached to this batch.
    pub course_ids: Vec<Uuid>,
    /// The timestamp when the batch was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the batch was last updated.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&Row> for Batch {
    type Error = AppError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
            name: row.try_get("name").map_err(|_| AppError::MissingData("name".to_string()))?,
            current_subject: row.try_get("current_subject").map_err(|_| AppError::MissingData("current_subject".to_string()))?,
            course_ids: row.try_get("course_ids").map_err(|_| AppError::MissingData("course_ids".to_string()))?,
            created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
            updated_at: row.try_get("updated_at").map_err(|_| AppError::MissingData("updated_at".to_string()))?,
        })
    }
}
