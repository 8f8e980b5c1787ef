use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::error::AppError;

/// Represents a course and its subject rotation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// The unique identifier for the course.
    pub id: Uuid,
    /// The course's display name.
    pub name: String,
    /// The ordered list of subject labels the rotation cycles through.
    pub subjects: Vec<String>,
    /// The subject the rotation starts from. Expected to be a member of
    /// `subjects`; the resolver tolerates a stale value defensively.
    pub start_subject: String,
    /// The timestamp when the course was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the course was last updated.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&Row> for Course {
    type Error = AppError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
            name: row.try_get("name").map_err(|_| AppError::MissingData("name".to_string()))?,
            subjects: row.try_get("subjects").map_err(|_| AppError::MissingData("subjects".to_string()))?,
            start_subject: row.try_get("start_subject").map_err(|_| AppError::MissingData("start_subject".to_string()))?,
            created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
            updated_at: row.try_get("updated_at").map_err(|_| AppError::MissingData("updated_at".to_string()))?,
        })
    }
}
