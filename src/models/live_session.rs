use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::error::AppError;

/// A scheduled live meeting for a (batch, subject) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSession {
    /// The unique identifier for the session.
    pub id: Uuid,
    /// The ID of the batch the session is scheduled for.
    pub batch_id: Uuid,
    /// The subject the session covers.
    pub subject: String,
    /// The instant the session starts.
    pub start_at: DateTime<Utc>,
    /// The instant the session ends.
    pub end_at: DateTime<Utc>,
    /// The URL students use to join the live meeting.
    pub join_url: String,
    /// The recording URL, once the session has concluded.
    pub recording_url: Option<String>,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&Row> for LiveSession {
    type Error = AppError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
            batch_id: row.try_get("batch_id").map_err(|_| AppError::MissingData("batch_id".to_string()))?,
            subject: row.try_get("subject").map_err(|_| AppError::MissingData("subject".to_string()))?,
            start_at: row.try_get("start_at").map_err(|_| AppError::MissingData("start_at".to_string()))?,
            end_at: row.try_get("end_at").map_err(|_| AppError::MissingData("end_at".to_string()))?,
            join_url: row.try_get("join_url").map_err(|_| AppError::MissingData("join_url".to_string()))?,
            recording_url: row.try_get("recording_url").map_err(|_| AppError::MissingData("recording_url".to_string()))?,
            created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
        })
    }
}
