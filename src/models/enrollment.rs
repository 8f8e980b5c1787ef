use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::error::AppError;

/// The lifecycle status of an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSql, FromSql)]
#[postgres(name = "enrollment_status")]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    /// The enrollment is active and the student may progress.
    #[postgres(name = "active")]
    Active,
    /// The enrollment's validity has lapsed.
    #[postgres(name = "expired")]
    Expired,
}

/// Represents a student's enrollment in a course.
///
/// Unique on (user_id, course_id); created on purchase/unlock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    /// The unique identifier for the enrollment.
    pub id: Uuid,
    /// The ID of the enrolled student.
    pub user_id: Uuid,
    /// The ID of the course the student is enrolled in.
    pub course_id: Uuid,
    /// The lifecycle status of the enrollment.
    pub status: EnrollmentStatus,
    /// The instant the enrollment's validity ends.
    pub valid_till: DateTime<Utc>,
    /// The timestamp when the enrollment was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the enrollment was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    /// Whether the enrollment's validity has lapsed as of `now`.
    pub fn validity_over(&self, now: DateTime<Utc>) -> bool {
        now > self.valid_till
    }

    /// Whole days of validity left as of `now`, clamped at zero.
    pub fn validity_left_days(&self, now: DateTime<Utc>) -> i64 {
        (self.valid_till - now).num_days().max(0)
    }
}

impl TryFrom<&Row> for Enrollment {
    type Error = AppError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
            user_id: row.try_get("user_id").map_err(|_| AppError::MissingData("user_id".to_string()))?,
            course_id: row.try_get("course_id").map_err(|_| AppError::MissingData("course_id".to_string()))?,
            status: row.try_get("status").map_err(|_| AppError::MissingData("status".to_string()))?,
            valid_till: row.try_get("valid_till").map_err(|_| AppError::MissingData("valid_till".to_string()))?,
            created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
            updated_at: row.try_get("updated_at").map_err(|_| AppError::MissingData("updated_at".to_string()))?,
        })
    }
}
