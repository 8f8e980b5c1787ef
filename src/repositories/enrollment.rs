use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::enrollment::Enrollment,
};

/// Finds an enrollment by its ID.
pub async fn find_by_id(pool: &Pool, enrollment_id: &Uuid) -> Result<Option<Enrollment>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, user_id, course_id, status, valid_till, created_at, updated_at
            FROM enrollments
            WHERE id = $1
            "#,
            &[enrollment_id],
        )
        .await?;
    row.as_ref().map(Enrollment::try_from).transpose()
}

/// Finds a user's enrollment in a specific course.
///
/// (user_id, course_id) is unique, so at most one row exists.
pub async fn find_by_user_and_course(
    pool: &Pool,
    user_id: &Uuid,
    course_id: &Uuid,
) -> Result<Option<Enrollment>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, user_id, course_id, status, valid_till, created_at, updated_at
            FROM enrollments
            WHERE user_id = $1 AND course_id = $2
            "#,
            &[user_id, course_id],
        )
        .await?;
    row.as_ref().map(Enrollment::try_from).transpose()
}

/// Finds a user's most-recently-updated enrollment.
///
/// Used when the student does not name a course explicitly.
pub async fn find_latest_for_user(pool: &Pool, user_id: &Uuid) -> Result<Option<Enrollment>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, user_id, course_id, status, valid_till, created_at, updated_at
            FROM enrollments
            WHERE user_id = $1
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
            &[user_id],
        )
        .await?;
    row.as_ref().map(Enrollment::try_from).transpose()
}

/// Lists the active enrollments for a set of courses.
pub async fn list_active_by_courses(pool: &Pool, course_ids: &[Uuid]) -> Result<Vec<Enrollment>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT id, user_id, course_id, status, valid_till, created_at, updated_at
            FROM enrollments
            WHERE status = 'active' AND course_id = ANY($1)
            ORDER BY created_at ASC
            "#,
            &[&course_ids],
        )
        .await?;
    rows.iter().map(Enrollment::try_from).collect()
}

/// Counts active enrollments whose validity ends within the given window.
pub async fn count_expiring_between(
    pool: &Pool,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<i64> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            SELECT COUNT(*) AS expiring
            FROM enrollments
            WHERE status = 'active' AND valid_till >= $1 AND valid_till <= $2
            "#,
            &[&from, &to],
        )
        .await?;
    row.try_get("expiring")
        .map_err(|_| AppError::MissingData("expiring".to_string()))
}

/// Flips lapsed active enrollments to expired. Returns the number of rows
/// updated. Idempotent; safe for the periodic sweep to re-run.
pub async fn expire_lapsed(pool: &Pool, now: DateTime<Utc>) -> Result<u64> {
    let client = pool.get().await?;
    let updated = client
        .execute(
            r#"
            UPDATE enrollments
            SET status = 'expired', updated_at = NOW()
            WHERE status = 'active' AND valid_till < $1
            "#,
            &[&now],
        )
        .await?;
    Ok(updated)
}
