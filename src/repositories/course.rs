use deadpool_postgres::Pool;
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::course::Course,
};

/// Finds a course by its ID.
pub async fn find_by_id(pool: &Pool, course_id: &Uuid) -> Result<Option<Course>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, name, subjects, start_subject, created_at, updated_at
            FROM courses
            WHERE id = $1
            "#,
            &[course_id],
        )
        .await?;
    row.as_ref().map(Course::try_from).transpose()
}

/// Lists the courses with the given IDs.
///
/// Courses absent from the database are silently skipped; the caller decides
/// whether that matters.
pub async fn list_by_ids(pool: &Pool, course_ids: &[Uuid]) -> Result<Vec<Course>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT id, name, subjects, start_subject, created_at, updated_at
            FROM courses
            WHERE id = ANY($1)
            ORDER BY name ASC
            "#,
            &[&course_ids],
        )
        .await?;
    rows.iter().map(Course::try_from).collect()
}

/// Updates a course's rotation start subject.
///
/// Membership of `start_subject` in the course's subject list is enforced by
/// the service layer before this write.
pub async fn update_start_subject(
    pool: &Pool,
    course_id: &Uuid,
    start_subject: &str,
) -> Result<Course> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            UPDATE courses
            SET start_subject = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, name, subjects, start_subject, created_at, updated_at
            "#,
            &[&start_subject, course_id],
        )
        .await?
        .ok_or(AppError::NotFound)?;
    Course::try_from(&row)
}
