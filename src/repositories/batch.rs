use deadpool_postgres::Pool;
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::batch::Batch,
};

/// Lists all batches.
pub async fn list_all(pool: &Pool) -> Result<Vec<Batch>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT id, name, current_subject, course_ids, created_at, updated_at
            FROM batches
            ORDER BY name ASC
            "#,
            &[],
        )
        .await?;
    rows.iter().map(Batch::try_from).collect()
}

/// Finds a batch by its ID.
pub async fn find_by_id(pool: &Pool, batch_id: &Uuid) -> Result<Option<Batch>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, name, current_subject, course_ids, created_at, updated_at
            FROM batches
            WHERE id = $1
            "#,
            &[batch_id],
        )
        .await?;
    row.as_ref().map(Batch::try_from).transpose()
}

/// Finds the batch a course is attached to.
///
/// A course can in principle be attached to several batches; the
/// most-recently-updated one wins for student-facing lookups.
pub async fn find_for_course(pool: &Pool, course_id: &Uuid) -> Result<Option<Batch>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, name, current_subject, course_ids, created_at, updated_at
            FROM batches
            WHERE $1 = ANY(course_ids)
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
            &[course_id],
        )
        .await?;
    row.as_ref().map(Batch::try_from).transpose()
}

/// Moves a batch to a new live subject. Unconditional last-write-wins; the
/// admin decides when the batch advances.
pub async fn update_current_subject(
    pool: &Pool,
    batch_id: &Uuid,
    subject: &str,
) -> Result<Batch> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            UPDATE batches
            SET current_subject = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, name, current_subject, course_ids, created_at, updated_at
            "#,
            &[&subject, batch_id],
        )
        .await?
        .ok_or(AppError::NotFound)?;
    Batch::try_from(&row)
}

/// Replaces a batch's attached course list.
pub async fn update_courses(pool: &Pool, batch_id: &Uuid, course_ids: &[Uuid]) -> Result<Batch> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            UPDATE batches
            SET course_ids = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, name, current_subject, course_ids, created_at, updated_at
            "#,
            &[&course_ids, batch_id],
        )
        .await?
        .ok_or(AppError::NotFound)?;
    Batch::try_from(&row)
}
