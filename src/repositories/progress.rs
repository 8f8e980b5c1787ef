use std::collections::{HashMap, HashSet};

use deadpool_postgres::Pool;
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::subject_progress::{ProgressStatus, SubjectProgress},
};

/// The outcome of a bulk mark-done upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkDoneOutcome {
    /// Rows that already existed and were flipped to done.
    pub modified: u64,
    /// Rows that were created.
    pub upserted: u64,
}

/// Returns the set of subjects an enrollment has completed.
pub async fn done_subjects(pool: &Pool, enrollment_id: &Uuid) -> Result<HashSet<String>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT subject
            FROM subject_progress
            WHERE enrollment_id = $1 AND status = 'done'
            "#,
            &[enrollment_id],
        )
        .await?;
    rows.iter()
        .map(|row| {
            row.try_get("subject")
                .map_err(|_| AppError::MissingData("subject".to_string()))
        })
        .collect()
}

/// Returns the done-subject sets for many enrollments in one round trip.
///
/// Enrollments with no done rows are absent from the map; callers treat a
/// missing entry as an empty set.
pub async fn done_subjects_by_enrollment(
    pool: &Pool,
    enrollment_ids: &[Uuid],
) -> Result<HashMap<Uuid, HashSet<String>>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT enrollment_id, subject
            FROM subject_progress
            WHERE enrollment_id = ANY($1) AND status = 'done'
            "#,
            &[&enrollment_ids],
        )
        .await?;

    let mut by_enrollment: HashMap<Uuid, HashSet<String>> = HashMap::new();
    for row in &rows {
        let enrollment_id: Uuid = row
            .try_get("enrollment_id")
            .map_err(|_| AppError::MissingData("enrollment_id".to_string()))?;
        let subject: String = row
            .try_get("subject")
            .map_err(|_| AppError::MissingData("subject".to_string()))?;
        by_enrollment.entry(enrollment_id).or_default().insert(subject);
    }
    Ok(by_enrollment)
}

/// Upserts a done row per enrollment for the given subject.
///
/// Idempotent: rows already marked done are skipped by the conflict guard, so
/// a second identical call reports zero for both counters. `xmax = 0`
/// distinguishes freshly inserted rows from updated ones.
pub async fn bulk_mark_done(
    pool: &Pool,
    enrollment_ids: &[Uuid],
    subject: &str,
) -> Result<BulkDoneOutcome> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            INSERT INTO subject_progress (id, enrollment_id, subject, status, updated_at)
            SELECT gen_random_uuid(), eid, $2, 'done', NOW()
            FROM unnest($1::uuid[]) AS eid
            ON CONFLICT (enrollment_id, subject)
            DO UPDATE SET status = 'done', updated_at = NOW()
            WHERE subject_progress.status <> 'done'
            RETURNING (xmax = 0) AS inserted
            "#,
            &[&enrollment_ids, &subject],
        )
        .await?;

    let mut outcome = BulkDoneOutcome { modified: 0, upserted: 0 };
    for row in &rows {
        let inserted: bool = row
            .try_get("inserted")
            .map_err(|_| AppError::MissingData("inserted".to_string()))?;
        if inserted {
            outcome.upserted += 1;
        } else {
            outcome.modified += 1;
        }
    }
    Ok(outcome)
}

/// Finds a progress row by its ID.
pub async fn find_by_id(pool: &Pool, progress_id: &Uuid) -> Result<Option<SubjectProgress>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, enrollment_id, subject, status, updated_at
            FROM subject_progress
            WHERE id = $1
            "#,
            &[progress_id],
        )
        .await?;
    row.as_ref().map(SubjectProgress::try_from).transpose()
}

/// Sets a single progress row's status directly.
pub async fn set_status(
    pool: &Pool,
    progress_id: &Uuid,
    status: ProgressStatus,
) -> Result<SubjectProgress> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            UPDATE subject_progress
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, enrollment_id, subject, status, updated_at
            "#,
            &[&status, progress_id],
        )
        .await?
        .ok_or(AppError::NotFound)?;
    SubjectProgress::try_from(&row)
}
