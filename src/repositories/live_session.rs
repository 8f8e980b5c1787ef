use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::live_session::LiveSession,
};

/// Lists the sessions scheduled for a (batch, subject) pair, earliest first.
pub async fn list_for_batch_subject(
    pool: &Pool,
    batch_id: &Uuid,
    subject: &str,
) -> Result<Vec<LiveSession>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT id, batch_id, subject, start_at, end_at, join_url, recording_url, created_at
            FROM live_sessions
            WHERE batch_id = $1 AND subject = $2
            ORDER BY start_at ASC
            "#,
            &[batch_id, &subject],
        )
        .await?;
    rows.iter().map(LiveSession::try_from).collect()
}

/// Lists sessions that have not yet ended, optionally filtered by batch
/// and/or subject, earliest first.
pub async fn list_upcoming(
    pool: &Pool,
    batch_id: Option<Uuid>,
    subject: Option<String>,
    now: DateTime<Utc>,
) -> Result<Vec<LiveSession>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT id, batch_id, subject, start_at, end_at, join_url, recording_url, created_at
            FROM live_sessions
            WHERE end_at >= $1
              AND ($2::uuid IS NULL OR batch_id = $2)
              AND ($3::text IS NULL OR subject = $3)
            ORDER BY start_at ASC
            "#,
            &[&now, &batch_id, &subject],
        )
        .await?;
    rows.iter().map(LiveSession::try_from).collect()
}

/// Counts sessions starting within the given window.
pub async fn count_starting_between(
    pool: &Pool,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<i64> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            SELECT COUNT(*) AS sessions
            FROM live_sessions
            WHERE start_at >= $1 AND start_at < $2
            "#,
            &[&from, &to],
        )
        .await?;
    row.try_get("sessions")
        .map_err(|_| AppError::MissingData("sessions".to_string()))
}
