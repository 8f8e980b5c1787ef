use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{
        identity::{Identity, Role},
        live_session::LiveSession,
        subject_progress::{ProgressStatus, SubjectProgress},
    },
    repositories::{
        batch as batch_repo,
        course as course_repo,
        enrollment as enrollment_repo,
        live_session as session_repo,
        progress as progress_repo,
    },
    services::eligibility::{self, NextStep},
    state::AppState,
};

/// Resolves the next-step verdict for the calling student.
///
/// With an explicit `course_id` the student's enrollment in that course is
/// used; otherwise their most-recently-updated enrollment. Not found when
/// the student has no matching enrollment.
pub async fn next_step(
    state: &AppState,
    user_id: Uuid,
    course_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<NextStep> {
    let enrollment = match course_id {
        Some(course_id) => {
            enrollment_repo::find_by_user_and_course(&state.db, &user_id, &course_id).await?
        }
        None => enrollment_repo::find_latest_for_user(&state.db, &user_id).await?,
    }
    .ok_or(AppError::NotFound)?;

    let course = course_repo::find_by_id(&state.db, &enrollment.course_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let batch = batch_repo::find_for_course(&state.db, &course.id).await?;
    let done = progress_repo::done_subjects(&state.db, &enrollment.id).await?;

    let sessions = match &batch {
        Some(batch) => {
            session_repo::list_for_batch_subject(&state.db, &batch.id, &batch.current_subject)
                .await?
        }
        None => Vec::new(),
    };

    Ok(eligibility::next_step(
        &enrollment,
        &course,
        batch.as_ref(),
        &sessions,
        &done,
        now,
    ))
}

/// Lists sessions that have not yet ended, earliest first, optionally
/// filtered by batch and/or subject.
pub async fn upcoming_sessions(
    state: &AppState,
    batch_id: Option<Uuid>,
    subject: Option<String>,
    now: DateTime<Utc>,
) -> Result<Vec<LiveSession>> {
    session_repo::list_upcoming(&state.db, batch_id, subject, now).await
}

/// Sets a single progress row's status directly.
///
/// Students may only touch rows of their own enrollments; admins may touch
/// any row.
pub async fn set_progress_status(
    state: &AppState,
    identity: &Identity,
    progress_id: Uuid,
    status: ProgressStatus,
) -> Result<SubjectProgress> {
    let progress = progress_repo::find_by_id(&state.db, &progress_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if identity.role != Role::Admin {
        let enrollment = enrollment_repo::find_by_id(&state.db, &progress.enrollment_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if enrollment.user_id != identity.user_id {
            return Err(AppError::Forbidden);
        }
    }

    let progress = progress_repo::set_status(&state.db, &progress_id, status).await?;
    tracing::info!(
        progress_id = %progress.id,
        status = ?progress.status,
        "progress row status set"
    );
    Ok(progress)
}
