use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{batch::Batch, course::Course, enrollment::Enrollment},
    repositories::{
        batch as batch_repo,
        course as course_repo,
        enrollment as enrollment_repo,
        live_session as session_repo,
        progress as progress_repo,
    },
    repositories::progress::BulkDoneOutcome,
    services::{eligibility, eligibility::QueueDecision, rotation},
    state::AppState,
};

/// How the provided course ids are applied to a batch's attachment list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseAction {
    Set,
    Add,
    Remove,
}

/// The KPI rollup for the admin overview screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    /// Sessions starting today.
    pub live_today: i64,
    /// Sessions starting this week (Monday-based).
    pub classes_this_week: i64,
    /// Distinct subjects some active enrollment is currently on.
    pub subjects_in_progress: i64,
    /// Enrollments that could join a live session right now.
    pub joinable_now: i64,
    /// Active enrollments whose validity ends within 30 days.
    pub expiring_within_30_days: i64,
}

/// Per-batch queue counts.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub active_enrollments: i64,
    pub join_live_now: i64,
    pub backlog_recorded: i64,
    pub completed: i64,
}

/// Done counts for one subject of one course, in rotated order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectCompletion {
    pub subject: String,
    pub done_count: i64,
}

/// The completion matrix of one course attached to a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseMatrix {
    pub course_id: Uuid,
    pub course_name: String,
    pub subjects: Vec<SubjectCompletion>,
}

/// One batch in the admin batch listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchView {
    pub id: Uuid,
    pub name: String,
    pub current_subject: String,
    pub matrix: Vec<CourseMatrix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courses: Option<Vec<Course>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<BatchStats>,
}

/// One enrollment in the per-batch student queue listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQueueEntry {
    pub enrollment_id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub next_subject: Option<String>,
    pub validity_left_days: i64,
    pub decision: QueueDecision,
}

/// One bucketed enrollment inside a batch rollup.
struct RollupEntry {
    enrollment: Enrollment,
    next_subject: Option<String>,
    decision: QueueDecision,
}

/// The shared per-batch rollup every aggregate view is built from.
///
/// Applies the same [`eligibility::classify`] decision as the single-student
/// path to each active enrollment of the batch's attached courses.
struct BatchRollup {
    batch: Batch,
    courses: Vec<Course>,
    entries: Vec<RollupEntry>,
    done_by_enrollment: std::collections::HashMap<Uuid, HashSet<String>>,
}

async fn rollup_batch(state: &AppState, batch: Batch, now: DateTime<Utc>) -> Result<BatchRollup> {
    let courses = course_repo::list_by_ids(&state.db, &batch.course_ids).await?;
    let enrollments =
        enrollment_repo::list_active_by_courses(&state.db, &batch.course_ids).await?;

    let enrollment_ids: Vec<Uuid> = enrollments.iter().map(|e| e.id).collect();
    let done_by_enrollment =
        progress_repo::done_subjects_by_enrollment(&state.db, &enrollment_ids).await?;

    let sessions =
        session_repo::list_for_batch_subject(&state.db, &batch.id, &batch.current_subject)
            .await?;

    let empty = HashSet::new();
    let mut entries = Vec::with_capacity(enrollments.len());
    for enrollment in enrollments {
        // A course detached after enrollment leaves the student out of this
        // batch's queues; their own next-step endpoint still works.
        let Some(course) = courses.iter().find(|c| c.id == enrollment.course_id) else {
            continue;
        };
        let done = done_by_enrollment.get(&enrollment.id).unwrap_or(&empty);
        let next_subject =
            rotation::next_subject(&course.subjects, &course.start_subject, done);
        let decision =
            eligibility::classify(&enrollment, course, &batch, &sessions, done, now);
        entries.push(RollupEntry {
            enrollment,
            next_subject,
            decision,
        });
    }

    Ok(BatchRollup {
        batch,
        courses,
        entries,
        done_by_enrollment,
    })
}

impl BatchRollup {
    fn stats(&self) -> BatchStats {
        let mut stats = BatchStats {
            active_enrollments: self.entries.len() as i64,
            ..BatchStats::default()
        };
        for entry in &self.entries {
            match entry.decision {
                QueueDecision::JoinLiveNow { .. } => stats.join_live_now += 1,
                QueueDecision::BacklogRecorded => stats.backlog_recorded += 1,
                QueueDecision::Completed => stats.completed += 1,
            }
        }
        stats
    }

    /// Done counts per subject of each attached course, in rotated order.
    fn matrix(&self) -> Vec<CourseMatrix> {
        self.courses
            .iter()
            .map(|course| {
                let order = rotation::rotate(&course.subjects, &course.start_subject);
                let subjects = order
                    .into_iter()
                    .map(|subject| {
                        let done_count = self
                            .entries
                            .iter()
                            .filter(|e| e.enrollment.course_id == course.id)
                            .filter(|e| {
                                self.done_by_enrollment
                                    .get(&e.enrollment.id)
                                    .is_some_and(|done| done.contains(&subject))
                            })
                            .count() as i64;
                        SubjectCompletion { subject, done_count }
                    })
                    .collect();
                CourseMatrix {
                    course_id: course.id,
                    course_name: course.name.clone(),
                    subjects,
                }
            })
            .collect()
    }
}

/// Moves a batch to a new live subject.
///
/// The new subject must belong to the subject list of at least one attached
/// course. The write itself is unconditional: there is no check that every
/// enrollment finished the old subject, advancing is admin discretion.
pub async fn advance_subject(
    state: &AppState,
    batch_id: Uuid,
    new_subject: &str,
) -> Result<Batch> {
    let batch = batch_repo::find_by_id(&state.db, &batch_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let courses = course_repo::list_by_ids(&state.db, &batch.course_ids).await?;
    if courses.is_empty() {
        return Err(AppError::Validation(
            "Batch has no attached courses to be live on".to_string(),
        ));
    }
    if !courses
        .iter()
        .any(|c| c.subjects.iter().any(|s| s == new_subject))
    {
        return Err(AppError::Validation(format!(
            "Subject '{}' is not in the subject list of any attached course",
            new_subject
        )));
    }

    let batch = batch_repo::update_current_subject(&state.db, &batch_id, new_subject).await?;
    tracing::info!(
        batch_id = %batch.id,
        subject = new_subject,
        "batch advanced to new live subject"
    );
    Ok(batch)
}

/// Applies a set/add/remove action to a batch's attached courses.
///
/// Every provided course id must exist; attachment is last-write-wins.
pub async fn set_batch_courses(
    state: &AppState,
    batch_id: Uuid,
    course_ids: &[Uuid],
    action: CourseAction,
) -> Result<Batch> {
    let batch = batch_repo::find_by_id(&state.db, &batch_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let found = course_repo::list_by_ids(&state.db, course_ids).await?;
    if found.len() != course_ids.iter().collect::<HashSet<_>>().len() {
        return Err(AppError::Validation(
            "One or more course ids do not exist".to_string(),
        ));
    }

    let mut updated: Vec<Uuid> = match action {
        CourseAction::Set => Vec::new(),
        CourseAction::Add | CourseAction::Remove => batch.course_ids.clone(),
    };
    match action {
        CourseAction::Set | CourseAction::Add => {
            for id in course_ids {
                if !updated.contains(id) {
                    updated.push(*id);
                }
            }
        }
        CourseAction::Remove => {
            updated.retain(|id| !course_ids.contains(id));
        }
    }

    let batch = batch_repo::update_courses(&state.db, &batch_id, &updated).await?;
    tracing::info!(
        batch_id = %batch.id,
        courses = batch.course_ids.len(),
        "batch course attachments updated"
    );
    Ok(batch)
}

/// Bulk-marks a subject done for a set of enrollments.
///
/// Idempotent; re-marking an already-done subject is a no-op write. There is
/// deliberately no check that `subject` is each enrollment's current expected
/// subject: admins may mark out of rotation order.
pub async fn mark_done(
    state: &AppState,
    enrollment_ids: &[Uuid],
    subject: &str,
) -> Result<BulkDoneOutcome> {
    // A repeated id would make the upsert touch the same row twice within
    // one statement, which Postgres rejects.
    let mut unique_ids: Vec<Uuid> = Vec::with_capacity(enrollment_ids.len());
    for id in enrollment_ids {
        if !unique_ids.contains(id) {
            unique_ids.push(*id);
        }
    }

    let outcome = progress_repo::bulk_mark_done(&state.db, &unique_ids, subject).await?;
    tracing::info!(
        subject,
        modified = outcome.modified,
        upserted = outcome.upserted,
        "bulk mark-done applied"
    );
    Ok(outcome)
}

/// Updates a course's rotation start subject.
///
/// Unlike the resolver's defensive read-path fallback, the write path rejects
/// a start subject that is not in the course's subject list.
pub async fn set_start_subject(
    state: &AppState,
    course_id: Uuid,
    start_subject: &str,
) -> Result<Course> {
    let course = course_repo::find_by_id(&state.db, &course_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !course.subjects.iter().any(|s| s == start_subject) {
        return Err(AppError::Validation(format!(
            "Subject '{}' is not in the course's subject list",
            start_subject
        )));
    }

    let course = course_repo::update_start_subject(&state.db, &course_id, start_subject).await?;
    tracing::info!(
        course_id = %course.id,
        start_subject,
        "course rotation anchor updated"
    );
    Ok(course)
}

/// Builds the admin overview KPI rollup.
pub async fn overview(state: &AppState, now: DateTime<Utc>) -> Result<Overview> {
    let today_start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    let week_start = now
        .date_naive()
        .week(Weekday::Mon)
        .first_day()
        .and_time(NaiveTime::MIN)
        .and_utc();

    let live_today =
        session_repo::count_starting_between(&state.db, today_start, today_start + Duration::days(1))
            .await?;
    let classes_this_week =
        session_repo::count_starting_between(&state.db, week_start, week_start + Duration::days(7))
            .await?;
    let expiring_within_30_days =
        enrollment_repo::count_expiring_between(&state.db, now, now + Duration::days(30)).await?;

    let mut rollups = Vec::new();
    for batch in batch_repo::list_all(&state.db).await? {
        rollups.push(rollup_batch(state, batch, now).await?);
    }
    let (joinable_now, subjects_in_progress) = queue_totals(&rollups);

    Ok(Overview {
        live_today,
        classes_this_week,
        subjects_in_progress,
        joinable_now,
        expiring_within_30_days,
    })
}

/// Sums (joinable enrollments, distinct pending subjects) across rollups.
///
/// A course attached to several batches contributes its enrollments to each
/// batch's rollup, so both counts deduplicate rather than sum entry counts.
fn queue_totals(rollups: &[BatchRollup]) -> (i64, i64) {
    let mut joinable: HashSet<Uuid> = HashSet::new();
    let mut subjects_in_progress: HashSet<&str> = HashSet::new();
    for rollup in rollups {
        for entry in &rollup.entries {
            if matches!(entry.decision, QueueDecision::JoinLiveNow { .. }) {
                joinable.insert(entry.enrollment.id);
            }
            if let Some(subject) = &entry.next_subject {
                subjects_in_progress.insert(subject);
            }
        }
    }
    (joinable.len() as i64, subjects_in_progress.len() as i64)
}

/// Lists all batches with their completion matrices, optionally embedding
/// course details and queue stats.
pub async fn list_batches(
    state: &AppState,
    with_stats: bool,
    with_courses: bool,
    now: DateTime<Utc>,
) -> Result<Vec<BatchView>> {
    let mut views = Vec::new();
    for batch in batch_repo::list_all(&state.db).await? {
        let rollup = rollup_batch(state, batch, now).await?;
        let stats = with_stats.then(|| rollup.stats());
        let matrix = rollup.matrix();
        views.push(BatchView {
            id: rollup.batch.id,
            name: rollup.batch.name.clone(),
            current_subject: rollup.batch.current_subject.clone(),
            matrix,
            courses: with_courses.then_some(rollup.courses),
            stats,
        });
    }
    Ok(views)
}

/// Buckets each active enrollment of a batch into its queue.
pub async fn batch_students(
    state: &AppState,
    batch_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Vec<StudentQueueEntry>> {
    let batch = batch_repo::find_by_id(&state.db, &batch_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let rollup = rollup_batch(state, batch, now).await?;
    Ok(rollup
        .entries
        .into_iter()
        .map(|entry| StudentQueueEntry {
            enrollment_id: entry.enrollment.id,
            user_id: entry.enrollment.user_id,
            course_id: entry.enrollment.course_id,
            next_subject: entry.next_subject,
            validity_left_days: entry.enrollment.validity_left_days(now),
            decision: entry.decision,
        })
        .collect())
}
