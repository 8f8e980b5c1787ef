use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::{
    batch::Batch,
    course::Course,
    enrollment::{Enrollment, EnrollmentStatus},
    live_session::LiveSession,
};
use crate::services::rotation;

/// How early a student may join before a session's scheduled start.
pub const JOIN_GRACE_MINUTES: i64 = 10;

/// The queue an enrollment falls into at a given instant.
///
/// Every bucketing call site (single-student next-step, per-batch student
/// listing, overview rollups) goes through [`classify`]; nothing compares
/// queue strings by hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum QueueDecision {
    /// The batch is live on the enrollment's next subject and a session
    /// window is open right now.
    #[serde(rename_all = "camelCase")]
    JoinLiveNow {
        /// The earliest-starting session whose window is open.
        session: LiveSession,
    },
    /// The enrollment still has a pending subject, but the batch is elsewhere
    /// or no session window is open.
    BacklogRecorded,
    /// The enrollment has finished the full rotation.
    Completed,
}

/// The eligibility verdict surfaced to the student UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextStep {
    /// Whether the student may join a live session right now.
    pub joinable: bool,
    /// The subject the student must study next, if any remain.
    pub next_subject: Option<String>,
    /// The open live session, when joinable.
    pub live_session: Option<LiveSession>,
    /// Whether the enrollment's validity has lapsed.
    pub validity_over: bool,
}

/// Whether `now` falls inside a session's joinable window:
/// from `start_at` minus the grace period through `end_at`.
pub fn window_open(session: &LiveSession, now: DateTime<Utc>) -> bool {
    now >= session.start_at - Duration::minutes(JOIN_GRACE_MINUTES) && now <= session.end_at
}

/// Picks the earliest-starting session of the batch whose window is open for
/// the given subject.
pub fn live_session_for<'a>(
    sessions: &'a [LiveSession],
    batch_id: uuid::Uuid,
    subject: &str,
    now: DateTime<Utc>,
) -> Option<&'a LiveSession> {
    sessions
        .iter()
        .filter(|s| s.batch_id == batch_id && s.subject == subject)
        .filter(|s| window_open(s, now))
        .min_by_key(|s| s.start_at)
}

/// Buckets one enrollment at one instant. Pure; no side effects; safe to
/// call repeatedly and concurrently.
pub fn classify(
    enrollment: &Enrollment,
    course: &Course,
    batch: &Batch,
    sessions: &[LiveSession],
    done: &HashSet<String>,
    now: DateTime<Utc>,
) -> QueueDecision {
    let next = match rotation::next_subject(&course.subjects, &course.start_subject, done) {
        Some(subject) => subject,
        None => return QueueDecision::Completed,
    };

    if enrollment.status != EnrollmentStatus::Active
        || enrollment.validity_over(now)
        || batch.current_subject != next
    {
        return QueueDecision::BacklogRecorded;
    }

    match live_session_for(sessions, batch.id, &next, now) {
        Some(session) => QueueDecision::JoinLiveNow {
            session: session.clone(),
        },
        // Right subject, but no open window: backlog until the next session.
        None => QueueDecision::BacklogRecorded,
    }
}

/// Composes the full next-step verdict for one enrollment.
///
/// `batch` is `None` when the enrollment's course is not attached to any
/// batch; the student then cannot be joinable but still sees their next
/// subject and validity state.
pub fn next_step(
    enrollment: &Enrollment,
    course: &Course,
    batch: Option<&Batch>,
    sessions: &[LiveSession],
    done: &HashSet<String>,
    now: DateTime<Utc>,
) -> NextStep {
    let next = rotation::next_subject(&course.subjects, &course.start_subject, done);
    let validity_over = enrollment.validity_over(now);

    let decision = match batch {
        Some(batch) => classify(enrollment, course, batch, sessions, done, now),
        None => {
            if next.is_none() {
                QueueDecision::Completed
            } else {
                QueueDecision::BacklogRecorded
            }
        }
    };

    let live_session = match decision {
        QueueDecision::JoinLiveNow { session } => Some(session),
        _ => None,
    };

    NextStep {
        joinable: live_session.is_some(),
        next_subject: next,
        live_session,
        validity_over,
    }
}
