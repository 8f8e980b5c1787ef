use std::collections::HashSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use academics::models::{
    batch::Batch,
    course::Course,
    enrollment::{Enrollment, EnrollmentStatus},
    live_session::LiveSession,
};
use academics::services::eligibility::{self, QueueDecision};

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, min, 0).unwrap()
}

fn course(labels: &[&str], start: &str) -> Course {
    Course {
        id: Uuid::new_v4(),
        name: "Foundation".to_string(),
        subjects: labels.iter().map(|s| s.to_string()).collect(),
        start_subject: start.to_string(),
        created_at: at(0, 0),
        updated_at: at(0, 0),
    }
}

fn enrollment(course: &Course, valid_till: DateTime<Utc>) -> Enrollment {
    Enrollment {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        course_id: course.id,
        status: EnrollmentStatus::Active,
        valid_till,
        created_at: at(0, 0),
        updated_at: at(0, 0),
    }
}

fn batch(course: &Course, current: &str) -> Batch {
    Batch {
        id: Uuid::new_v4(),
        name: "Alpha".to_string(),
        current_subject: current.to_string(),
        course_ids: vec![course.id],
        created_at: at(0, 0),
        updated_at: at(0, 0),
    }
}

fn session(
    batch: &Batch,
    subject: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> LiveSession {
    LiveSession {
        id: Uuid::new_v4(),
        batch_id: batch.id,
        subject: subject.to_string(),
        start_at: start,
        end_at: end,
        join_url: "https://meet.example/alpha".to_string(),
        recording_url: None,
        created_at: at(0, 0),
    }
}

fn done(labels: &[&str]) -> HashSet<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

fn far_future() -> DateTime<Utc> {
    at(0, 0) + Duration::days(365)
}

#[test]
fn joinable_within_ten_minute_pre_window() {
    let course = course(&["A", "B", "C", "D"], "C");
    let enr = enrollment(&course, far_future());
    let batch = batch(&course, "D");
    let sessions = vec![session(&batch, "D", at(10, 0), at(11, 0))];
    let done = done(&["C"]);

    // 09:51 is inside the grace window.
    let decision = eligibility::classify(&enr, &course, &batch, &sessions, &done, at(9, 51));
    assert!(matches!(decision, QueueDecision::JoinLiveNow { .. }));

    // 09:49 is one minute too early.
    let decision = eligibility::classify(&enr, &course, &batch, &sessions, &done, at(9, 49));
    assert_eq!(decision, QueueDecision::BacklogRecorded);
}

#[test]
fn window_boundaries_are_inclusive() {
    let course = course(&["A", "B"], "A");
    let enr = enrollment(&course, far_future());
    let batch = batch(&course, "A");
    let sessions = vec![session(&batch, "A", at(10, 0), at(11, 0))];
    let none_done = done(&[]);

    // Exactly start - 10min and exactly end are both joinable.
    for instant in [at(9, 50), at(11, 0)] {
        let decision =
            eligibility::classify(&enr, &course, &batch, &sessions, &none_done, instant);
        assert!(
            matches!(decision, QueueDecision::JoinLiveNow { .. }),
            "expected joinable at {instant}"
        );
    }

    // One second past the end is not.
    let after_end = at(11, 0) + Duration::seconds(1);
    let decision =
        eligibility::classify(&enr, &course, &batch, &sessions, &none_done, after_end);
    assert_eq!(decision, QueueDecision::BacklogRecorded);
}

#[test]
fn lapsed_validity_blocks_joining_despite_alignment() {
    let course = course(&["A", "B"], "A");
    let mut enr = enrollment(&course, at(9, 0));
    let batch = batch(&course, "A");
    let sessions = vec![session(&batch, "A", at(10, 0), at(11, 0))];
    let none_done = done(&[]);

    let decision =
        eligibility::classify(&enr, &course, &batch, &sessions, &none_done, at(10, 30));
    assert_eq!(decision, QueueDecision::BacklogRecorded);

    // The next-step view still reports the pending subject and the lapse.
    let step = eligibility::next_step(&enr, &course, Some(&batch), &sessions, &none_done, at(10, 30));
    assert!(!step.joinable);
    assert!(step.validity_over);
    assert_eq!(step.next_subject.as_deref(), Some("A"));
    assert!(step.live_session.is_none());

    // An expired status blocks the same way even with validity left.
    enr.valid_till = far_future();
    enr.status = EnrollmentStatus::Expired;
    let decision =
        eligibility::classify(&enr, &course, &batch, &sessions, &none_done, at(10, 30));
    assert_eq!(decision, QueueDecision::BacklogRecorded);
}

#[test]
fn batch_on_another_subject_means_backlog() {
    let course = course(&["A", "B", "C", "D"], "C");
    let enr = enrollment(&course, far_future());
    let batch = batch(&course, "A");
    let sessions = vec![session(&batch, "A", at(10, 0), at(11, 0))];

    // Enrollment's next subject is D, batch is live on A.
    let decision =
        eligibility::classify(&enr, &course, &batch, &sessions, &done(&["C"]), at(10, 30));
    assert_eq!(decision, QueueDecision::BacklogRecorded);
}

#[test]
fn right_subject_but_no_open_window_means_backlog() {
    let course = course(&["A", "B"], "A");
    let enr = enrollment(&course, far_future());
    let batch = batch(&course, "A");

    let decision = eligibility::classify(&enr, &course, &batch, &[], &done(&[]), at(10, 30));
    assert_eq!(decision, QueueDecision::BacklogRecorded);
}

#[test]
fn completed_rotation_is_reported_without_error() {
    let course = course(&["A", "B"], "A");
    let enr = enrollment(&course, far_future());
    let batch = batch(&course, "A");
    let all_done = done(&["A", "B"]);

    let decision = eligibility::classify(&enr, &course, &batch, &[], &all_done, at(10, 0));
    assert_eq!(decision, QueueDecision::Completed);

    let step = eligibility::next_step(&enr, &course, Some(&batch), &[], &all_done, at(10, 0));
    assert!(!step.joinable);
    assert_eq!(step.next_subject, None);
    assert!(step.live_session.is_none());
    assert!(!step.validity_over);
}

#[test]
fn earliest_starting_open_session_wins() {
    let course = course(&["A", "B"], "A");
    let enr = enrollment(&course, far_future());
    let batch = batch(&course, "A");
    let early = session(&batch, "A", at(10, 0), at(12, 0));
    let late = session(&batch, "A", at(10, 30), at(12, 0));
    let sessions = vec![late, early.clone()];

    let decision =
        eligibility::classify(&enr, &course, &batch, &sessions, &done(&[]), at(10, 45));
    match decision {
        QueueDecision::JoinLiveNow { session } => assert_eq!(session.id, early.id),
        other => panic!("expected joinable, got {other:?}"),
    }
}

#[test]
fn sessions_of_other_batches_or_subjects_are_ignored() {
    let course = course(&["A", "B"], "A");
    let enr = enrollment(&course, far_future());
    let b = batch(&course, "A");
    let other_batch = batch(&course, "A");

    let foreign = session(&other_batch, "A", at(10, 0), at(11, 0));
    let wrong_subject = session(&b, "B", at(10, 0), at(11, 0));
    let sessions = vec![foreign, wrong_subject];

    let decision =
        eligibility::classify(&enr, &course, &b, &sessions, &done(&[]), at(10, 30));
    assert_eq!(decision, QueueDecision::BacklogRecorded);
}

#[test]
fn next_step_without_a_batch_is_never_joinable() {
    let course = course(&["A", "B"], "A");
    let enr = enrollment(&course, far_future());

    let step = eligibility::next_step(&enr, &course, None, &[], &done(&[]), at(10, 0));
    assert!(!step.joinable);
    assert_eq!(step.next_subject.as_deref(), Some("A"));

    let step = eligibility::next_step(&enr, &course, None, &[], &done(&["A", "B"]), at(10, 0));
    assert!(!step.joinable);
    assert_eq!(step.next_subject, None);
}

#[test]
fn validity_left_days_clamps_at_zero() {
    let course = course(&["A"], "A");
    let enr = enrollment(&course, at(12, 0));

    assert_eq!(enr.validity_left_days(at(11, 0)), 0);
    assert_eq!(enr.validity_left_days(at(12, 0) - Duration::days(3)), 3);
    assert_eq!(enr.validity_left_days(at(12, 0) + Duration::days(10)), 0);
}

#[test]
fn queue_decision_serializes_with_kind_tags() {
    let course = course(&["A"], "A");
    let batch = batch(&course, "A");
    let live = session(&batch, "A", at(10, 0), at(11, 0));

    let backlog = serde_json::to_value(&QueueDecision::BacklogRecorded).unwrap();
    assert_eq!(backlog["kind"], "backlogRecorded");

    let completed = serde_json::to_value(&QueueDecision::Completed).unwrap();
    assert_eq!(completed["kind"], "completed");

    let joinable =
        serde_json::to_value(&QueueDecision::JoinLiveNow { session: live.clone() }).unwrap();
    assert_eq!(joinable["kind"], "joinLiveNow");
    assert_eq!(joinable["session"]["joinUrl"], live.join_url);
}
