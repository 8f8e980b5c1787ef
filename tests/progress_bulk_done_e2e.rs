//! Exercises the bulk mark-done upsert against a live Postgres instance.
//!
//! Requires TEST_DATABASE_URL to point at a database with db/schema.sql
//! applied; the tests skip themselves when it is unset.

use chrono::{Duration, Utc};
use uuid::Uuid;

use academics::db::create_pool;
use academics::repositories::progress as progress_repo;
use academics::repositories::progress::BulkDoneOutcome;

async fn test_pool() -> Option<deadpool_postgres::Pool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    Some(create_pool(&url).expect("TEST_DATABASE_URL must be a valid postgres URL"))
}

async fn seed_course(client: &deadpool_postgres::Client) -> Uuid {
    let id = Uuid::new_v4();
    client
        .execute(
            r#"
            INSERT INTO courses (id, name, subjects, start_subject)
            VALUES ($1, 'Foundation', ARRAY['A', 'B', 'C', 'D'], 'A')
            "#,
            &[&id],
        )
        .await
        .unwrap();
    id
}

async fn seed_enrollment(client: &deadpool_postgres::Client, course_id: &Uuid) -> Uuid {
    let id = Uuid::new_v4();
    let valid_till = Utc::now() + Duration::days(30);
    client
        .execute(
            r#"
            INSERT INTO enrollments (id, user_id, course_id, status, valid_till)
            VALUES ($1, $2, $3, 'active', $4)
            "#,
            &[&id, &Uuid::new_v4(), course_id, &valid_till],
        )
        .await
        .unwrap();
    id
}

async fn cleanup(
    client: &deadpool_postgres::Client,
    course_id: &Uuid,
    enrollment_ids: &[Uuid],
) {
    let ids: Vec<Uuid> = enrollment_ids.to_vec();
    client
        .execute(
            "DELETE FROM subject_progress WHERE enrollment_id = ANY($1)",
            &[&ids],
        )
        .await
        .unwrap();
    client
        .execute("DELETE FROM enrollments WHERE id = ANY($1)", &[&ids])
        .await
        .unwrap();
    client
        .execute("DELETE FROM courses WHERE id = $1", &[course_id])
        .await
        .unwrap();
}

#[tokio::test]
async fn bulk_mark_done_splits_inserts_from_updates() {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return;
    };
    let client = pool.get().await.unwrap();

    let course_id = seed_course(&client).await;
    let first = seed_enrollment(&client, &course_id).await;
    let second = seed_enrollment(&client, &course_id).await;

    // Pre-existing pending row for the first enrollment; the second has none.
    client
        .execute(
            r#"
            INSERT INTO subject_progress (enrollment_id, subject, status)
            VALUES ($1, 'A', 'pending')
            "#,
            &[&first],
        )
        .await
        .unwrap();

    let outcome = progress_repo::bulk_mark_done(&pool, &[first, second], "A")
        .await
        .unwrap();
    assert_eq!(outcome, BulkDoneOutcome { modified: 1, upserted: 1 });

    for id in [first, second] {
        let done = progress_repo::done_subjects(&pool, &id).await.unwrap();
        assert!(done.contains("A"));
    }

    cleanup(&client, &course_id, &[first, second]).await;
}

#[tokio::test]
async fn bulk_mark_done_is_idempotent() {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return;
    };
    let client = pool.get().await.unwrap();

    let course_id = seed_course(&client).await;
    let first = seed_enrollment(&client, &course_id).await;
    let second = seed_enrollment(&client, &course_id).await;

    // Fresh enrollments: both rows are inserts.
    let outcome = progress_repo::bulk_mark_done(&pool, &[first, second], "C")
        .await
        .unwrap();
    assert_eq!(outcome, BulkDoneOutcome { modified: 0, upserted: 2 });

    // The identical call again touches nothing.
    let outcome = progress_repo::bulk_mark_done(&pool, &[first, second], "C")
        .await
        .unwrap();
    assert_eq!(outcome, BulkDoneOutcome { modified: 0, upserted: 0 });

    cleanup(&client, &course_id, &[first, second]).await;
}
