use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::Result,
    services::academics::{self as academics_service, BatchView, CourseAction, StudentQueueEntry},
    state::AppState,
    validation::academics::*,
};

/// The query parameters for the batch listing.
#[derive(Deserialize)]
pub struct ListBatchesQuery {
    /// Comma-separated extras to embed: `stats`, `courses`.
    #[serde(default)]
    pub with: Option<String>,
}

/// The request payload for advancing a batch's live subject.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceSubjectRequest {
    pub current_subject: String,
}

/// The request payload for bulk mark-done.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BulkDoneRequest {
    pub enrollment_ids: Vec<Uuid>,
    pub subject: String,
}

/// The request payload for updating a course's rotation anchor.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StartSubjectRequest {
    pub start_subject: String,
}

/// The request payload for attaching/detaching batch courses.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BatchCoursesRequest {
    pub course_ids: Vec<Uuid>,
    pub action: CourseAction,
}

/// The response payload for the batch listing.
#[derive(Serialize)]
pub struct ListBatchesResponse {
    pub batches: Vec<BatchView>,
    pub count: usize,
}

/// The response payload for the per-batch student listing.
#[derive(Serialize)]
pub struct BatchStudentsResponse {
    pub students: Vec<StudentQueueEntry>,
    pub count: usize,
}

/// Returns the admin overview KPI rollup.
#[axum::debug_handler]
pub async fn overview(State(state): State<AppState>) -> Result<Response> {
    let overview = academics_service::overview(&state, Utc::now()).await?;
    Ok((StatusCode::OK, Json(overview)).into_response())
}

/// Lists batches with completion matrices and optional extras.
#[axum::debug_handler]
pub async fn list_batches(
    State(state): State<AppState>,
    Query(query): Query<ListBatchesQuery>,
) -> Result<Response> {
    let with = query.with.unwrap_or_default();
    let extras: Vec<&str> = with.split(',').map(str::trim).collect();
    let with_stats = extras.contains(&"stats");
    let with_courses = extras.contains(&"courses");

    let batches =
        academics_service::list_batches(&state, with_stats, with_courses, Utc::now()).await?;

    let count = batches.len();
    Ok((StatusCode::OK, Json(ListBatchesResponse { batches, count })).into_response())
}

/// Advances a batch to a new live subject.
#[axum::debug_handler]
pub async fn advance_subject(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
    Json(req): Json<AdvanceSubjectRequest>,
) -> Result<Response> {
    validate_subject_label(&req.current_subject)?;

    let batch =
        academics_service::advance_subject(&state, batch_id, &req.current_subject).await?;

    Ok((StatusCode::OK, Json(batch)).into_response())
}

/// Bulk-marks a subject done for a set of enrollments.
#[axum::debug_handler]
pub async fn bulk_done(
    State(state): State<AppState>,
    Json(req): Json<BulkDoneRequest>,
) -> Result<Response> {
    validate_subject_label(&req.subject)?;
    validate_enrollment_ids(&req.enrollment_ids)?;

    let outcome =
        academics_service::mark_done(&state, &req.enrollment_ids, &req.subject).await?;

    let response = sonic_rs::to_string(&sonic_rs::json!({
        "modified": outcome.modified,
        "upserted": outcome.upserted
    }))
    .unwrap();

    Ok((StatusCode::OK, response).into_response())
}

/// Returns the per-student queue bucketing for a batch.
#[axum::debug_handler]
pub async fn batch_students(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> Result<Response> {
    let students = academics_service::batch_students(&state, batch_id, Utc::now()).await?;

    let count = students.len();
    Ok((StatusCode::OK, Json(BatchStudentsResponse { students, count })).into_response())
}

/// Updates a course's rotation start subject.
#[axum::debug_handler]
pub async fn set_start_subject(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(req): Json<StartSubjectRequest>,
) -> Result<Response> {
    validate_subject_label(&req.start_subject)?;

    let course =
        academics_service::set_start_subject(&state, course_id, &req.start_subject).await?;

    Ok((StatusCode::OK, Json(course)).into_response())
}

/// Attaches or detaches courses from a batch.
#[axum::debug_handler]
pub async fn set_batch_courses(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
    Json(req): Json<BatchCoursesRequest>,
) -> Result<Response> {
    let batch =
        academics_service::set_batch_courses(&state, batch_id, &req.course_ids, req.action)
            .await?;

    Ok((StatusCode::OK, Json(batch)).into_response())
}
