use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::Result,
    models::{identity::Identity, live_session::LiveSession, subject_progress::ProgressStatus},
    services::student as student_service,
    state::AppState,
};

/// The query parameters for the next-step lookup.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextStepQuery {
    /// The course to resolve against; the student's most-recently-updated
    /// enrollment is used when omitted.
    #[serde(default)]
    pub course_id: Option<Uuid>,
}

/// The query parameters for the upcoming-sessions listing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsQuery {
    #[serde(default)]
    pub batch_id: Option<Uuid>,
    #[serde(default)]
    pub subject: Option<String>,
}

/// The request payload for the direct progress status set.
#[derive(Deserialize, Debug)]
pub struct SetProgressRequest {
    pub status: ProgressStatus,
}

/// The response payload for the upcoming-sessions listing.
#[derive(Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<LiveSession>,
    pub count: usize,
}

/// Returns the eligibility verdict for the calling student.
#[axum::debug_handler]
pub async fn next_step(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<NextStepQuery>,
) -> Result<Response> {
    let verdict =
        student_service::next_step(&state, identity.user_id, query.course_id, Utc::now())
            .await?;

    Ok((StatusCode::OK, Json(verdict)).into_response())
}

/// Lists upcoming sessions, optionally filtered by batch and/or subject.
#[axum::debug_handler]
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<SessionsQuery>,
) -> Result<Response> {
    let sessions =
        student_service::upcoming_sessions(&state, query.batch_id, query.subject, Utc::now())
            .await?;

    let count = sessions.len();
    Ok((StatusCode::OK, Json(SessionsResponse { sessions, count })).into_response())
}

/// Sets a single progress row's status directly.
#[axum::debug_handler]
pub async fn set_progress_status(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(progress_id): Path<Uuid>,
    Json(req): Json<SetProgressRequest>,
) -> Result<Response> {
    let progress =
        student_service::set_progress_status(&state, &identity, progress_id, req.status)
            .await?;

    Ok((StatusCode::OK, Json(progress)).into_response())
}
