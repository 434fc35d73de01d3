use crate::routes::common::{error_response, success};
use crate::routes::extract::ApiPath;
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::Response,
};
use serde::Serialize;
use services::{Caller, attendance_service};
use util::state::AppState;

/// DELETE /attendance/{id}
///
/// Soft-deletes one mark. The row stays in storage and can come back through a
/// session restore.
///
/// ### Responses
/// - `200 OK`
/// - `403 Forbidden` for non-teachers
/// - `404 Not Found` when the mark is missing, already deleted, or on a subject
///   the caller does not own
pub async fn delete_record(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<i64>,
) -> Response {
    match attendance_service::soft_delete_record(state.db(), &caller, id).await {
        Ok(()) => success(StatusCode::OK, (), "Attendance record deleted successfully"),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedCount {
    pub deleted_count: u64,
}

/// DELETE /attendance/session/{session_id}
///
/// ### Responses
/// - `200 OK` with `{ "deleted_count": n }`
/// - `400 Bad Request` for a malformed session id
/// - `403 Forbidden` for non-teachers
/// - `404 Not Found` when the session has no active marks the caller owns
pub async fn delete_session(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(session_id): ApiPath<String>,
) -> Response {
    match attendance_service::soft_delete_session(state.db(), &caller, &session_id).await {
        Ok(deleted_count) => success(
            StatusCode::OK,
            DeletedCount { deleted_count },
            "Session deleted successfully",
        ),
        Err(e) => error_response(e),
    }
}
