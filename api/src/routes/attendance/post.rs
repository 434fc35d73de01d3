use super::common::CreateAttendanceBody;
use crate::routes::common::{error_response, success, validation_error};
use crate::routes::extract::{ApiJson, ApiPath};
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::Response,
};
use serde::Serialize;
use serde_json::Value;
use services::{Caller, attendance_service};
use util::state::AppState;

/// POST /attendance
///
/// Records a batch of marks. Every mark in the request shares one freshly
/// generated `session_id`.
///
/// ### Request Body
/// Either an envelope
/// ```json
/// {
///   "semester": "5",
///   "section": "A",
///   "items": [
///     { "student": 1, "subject": 4, "date": "2025-03-01", "session": 2, "status": "Present" }
///   ]
/// }
/// ```
/// or a bare list of marks (each carrying `semester` and `section`), or a
/// single mark. `date` defaults to today and `session` to `1`.
///
/// ### Responses
/// - `201 Created` with `{ "created_count": 1, "session_id": "..." }`
/// - `400 Bad Request` for malformed input or an already marked slot
/// - `403 Forbidden` when the caller is not a teacher or does not own a subject
pub async fn create_attendance(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(body): ApiJson<Value>,
) -> Response {
    let body: CreateAttendanceBody = match serde_json::from_value(body) {
        Ok(body) => body,
        Err(_) => {
            return validation_error(
                "Expected an attendance entry, a list of entries, or { semester, section, items }",
            );
        }
    };
    let batch = match body.into_batch() {
        Ok(batch) => batch,
        Err(message) => return validation_error(message),
    };

    match attendance_service::create_batch(state.db(), &caller, batch).await {
        Ok(created) => success(StatusCode::CREATED, created, "Attendance saved successfully"),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Serialize)]
pub struct RestoredSession {
    pub restored_count: u64,
}

/// POST /attendance/session/{session_id}/restore
///
/// Restores every soft-deleted mark of the session. Fails as a whole when any
/// of them would collide with a mark recorded since.
///
/// ### Responses
/// - `200 OK` with `{ "restored_count": n }`
/// - `400 Bad Request` for a malformed id or a slot that has been re-marked
/// - `403 Forbidden` for non-teachers
/// - `404 Not Found` when there is nothing deleted to restore
pub async fn restore_session(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(session_id): ApiPath<String>,
) -> Response {
    match attendance_service::restore_session(state.db(), &caller, &session_id).await {
        Ok(restored_count) => success(
            StatusCode::OK,
            RestoredSession { restored_count },
            "Session restored successfully",
        ),
        Err(e) => error_response(e),
    }
}
