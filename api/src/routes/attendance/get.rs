use crate::routes::common::{error_response, success};
use crate::routes::extract::ApiPath;
use axum::{
    Extension,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use services::{Caller, attendance_service, summary_service};
use util::state::AppState;

/// GET /attendance
///
/// Active marks visible to the caller, newest date and session first. Teachers
/// see marks on subjects they own, students see their own marks, anyone else
/// gets an empty list.
pub async fn list_attendance(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Response {
    match attendance_service::list_for_caller(state.db(), &caller).await {
        Ok(records) => success(StatusCode::OK, records, "Attendance retrieved successfully"),
        Err(e) => error_response(e),
    }
}

/// GET /attendance/{id}
///
/// ### Responses
/// - `200 OK` with the mark, its student and subject names and the recorder's username
/// - `404 Not Found` when the mark is missing, deleted, or not visible to the caller
pub async fn get_record(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<i64>,
) -> Response {
    match attendance_service::get_record(state.db(), &caller, id).await {
        Ok(record) => success(StatusCode::OK, record, "Attendance record retrieved successfully"),
        Err(e) => error_response(e),
    }
}

/// GET /attendance/{id}/summary
///
/// `id` is a student id. Only that student may read it.
///
/// ```json
/// { "student_id": 3, "name": "Asha", "total": 10, "present": 8, "percentage": 80.0 }
/// ```
pub async fn student_summary(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<i64>,
) -> Response {
    match summary_service::student_summary(state.db(), &caller, id).await {
        Ok(summary) => success(StatusCode::OK, summary, "Attendance summary retrieved successfully"),
        Err(e) => error_response(e),
    }
}

/// GET /attendance/teacher-summary
///
/// One row per active session on the caller's subjects with total, present and
/// absent counts.
pub async fn teacher_summary(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Response {
    match summary_service::teacher_session_summary(state.db(), &caller).await {
        Ok(rows) => success(StatusCode::OK, rows, "Session summary retrieved successfully"),
        Err(e) => error_response(e),
    }
}

/// GET /attendance/teacher-deleted
///
/// Soft-deleted sessions that can still be restored.
pub async fn teacher_deleted(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Response {
    match summary_service::teacher_deleted_sessions(state.db(), &caller).await {
        Ok(rows) => success(StatusCode::OK, rows, "Deleted sessions retrieved successfully"),
        Err(e) => error_response(e),
    }
}

/// GET /attendance/session/{session_id}
pub async fn list_session(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(session_id): ApiPath<String>,
) -> Response {
    match attendance_service::list_by_session(state.db(), &caller, &session_id).await {
        Ok(records) => success(StatusCode::OK, records, "Session retrieved successfully"),
        Err(e) => error_response(e),
    }
}

/// GET /attendance/session/{session_id}/export
///
/// Downloads the session's active marks as `text/csv`.
pub async fn export_session(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(session_id): ApiPath<String>,
) -> Response {
    let csv = match attendance_service::export_session_csv(state.db(), &caller, &session_id).await {
        Ok(csv) => csv,
        Err(e) => return error_response(e),
    };

    let filename = format!("attendance_session_{session_id}.csv");

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
            .unwrap_or(HeaderValue::from_static("attachment")),
    );

    (StatusCode::OK, headers, csv).into_response()
}
