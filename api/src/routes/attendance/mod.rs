//! `/attendance` routes.
//!
//! - `POST /attendance` → record a batch of marks under a fresh session id
//! - `GET /attendance` → active marks visible to the caller
//! - `GET /attendance/{id}`, `DELETE /attendance/{id}`
//! - `GET /attendance/{id}/summary` → a student's own attendance percentage
//! - `GET /attendance/teacher-summary`, `GET /attendance/teacher-deleted`
//! - `GET|DELETE /attendance/session/{session_id}`
//! - `POST /attendance/session/{session_id}/restore`
//! - `GET /attendance/session/{session_id}/export` → CSV download
//!
//! All handlers expect a resolved `Caller` extension (see `require_caller`).

use axum::{
    Router,
    routing::{get, post},
};
use util::state::AppState;

pub mod common;
pub mod delete;
pub mod get;
pub mod post;

use delete::{delete_record, delete_session};
use get::{
    export_session, get_record, list_attendance, list_session, student_summary,
    teacher_deleted, teacher_summary,
};
use post::{create_attendance, restore_session};

pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_attendance).post(create_attendance))
        .route("/teacher-summary", get(teacher_summary))
        .route("/teacher-deleted", get(teacher_deleted))
        .route("/session/{session_id}", get(list_session).delete(delete_session))
        .route("/session/{session_id}/restore", post(restore_session))
        .route("/session/{session_id}/export", get(export_session))
        .route("/{id}", get(get_record).delete(delete_record))
        .route("/{id}/summary", get(student_summary))
}
