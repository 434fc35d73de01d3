use crate::routes::common::{error_response, success};
use crate::routes::extract::ApiQuery;
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;
use services::{Caller, roster_service, roster_service::RosterQuery};
use util::state::AppState;

/// GET /teachers/profile
///
/// The teacher's profile with its user and owned subjects. `404` for callers
/// without a teacher profile.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Response {
    match roster_service::teacher_profile(state.db(), &caller).await {
        Ok(profile) => success(StatusCode::OK, profile, "Teacher profile retrieved successfully"),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StudentsQuery {
    pub subject: Option<String>,
    pub semester: Option<String>,
    pub section: Option<String>,
}

/// GET /teachers/students?subject={id}&semester={semester}&section={section}
///
/// Students of the teacher's department in the given semester and section.
///
/// ### Responses
/// - `200 OK` with the students, by register number
/// - `400 Bad Request` when `semester` or `section` is missing, the subject is
///   not the caller's for that semester, or the section is not one the subject serves
/// - `404 Not Found` for callers without a teacher profile
pub async fn get_students(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(query): ApiQuery<StudentsQuery>,
) -> Response {
    let query = RosterQuery {
        subject_id: query.subject.and_then(|s| s.trim().parse().ok()),
        semester: query.semester,
        section: query.section,
    };

    match roster_service::students_for_teacher(state.db(), &caller, query).await {
        Ok(students) => success(StatusCode::OK, students, "Students retrieved successfully"),
        Err(e) => error_response(e),
    }
}
