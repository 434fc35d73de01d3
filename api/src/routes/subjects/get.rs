use crate::routes::common::{error_response, success};
use crate::routes::extract::ApiPath;
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::Response,
};
use services::{Caller, roster_service};
use util::state::AppState;

/// GET /subjects
///
/// Subjects owned by the calling teacher, by name. Empty for everyone else.
pub async fn list_subjects(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Response {
    match roster_service::list_subjects(state.db(), &caller).await {
        Ok(subjects) => success(StatusCode::OK, subjects, "Subjects retrieved successfully"),
        Err(e) => error_response(e),
    }
}

/// GET /subjects/{id}
pub async fn get_subject(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<i64>,
) -> Response {
    match roster_service::get_subject(state.db(), &caller, id).await {
        Ok(subject) => success(StatusCode::OK, subject, "Subject retrieved successfully"),
        Err(e) => error_response(e),
    }
}
