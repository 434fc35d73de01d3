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

/// DELETE /subjects/{id}
///
/// Removes the subject along with its enrolments and attendance marks.
pub async fn delete_subject(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<i64>,
) -> Response {
    match roster_service::delete_subject(state.db(), &caller, id).await {
        Ok(()) => success(StatusCode::OK, (), "Subject deleted successfully"),
        Err(e) => error_response(e),
    }
}
