use crate::routes::common::{error_response, success, validation_error};
use crate::routes::extract::{ApiJson, ApiPath};
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::Response,
};
use common::format_validation_errors;
use serde::Deserialize;
use services::{Caller, roster_service, roster_service::SubjectChanges};
use util::state::AppState;
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSubjectRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 20, message = "code must be 1-20 characters"))]
    pub code: Option<String>,
    pub sections: Option<Vec<String>>,
    pub department: Option<String>,
    pub semester: Option<String>,
}

/// PUT /subjects/{id}
///
/// Partial update; omitted fields are left as they are.
///
/// ### Responses
/// - `200 OK` with the updated subject
/// - `400 Bad Request` for invalid fields or a name/code already in use
/// - `403 Forbidden` for non-teachers
/// - `404 Not Found` when the subject is not the caller's
pub async fn update_subject(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateSubjectRequest>,
) -> Response {
    if let Err(e) = req.validate() {
        return validation_error(format_validation_errors(&e));
    }

    let changes = SubjectChanges {
        name: req.name,
        code: req.code,
        sections: req.sections,
        department: req.department,
        semester: req.semester,
    };

    match roster_service::update_subject(state.db(), &caller, id, changes).await {
        Ok(subject) => success(StatusCode::OK, subject, "Subject updated successfully"),
        Err(e) => error_response(e),
    }
}
