use crate::routes::common::{error_response, success, validation_error};
use crate::routes::extract::ApiJson;
use axum::{Extension, extract::State, http::StatusCode, response::Response};
use common::format_validation_errors;
use serde::Deserialize;
use services::{Caller, roster_service, roster_service::SubjectInput};
use util::state::AppState;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubjectRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "code must be 1-20 characters"))]
    pub code: String,
    #[serde(default)]
    pub sections: Vec<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub semester: Option<String>,
}

impl From<CreateSubjectRequest> for SubjectInput {
    fn from(req: CreateSubjectRequest) -> Self {
        SubjectInput {
            name: req.name,
            code: req.code,
            sections: req.sections,
            department: req.department,
            semester: req.semester,
        }
    }
}

/// POST /subjects
///
/// ### Request Body
/// ```json
/// { "name": "Operating Systems", "code": "CS501", "sections": ["A", "B"], "semester": "5" }
/// ```
/// `department` defaults to the teacher's own.
///
/// ### Responses
/// - `201 Created` with the subject
/// - `400 Bad Request` for invalid fields or a name/code already in use
/// - `403 Forbidden` for non-teachers
pub async fn create_subject(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(req): ApiJson<CreateSubjectRequest>,
) -> Response {
    if let Err(e) = req.validate() {
        return validation_error(format_validation_errors(&e));
    }

    match roster_service::create_subject(state.db(), &caller, req.into()).await {
        Ok(subject) => success(StatusCode::CREATED, subject, "Subject created successfully"),
        Err(e) => error_response(e),
    }
}
