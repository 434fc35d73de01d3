use crate::routes::common::{error_response, success};
use axum::{Extension, extract::State, http::StatusCode, response::Response};
use services::{Caller, summary_service};
use util::state::AppState;

/// GET /students/profile
///
/// The student's profile, enrolled subjects and overall attendance percentage
/// over active marks.
///
/// ```json
/// {
///   "id": 3, "full_name": "Asha", "register_number": "REG2024001", ...,
///   "subjects": [ { "id": 4, "name": "Operating Systems", ... } ],
///   "total": 10, "present": 8, "attendance_percentage": 80.0
/// }
/// ```
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Response {
    match summary_service::student_overview(state.db(), &caller).await {
        Ok(overview) => success(StatusCode::OK, overview, "Student profile retrieved successfully"),
        Err(e) => error_response(e),
    }
}
