use crate::routes::common::{error_response, success, validation_error};
use axum::{
    Extension,
    extract::{Multipart, State},
    http::StatusCode,
    response::Response,
};
use services::{Caller, roster_service};
use util::state::AppState;

/// POST /students/upload
///
/// Imports a roster from the multipart field `file`, either an Excel workbook
/// (first sheet) or a UTF-8 CSV. Required columns are
/// `register_number, full_name, department, semester, year, section`;
/// `course` and `roll_number` are optional.
///
/// Missing users and students are created, existing ones are left alone. A new
/// user's username and initial password are the register number.
///
/// ### Responses
/// - `200 OK` with `{ "processed": n, "created_users": n, "created_students": n }`
/// - `400 Bad Request` for a missing or unreadable file, a missing column or a bad row
/// - `403 Forbidden` for non-teachers
pub async fn upload_roster(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    mut multipart: Multipart,
) -> Response {
    let mut file_bytes = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "malformed roster upload");
                return validation_error("Malformed multipart body");
            }
        };
        if field.name() != Some("file") {
            continue;
        }
        match field.bytes().await {
            Ok(bytes) => file_bytes = Some(bytes),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read roster file");
                return validation_error("Could not read uploaded file");
            }
        }
    }

    let Some(bytes) = file_bytes else {
        return validation_error("No file uploaded");
    };

    match roster_service::import_roster(state.db(), &caller, &bytes).await {
        Ok(outcome) => success(StatusCode::OK, outcome, "Roster imported successfully"),
        Err(e) => error_response(e),
    }
}
