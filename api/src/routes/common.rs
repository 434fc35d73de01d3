//! Shared response helpers for route handlers.

use crate::response::ApiResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use services::ServiceError;

/// Status code for a service failure. Conflicts are reported as `400` alongside
/// validation failures; the `error` kind in the body tells them apart.
pub fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Validation(_) | ServiceError::Conflict(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Renders a service failure as an `ApiResponse` envelope. Storage errors are
/// logged and replaced with a generic message.
pub fn error_response(err: ServiceError) -> Response {
    let status = status_for(&err);
    let message = match &err {
        ServiceError::Database(e) => {
            tracing::error!(error = %e, "database failure");
            "Internal server error".to_string()
        }
        other => other.to_string(),
    };

    (status, Json(ApiResponse::<()>::failure(err.kind(), message))).into_response()
}

pub fn validation_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::failure("validation", message)),
    )
        .into_response()
}

pub fn success<T: Serialize>(status: StatusCode, data: T, message: &str) -> Response {
    (status, Json(ApiResponse::success(data, message))).into_response()
}
