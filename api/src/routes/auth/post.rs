use crate::auth::{AuthUser, generate_jwt};
use crate::response::ApiResponse;
use crate::routes::common::{error_response, success, validation_error};
use crate::routes::extract::ApiJson;
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::format_validation_errors;
use serde::{Deserialize, Serialize};
use services::user_service;
use util::state::AppState;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub role: &'static str,
    pub admin: bool,
    pub must_change_password: bool,
    pub token: String,
    pub expires_at: String,
}

/// POST /auth/login
///
/// ### Request Body
/// ```json
/// { "username": "REG2024001", "password": "REG2024001" }
/// ```
///
/// ### Responses
/// - `200 OK` with a bearer token, its expiry, the caller's role
///   (`teacher` / `student` / `unknown`) and `must_change_password`
/// - `400 Bad Request` when a field is empty
/// - `401 Unauthorized` for wrong credentials
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Response {
    if let Err(e) = req.validate() {
        return validation_error(format_validation_errors(&e));
    }

    let outcome = match user_service::authenticate(state.db(), &req.username, &req.password).await {
        Ok(Some(outcome)) => outcome,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::<()>::failure(
                    "unauthorized",
                    "Invalid username or password",
                )),
            )
                .into_response();
        }
        Err(e) => return error_response(e),
    };

    let (token, expires_at) =
        match generate_jwt(outcome.user.id, &outcome.user.username, outcome.user.admin) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::error!(error = %e, "token encoding failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<()>::failure("internal", "Could not issue token")),
                )
                    .into_response();
            }
        };

    let body = LoginResponse {
        id: outcome.user.id,
        full_name: outcome.user.display_name(),
        username: outcome.user.username,
        role: outcome.caller.role.as_str(),
        admin: outcome.user.admin,
        must_change_password: outcome.must_change_password,
        token,
        expires_at,
    };
    success(StatusCode::OK, body, "Login successful")
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// POST /auth/change-password
///
/// ### Request Body
/// ```json
/// { "old_password": "REG2024001", "new_password": "something-longer" }
/// ```
///
/// ### Responses
/// - `200 OK`
/// - `400 Bad Request` when either password is missing, the old one does not
///   match, or the new one is shorter than eight characters
pub async fn change_password(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> Response {
    match user_service::change_password(state.db(), claims.sub, &req.old_password, &req.new_password)
        .await
    {
        Ok(()) => success(StatusCode::OK, (), "Password changed successfully"),
        Err(e) => error_response(e),
    }
}
