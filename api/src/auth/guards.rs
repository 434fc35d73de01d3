//! Request guards. Each one rejects with an `ApiResponse` envelope and, on success,
//! leaves what it resolved in the request extensions for handlers to pick up.

use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use axum::{
    Json,
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use db::models::user;
use sea_orm::EntityTrait;
use services::Caller;
use util::state::AppState;

type Rejection = (StatusCode, Json<ApiResponse<()>>);

fn unauthorized() -> Rejection {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::failure("unauthorized", "Authentication required")),
    )
}

/// Validates the bearer token and inserts `AuthUser` into request extensions.
async fn extract_and_insert_authuser(req: Request<Body>) -> Result<(Request<Body>, AuthUser), Rejection> {
    let (mut parts, body) = req.into_parts();
    let user = AuthUser::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| unauthorized())?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user.clone());
    Ok((req, user))
}

/// Any valid token.
pub async fn allow_authenticated(req: Request<Body>, next: Next) -> Result<Response, Rejection> {
    let (req, _user) = extract_and_insert_authuser(req).await?;
    Ok(next.run(req).await)
}

/// Valid token for a user that still exists. Resolves the caller's role once and
/// inserts it as a `Caller` extension.
pub async fn require_caller(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, Rejection> {
    let (mut req, AuthUser(claims)) = extract_and_insert_authuser(req).await?;
    let db = state.db();

    let exists = user::Entity::find_by_id(claims.sub)
        .one(db)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "user lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::failure("internal", "Internal server error")),
            )
        })?;
    if exists.is_none() {
        return Err(unauthorized());
    }

    let caller = Caller::resolve(db, claims.sub).await.map_err(|e| {
        tracing::error!(error = %e, user_id = claims.sub, "role resolution failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure("internal", "Internal server error")),
        )
    })?;

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}
