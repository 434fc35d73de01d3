use api::{auth::generate_jwt, routes::routes};
use axum::{Router, body::Body, response::Response};
use db::{models::user, test_utils::setup_test_db};
use serde_json::Value;
use util::state::AppState;

/// Router mounted under `/api` on a fresh in-memory database.
pub async fn make_test_app() -> (Router, AppState) {
    let db = setup_test_db().await;
    let app_state = AppState::new(db);
    let router = Router::new().nest("/api", routes(app_state.clone()));
    (router, app_state)
}

pub fn bearer(user: &user::Model) -> String {
    let (token, _) = generate_jwt(user.id, &user.username, user.admin).expect("encode token");
    format!("Bearer {token}")
}

pub async fn json_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
