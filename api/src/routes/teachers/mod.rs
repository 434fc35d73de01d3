//! `/teachers`: the calling teacher's profile and roster lookup.

use axum::{Router, routing::get};
use util::state::AppState;

pub mod get;

use get::{get_profile, get_students};

pub fn teachers_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/students", get(get_students))
}
