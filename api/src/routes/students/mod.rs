//! `/students`: the calling student's profile and teacher-side roster upload.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use util::{config, state::AppState};

pub mod get;
pub mod post;

use get::get_profile;
use post::upload_roster;

pub fn students_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile)).route(
        "/upload",
        post(upload_roster).layer(DefaultBodyLimit::max(config::max_roster_upload_bytes())),
    )
}
