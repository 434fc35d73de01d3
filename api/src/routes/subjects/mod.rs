//! `/subjects`: the calling teacher's subject registry.

use axum::{Router, routing::get};
use util::state::AppState;

pub mod delete;
pub mod get;
pub mod post;
pub mod put;

use delete::delete_subject;
use get::{get_subject, list_subjects};
use post::create_subject;
use put::update_subject;

pub fn subjects_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_subjects).post(create_subject))
        .route(
            "/{id}",
            get(get_subject).put(update_subject).delete(delete_subject),
        )
}
