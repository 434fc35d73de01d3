use crate::auth::guards::allow_authenticated;
use axum::{Router, middleware::from_fn, routing::post};
use util::state::AppState;

pub mod post;

pub use post::{change_password, login};

/// `/auth`: `POST /login` is public, `POST /change-password` needs a valid token.
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login)).route(
        "/change-password",
        post(change_password).route_layer(from_fn(allow_authenticated)),
    )
}
