//! HTTP route entry point for `/api/...`.
//!
//! - `/health` → health check (public)
//! - `/auth` → login (public) and password change (authenticated)
//! - `/attendance` → attendance ledger and summaries
//! - `/subjects` → subject registry for teachers
//! - `/teachers`, `/students` → profiles, roster query and roster upload
//!
//! Everything except `/health` and `/auth/login` sits behind `require_caller`,
//! which resolves the caller's role once per request.

use crate::auth::guards::require_caller;
use crate::routes::{
    attendance::attendance_routes, auth::auth_routes, health::health_routes,
    students::students_routes, subjects::subjects_routes, teachers::teachers_routes,
};
use axum::{Router, middleware::from_fn_with_state};
use util::state::AppState;

pub mod attendance;
pub mod auth;
pub mod common;
pub mod extract;
pub mod health;
pub mod students;
pub mod subjects;
pub mod teachers;

/// Builds the `/api` router with its state attached.
pub fn routes(app_state: AppState) -> Router {
    let guarded = || from_fn_with_state(app_state.clone(), require_caller);

    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .nest("/attendance", attendance_routes().route_layer(guarded()))
        .nest("/subjects", subjects_routes().route_layer(guarded()))
        .nest("/teachers", teachers_routes().route_layer(guarded()))
        .nest("/students", students_routes().route_layer(guarded()))
        .with_state(app_state.clone())
}
