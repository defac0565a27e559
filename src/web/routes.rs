//! # Web API Routes
//!
//! Route definitions grouped by whether they need a caller identity.

use axum::routing::{get, post};
use axum::Router;

use crate::web::handlers;
use crate::web::state::AppState;

/// Health check routes, reachable without authentication
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::basic_health))
}

/// Task routes; every handler expects a [`CallerIdentity`] extension
///
/// [`CallerIdentity`]: crate::web::auth::CallerIdentity
pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks/start", post(handlers::tasks::start_tasks))
        .route("/tasks/command", post(handlers::tasks::send_command))
        .route("/tasks/scheduled", get(handlers::tasks::scheduled_tasks))
        .route("/tasks/running", get(handlers::tasks::running_tasks))
        .route("/tasks/updates", get(handlers::updates::stream_updates))
}
