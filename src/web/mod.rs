//! # Web API Module
//!
//! HTTP surface of the dispatch service: starting tasks, sending commands,
//! listing tasks and streaming live updates as server-sent events.
//!
//! Caller identity comes from an upstream gateway (see [`auth`]). Protected
//! routes run [`middleware::authenticate_caller`], which attaches a typed
//! [`auth::CallerIdentity`] that handlers hand to the core operations.

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, Span};

pub mod auth;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use auth::{AuthError, CallerIdentity};
pub use errors::{ApiError, ApiResult};
pub use state::AppState;

/// Create the web application with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let common_middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(axum::middleware::from_fn(middleware::add_request_id));

    let public_routes = routes::health_routes();

    let protected_routes = routes::task_routes()
        .layer(axum::middleware::from_fn(middleware::authenticate_caller));

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(common_middleware)
        .with_state(state);

    info!("Web application created with all routes and middleware");
    app
}

/// Request span with an empty `request_id` field for [`middleware::add_request_id`]
fn make_request_span(request: &Request<Body>) -> Span {
    info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
    )
}
