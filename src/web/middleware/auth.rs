//! # Authentication Middleware
//!
//! Attaches a [`CallerIdentity`] to every request on protected routes.
//! Handlers decide what a missing identity means for them.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::web::auth::CallerIdentity;

/// Resolve the caller identity and store it in the request extensions
pub async fn authenticate_caller(mut request: Request, next: Next) -> Response {
    let identity = CallerIdentity::from_headers(request.headers());

    match &identity.0 {
        Ok(caller) => debug!(user_id = %caller.user_id(), "Authenticated caller"),
        Err(e) => debug!(reason = %e, "Request without caller identity"),
    }

    request.extensions_mut().insert(identity);
    next.run(request).await
}
