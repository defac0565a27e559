//! # Request ID Middleware
//!
//! Generates unique request IDs for tracing and debugging.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

/// Response header carrying the request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Span field the request ID is recorded on
pub const REQUEST_ID_FIELD: &str = "request_id";

/// Record a fresh request ID on the request span and the response
///
/// The enclosing span must declare [`REQUEST_ID_FIELD`]; see
/// [`crate::web::create_router`].
pub async fn add_request_id(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    tracing::Span::current().record(REQUEST_ID_FIELD, request_id.as_str());

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
