//! # Web Middleware
//!
//! Request-scoped concerns applied around the handlers.

pub mod auth;
pub mod request_id;

pub use auth::authenticate_caller;
pub use request_id::add_request_id;
