//! # Caller Authentication
//!
//! Turns the identity an upstream gateway attached to a request into a typed
//! result that handlers pass explicitly to core operations.
//!
//! The gateway authenticates the session and forwards either the caller's
//! user id (`x-user-id`) or the reason authentication failed
//! (`x-auth-error`). This service must only be reachable through that
//! gateway, which strips client-supplied copies of both headers.

use axum::http::HeaderMap;
use thiserror::Error;

use crate::error::TaskerError;
use crate::models::AuthenticatedCaller;

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying an authentication failure reported by the gateway
pub const AUTH_ERROR_HEADER: &str = "x-auth-error";

/// Why no caller identity is available
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Neither an identity nor an error was supplied
    #[error("user_not_found")]
    UserNotFound,

    /// The gateway rejected the request; the reason is shown verbatim
    #[error("{0}")]
    Rejected(String),
}

impl From<AuthError> for TaskerError {
    fn from(error: AuthError) -> Self {
        TaskerError::AuthenticationError(error.to_string())
    }
}

/// Outcome of authenticating one request, stored as a request extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(pub Result<AuthenticatedCaller, AuthError>);

impl CallerIdentity {
    /// Read the identity from gateway headers; a reported error wins
    pub fn from_headers(headers: &HeaderMap) -> Self {
        if let Some(reason) = headers.get(AUTH_ERROR_HEADER) {
            let reason = reason
                .to_str()
                .map(str::to_string)
                .unwrap_or_else(|_| "invalid_auth_error".to_string());
            return Self(Err(AuthError::Rejected(reason)));
        }

        let caller = headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|user_id| !user_id.is_empty())
            .map(AuthenticatedCaller::new)
            .ok_or(AuthError::UserNotFound);

        Self(caller)
    }

    pub fn into_caller(self) -> Result<AuthenticatedCaller, AuthError> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_user_id_header_authenticates() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("user-1"));

        let caller = CallerIdentity::from_headers(&headers).into_caller().unwrap();
        assert_eq!(caller.user_id(), "user-1");
    }

    #[test]
    fn test_missing_identity_is_user_not_found() {
        let identity = CallerIdentity::from_headers(&HeaderMap::new());
        assert_eq!(identity.into_caller(), Err(AuthError::UserNotFound));

        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("   "));
        assert_eq!(
            CallerIdentity::from_headers(&headers).into_caller(),
            Err(AuthError::UserNotFound)
        );
    }

    #[test]
    fn test_gateway_error_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("user-1"));
        headers.insert(AUTH_ERROR_HEADER, HeaderValue::from_static("session_expired"));

        let result = CallerIdentity::from_headers(&headers).into_caller();
        assert_eq!(result, Err(AuthError::Rejected("session_expired".to_string())));
        assert_eq!(
            TaskerError::from(AuthError::Rejected("session_expired".to_string())).to_string(),
            "session_expired"
        );
    }
}
