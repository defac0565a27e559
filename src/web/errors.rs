//! # Web API Error Types
//!
//! Error types for the HTTP surface and their response conversions.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::error::TaskerError;
use crate::web::auth::AuthError;

/// Web API errors with HTTP status code mappings
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{reason}")]
    Unauthorized { reason: String },

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Resource not found: {message}")]
    NotFound { message: String },

    #[error("Service temporarily unavailable")]
    ServiceUnavailable,

    #[error("{message}")]
    Internal { message: String },
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::BadRequest { .. } => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::ServiceUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            ApiError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        ApiError::Unauthorized {
            reason: error.to_string(),
        }
    }
}

impl From<TaskerError> for ApiError {
    fn from(error: TaskerError) -> Self {
        match error {
            TaskerError::AuthenticationError(reason) => ApiError::Unauthorized { reason },
            TaskerError::ValidationError(message) => ApiError::BadRequest { message },
            TaskerError::NotFound(message) => ApiError::NotFound { message },
            TaskerError::MessagingError(_) | TaskerError::DatabaseError(_) => {
                error!(error = %error, "Dependency failure while handling request");
                ApiError::ServiceUnavailable
            }
            other => {
                error!(error = %other, "Request failed");
                ApiError::Internal {
                    message: "internal_error".to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_code) = self.status_and_code();
        let body = json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        });
        (status_code, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
