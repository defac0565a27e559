//! Error types for the dispatch service.

use thiserror::Error;

use crate::messaging::MessagingError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Messaging error: {0}")]
    MessagingError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Scheduler error: {0}")]
    SchedulerError(String),
    /// Caller identity could not be established; the message is client-facing
    #[error("{0}")]
    AuthenticationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for TaskerError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => TaskerError::NotFound("row not found".to_string()),
            other => TaskerError::DatabaseError(other.to_string()),
        }
    }
}

impl From<MessagingError> for TaskerError {
    fn from(error: MessagingError) -> Self {
        TaskerError::MessagingError(error.to_string())
    }
}

pub type TaskerResult<T> = std::result::Result<T, TaskerError>;
