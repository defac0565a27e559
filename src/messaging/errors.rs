//! # Messaging Error Types
//!
//! Errors raised by key-value channel backends, kept separate from
//! [`crate::error::TaskerError`] so callers can decide per operation whether a
//! store failure is fatal, skippable or treated as a safe default.

use thiserror::Error;

/// Key-value channel error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MessagingError {
    #[error("Channel connection error: {message}")]
    Connection { message: String },

    #[error("Command failed: {command}: {message}")]
    Command { command: String, message: String },

    #[error("Subscription error: {message}")]
    Subscription { message: String },
}

impl MessagingError {
    /// Create a command error
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a subscription error
    pub fn subscription(message: impl Into<String>) -> Self {
        Self::Subscription {
            message: message.into(),
        }
    }
}

impl From<redis::RedisError> for MessagingError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
            Self::connection(err.to_string())
        } else {
            Self::command(err.code().unwrap_or("REDIS"), err.to_string())
        }
    }
}

pub type MessagingResult<T> = std::result::Result<T, MessagingError>;
