//! Authenticated caller identity handed to core operations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TaskerError, TaskerResult};

/// Caller whose identity an upstream authentication step has established
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthenticatedCaller {
    user_id: String,
}

impl AuthenticatedCaller {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The identifier as a UUID, for repository lookups
    pub fn user_uuid(&self) -> TaskerResult<Uuid> {
        Uuid::parse_str(&self.user_id)
            .map_err(|e| TaskerError::ValidationError(format!("invalid user id {}: {e}", self.user_id)))
    }
}
