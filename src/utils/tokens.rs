//! Derived task tokens.

use sha1::{Digest, Sha1};

/// Control token for a task that was not issued one explicitly
///
/// Lowercase hex SHA-1 of the task identifier. Deterministic and unkeyed, so
/// it only correlates commands with a task; it is not a credential.
pub fn control_token(task_id: &str) -> String {
    hex::encode(Sha1::digest(task_id.as_bytes()))
}
