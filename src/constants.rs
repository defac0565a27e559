//! # System Constants
//!
//! Key names, channel naming conventions and timing constants shared with the
//! publishing side of the platform. The key and channel names are a wire
//! contract with the workers and the status hook and must not change.

use std::time::Duration;

/// Set holding the identifiers of tasks some worker is currently executing
pub const PROCESSING_SET_KEY: &str = "tasks:processing";

/// Prefix of the per-subscription-token update channels
pub const UPDATE_CHANNEL_PREFIX: &str = "tasks:updates:";

/// Prefix of the scalar holding the last published status of a task
pub const LAST_UPDATE_KEY_PREFIX: &str = "tasks:updates:last-update:";

/// Prefix of the per-destination work queues
pub const QUEUE_KEY_PREFIX: &str = "queue:";

/// Information-map keys that never reach clients
pub const RESERVED_INFORMATION_KEYS: [&str; 2] = ["taskID", "stoppedFromCMD"];

/// Information-map key carrying the task identifier of a status update
pub const TASK_ID_INFORMATION_KEY: &str = "taskID";

/// Delay before persisting start times, leaving room for the status hook's
/// own "processing" write
pub const DEFAULT_START_TIME_GRACE: Duration = Duration::from_secs(5);

/// Default capacity of a client's update stream
pub const DEFAULT_STREAM_BUFFER: usize = 64;

/// Channel name for a subscription token
pub fn update_channel(subscription_token: &str) -> String {
    format!("{UPDATE_CHANNEL_PREFIX}{subscription_token}")
}

/// Last-known-status key for a task
pub fn last_update_key(task_id: &str) -> String {
    format!("{LAST_UPDATE_KEY_PREFIX}{task_id}")
}

/// Work queue for a destination site
pub fn queue_key(destination: &str) -> String {
    format!("{QUEUE_KEY_PREFIX}{destination}")
}
