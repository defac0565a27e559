//! Client-facing views of a caller's tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task the scheduler has queued for a future start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTask {
    pub id: String,
    pub subscription_token: String,
    pub control_token: String,
    pub start_time: DateTime<Utc>,
}

/// A task some worker is currently executing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningTask {
    pub id: String,
    pub subscription_token: String,
    pub control_token: String,
    pub start_time: Option<DateTime<Utc>>,
    /// Last status label published for the task, empty if none yet
    pub status: String,
}
