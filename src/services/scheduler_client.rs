//! # Scheduler Client
//!
//! Access to the remote scheduler service, which owns the assignment of
//! tasks to start times. The dispatch service only asks it which tasks are
//! scheduled for a user.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SchedulerConfig;
use crate::error::{TaskerError, TaskerResult};

/// A scheduled task as reported by the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerTask {
    pub id: String,
    pub subscription_token: String,
    pub control_token: String,
    /// Unix timestamp in seconds
    pub start_time: i64,
}

#[derive(Debug, Deserialize)]
struct ScheduledTasksResponse {
    #[serde(default)]
    tasks: Vec<SchedulerTask>,
}

/// Request/response access to the scheduler
#[async_trait]
pub trait SchedulerClient: Send + Sync + 'static {
    /// Tasks currently scheduled for `user_id`
    async fn scheduled_tasks(&self, user_id: &str) -> TaskerResult<Vec<SchedulerTask>>;
}

/// Scheduler client speaking JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpSchedulerClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSchedulerClient {
    pub fn from_config(config: &SchedulerConfig) -> TaskerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| TaskerError::ConfigurationError(format!("scheduler client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn scheduled_tasks_url(&self, user_id: &str) -> String {
        format!("{}/users/{}/scheduled-tasks", self.base_url, user_id)
    }
}

#[async_trait]
impl SchedulerClient for HttpSchedulerClient {
    async fn scheduled_tasks(&self, user_id: &str) -> TaskerResult<Vec<SchedulerTask>> {
        let url = self.scheduled_tasks_url(user_id);
        debug!(url = %url, "Requesting scheduled tasks");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| TaskerError::SchedulerError(e.to_string()))?;

        let body: ScheduledTasksResponse = response
            .json()
            .await
            .map_err(|e| TaskerError::SchedulerError(format!("invalid response: {e}")))?;

        Ok(body.tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduled_tasks_url_trims_trailing_slash() {
        let client = HttpSchedulerClient::from_config(&SchedulerConfig {
            base_url: "http://scheduler:3000/".to_string(),
            timeout_ms: 1000,
        })
        .unwrap();
        assert_eq!(
            client.scheduled_tasks_url("u1"),
            "http://scheduler:3000/users/u1/scheduled-tasks"
        );
    }

    #[test]
    fn test_response_without_tasks_is_empty() {
        let body: ScheduledTasksResponse = serde_json::from_str("{}").unwrap();
        assert!(body.tasks.is_empty());
    }
}
