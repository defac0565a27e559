//! # Task Query Service
//!
//! Read-side views of a caller's tasks: what the scheduler has queued for
//! them and what workers are executing right now.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, warn};

use super::scheduler_client::SchedulerClient;
use crate::constants::{last_update_key, PROCESSING_SET_KEY};
use crate::database::TaskRepository;
use crate::error::{TaskerError, TaskerResult};
use crate::messaging::KeyValueChannel;
use crate::models::{AuthenticatedCaller, RunningTask, ScheduledTask};
use crate::utils::control_token;

#[derive(Clone)]
pub struct TaskQueryService {
    channel: Arc<dyn KeyValueChannel>,
    repository: Arc<dyn TaskRepository>,
    scheduler: Arc<dyn SchedulerClient>,
}

impl std::fmt::Debug for TaskQueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueryService").finish()
    }
}

impl TaskQueryService {
    pub fn new(
        channel: Arc<dyn KeyValueChannel>,
        repository: Arc<dyn TaskRepository>,
        scheduler: Arc<dyn SchedulerClient>,
    ) -> Self {
        Self {
            channel,
            repository,
            scheduler,
        }
    }

    /// Tasks the scheduler has queued for the caller
    ///
    /// Scheduler failures are logged and reported as an opaque
    /// `internal_error`.
    pub async fn scheduled_tasks(
        &self,
        caller: &AuthenticatedCaller,
    ) -> TaskerResult<Vec<ScheduledTask>> {
        let tasks = self
            .scheduler
            .scheduled_tasks(caller.user_id())
            .await
            .map_err(|e| {
                error!(user_id = %caller.user_id(), error = %e, "Error getting scheduled tasks");
                TaskerError::Internal("internal_error".to_string())
            })?;

        Ok(tasks
            .into_iter()
            .filter_map(|task| {
                let Some(start_time) = DateTime::<Utc>::from_timestamp(task.start_time, 0) else {
                    warn!(task_id = %task.id, start_time = task.start_time, "Skipping task with invalid start time");
                    return None;
                };
                Some(ScheduledTask {
                    id: task.id,
                    subscription_token: task.subscription_token,
                    control_token: task.control_token,
                    start_time,
                })
            })
            .collect())
    }

    /// The caller's tasks that are in the processing set
    ///
    /// Subscription tokens equal the task id and control tokens are derived
    /// from it. The status is the last label published for the task, empty
    /// when nothing has been published yet.
    pub async fn running_tasks(
        &self,
        caller: &AuthenticatedCaller,
    ) -> TaskerResult<Vec<RunningTask>> {
        let user_tasks = self
            .repository
            .tasks_for_user(caller.user_uuid()?)
            .await?;
        let owned: HashMap<String, Option<DateTime<Utc>>> = user_tasks
            .into_iter()
            .map(|task| (task.id.to_string(), task.start_time))
            .collect();

        let processing = self.channel.members(PROCESSING_SET_KEY).await?;

        let mut running = Vec::new();
        for task_id in processing {
            let Some(start_time) = owned.get(&task_id) else {
                continue;
            };

            let status = match self.channel.get(&last_update_key(&task_id)).await {
                Ok(status) => status.unwrap_or_default(),
                Err(e) => {
                    warn!(task_id = %task_id, error = %e, "Could not read last status");
                    String::new()
                }
            };

            running.push(RunningTask {
                control_token: control_token(&task_id),
                subscription_token: task_id.clone(),
                id: task_id,
                start_time: *start_time,
                status,
            });
        }

        Ok(running)
    }
}
