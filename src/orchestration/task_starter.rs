//! # Task Starter
//!
//! Batch start orchestration: given the identifiers of previously scheduled
//! tasks, enqueue every task nobody is executing yet onto its destination's
//! work queue and record when the batch was started.
//!
//! ## Flow
//!
//! ```text
//! task ids ──▶ DedupGate ──▶ TaskRepository ──▶ CommandPipeline ──▶ EXEC
//!               (skip if        (skip if            (RPUSH per           │
//!              processing)     unavailable)       surviving task)        ▼
//!                                                               StartTimeWriter
//!                                                                (after grace)
//! ```
//!
//! Every task started by one call receives the same start time. Queue pushes
//! for the whole batch go out as a single atomic pipeline, preserving input
//! order on each destination queue. Only a failed pipeline fails the call;
//! processing tasks and tasks that cannot be loaded are skipped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::dedup_gate::DedupGate;
use super::start_time_writer::StartTimeWriter;
use crate::constants::queue_key;
use crate::database::TaskRepository;
use crate::error::{TaskerError, TaskerResult};
use crate::messaging::{CommandPipeline, KeyValueChannel};
use crate::models::{AuthenticatedCaller, Task};

/// What a start call did with each requested task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartTasksOutcome {
    /// Start time recorded for every enqueued task
    pub start_time: Option<DateTime<Utc>>,
    /// Pushed onto their destination queues, in input order
    pub enqueued: Vec<String>,
    /// Skipped because a worker is already executing them
    pub already_processing: Vec<String>,
    /// Skipped because they could not be loaded
    pub unavailable: Vec<String>,
}

/// Batch start orchestrator
#[derive(Clone)]
pub struct TaskStarter {
    channel: Arc<dyn KeyValueChannel>,
    repository: Arc<dyn TaskRepository>,
    dedup_gate: DedupGate,
    start_time_writer: StartTimeWriter,
}

impl std::fmt::Debug for TaskStarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStarter")
            .field("dedup_gate", &self.dedup_gate)
            .field("start_time_writer", &self.start_time_writer)
            .finish()
    }
}

impl TaskStarter {
    pub fn new(
        channel: Arc<dyn KeyValueChannel>,
        repository: Arc<dyn TaskRepository>,
        start_time_writer: StartTimeWriter,
    ) -> Self {
        Self {
            dedup_gate: DedupGate::new(Arc::clone(&channel)),
            channel,
            repository,
            start_time_writer,
        }
    }

    /// Enqueue every requested task that is not already processing
    ///
    /// Returns once the queue pipeline has been acknowledged. Start times are
    /// persisted later by the [`StartTimeWriter`].
    pub async fn start_tasks(
        &self,
        caller: &AuthenticatedCaller,
        task_ids: &[String],
    ) -> TaskerResult<StartTasksOutcome> {
        let start_time = Utc::now();
        let mut outcome = StartTasksOutcome {
            start_time: Some(start_time),
            ..StartTasksOutcome::default()
        };
        let mut pipeline = CommandPipeline::new();
        let mut updates = Vec::new();

        for task_id in task_ids {
            if self.dedup_gate.is_processing(task_id).await {
                debug!(task_id = %task_id, "Task already processing, skipping");
                outcome.already_processing.push(task_id.clone());
                continue;
            }

            let task = match self.load_task(task_id).await {
                Ok(task) => task,
                Err(e) => {
                    error!(task_id = %task_id, error = %e, "Error retrieving task");
                    outcome.unavailable.push(task_id.clone());
                    continue;
                }
            };

            updates.push(task.update().set_start_time(start_time));
            pipeline.rpush(queue_key(&task.destination), task.id.to_string());
            outcome.enqueued.push(task.id.to_string());
        }

        if pipeline.is_empty() {
            info!(
                user_id = %caller.user_id(),
                requested = task_ids.len(),
                "No tasks to enqueue"
            );
            return Ok(outcome);
        }

        self.channel.execute(pipeline).await.map_err(|e| {
            error!(user_id = %caller.user_id(), error = %e, "Queue pipeline failed");
            TaskerError::from(e)
        })?;

        if let Err(e) = self.start_time_writer.schedule(updates) {
            error!(error = %e, "Start times will not be persisted for this batch");
        }

        info!(
            user_id = %caller.user_id(),
            requested = task_ids.len(),
            enqueued = outcome.enqueued.len(),
            already_processing = outcome.already_processing.len(),
            unavailable = outcome.unavailable.len(),
            "Tasks started"
        );

        Ok(outcome)
    }

    async fn load_task(&self, task_id: &str) -> TaskerResult<Task> {
        let id = Uuid::parse_str(task_id)
            .map_err(|e| TaskerError::ValidationError(format!("invalid task id: {e}")))?;
        self.repository.find_with_destination(id).await
    }
}
