//! # Task Model
//!
//! Task records as seen by the dispatch service, plus the update builder used
//! to stage start-time writes.
//!
//! ## Overview
//!
//! Tasks are created by the external scheduling process. This service only
//! reads them (to find the destination queue) and sets their start time once
//! they have been enqueued. It never creates or deletes tasks.
//!
//! ## Database Schema
//!
//! Maps to the `tasks` table; the destination is the `site` of the task's
//! first associated product:
//! - `id`: Primary key (UUID)
//! - `start_time`: Nullable timestamp set when the task is started
//! - `products.site`: Destination site, joined through `task_products`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::TaskRepository;
use crate::error::TaskerResult;

/// A task and the destination its work queue is named after
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    /// Site of the task's product; names the work queue
    pub destination: String,
    pub start_time: Option<DateTime<Utc>>,
}

impl Task {
    /// Begin staging field mutations for this task
    pub fn update(&self) -> TaskUpdate {
        TaskUpdate::new(self.id)
    }
}

/// A task owned by a user, without its destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTask {
    pub id: Uuid,
    pub start_time: Option<DateTime<Utc>>,
}

/// Staged field mutations for one task, committed by [`TaskUpdate::save`]
///
/// Building the update has no side effects; nothing reaches the repository
/// until `save` is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    task_id: Uuid,
    start_time: Option<DateTime<Utc>>,
}

impl TaskUpdate {
    pub fn new(task_id: Uuid) -> Self {
        Self {
            task_id,
            start_time: None,
        }
    }

    /// Stage a new start time
    pub fn set_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    /// Staged start time, if one was set
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    /// Whether any field has been staged
    pub fn is_empty(&self) -> bool {
        self.start_time.is_none()
    }

    /// Commit the staged mutations
    pub async fn save(&self, repository: &dyn TaskRepository) -> TaskerResult<()> {
        if self.is_empty() {
            return Ok(());
        }
        repository.apply_update(self).await
    }
}
