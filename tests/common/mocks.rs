//! In-process doubles for the task repository and the scheduler.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use tasker_dispatch::database::TaskRepository;
use tasker_dispatch::error::{TaskerError, TaskerResult};
use tasker_dispatch::models::{Task, TaskUpdate, UserTask};
use tasker_dispatch::services::{SchedulerClient, SchedulerTask};

#[derive(Default)]
struct RepositoryState {
    tasks: HashMap<Uuid, Task>,
    user_tasks: HashMap<Uuid, Vec<UserTask>>,
    failing: HashSet<Uuid>,
    updates: Vec<TaskUpdate>,
    lookups: Vec<Uuid>,
}

/// Task repository backed by a map; clones share state
#[derive(Clone, Default)]
pub struct MockTaskRepository {
    state: Arc<Mutex<RepositoryState>>,
}

impl MockTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_task(&self, destination: &str) -> Task {
        let task = Task {
            id: Uuid::new_v4(),
            destination: destination.to_string(),
            start_time: None,
        };
        self.state.lock().tasks.insert(task.id, task.clone());
        task
    }

    pub fn insert_user_task(&self, user_id: Uuid, task: UserTask) {
        self.state
            .lock()
            .user_tasks
            .entry(user_id)
            .or_default()
            .push(task);
    }

    /// Make lookups of `task_id` fail with a database error
    pub fn fail_lookups_for(&self, task_id: Uuid) {
        self.state.lock().failing.insert(task_id);
    }

    pub fn saved_updates(&self) -> Vec<TaskUpdate> {
        self.state.lock().updates.clone()
    }

    pub fn lookups(&self) -> Vec<Uuid> {
        self.state.lock().lookups.clone()
    }

    pub fn task(&self, task_id: Uuid) -> Option<Task> {
        self.state.lock().tasks.get(&task_id).cloned()
    }
}

#[async_trait]
impl TaskRepository for MockTaskRepository {
    async fn find_with_destination(&self, task_id: Uuid) -> TaskerResult<Task> {
        let mut state = self.state.lock();
        state.lookups.push(task_id);
        if state.failing.contains(&task_id) {
            return Err(TaskerError::DatabaseError("connection refused".to_string()));
        }
        state
            .tasks
            .get(&task_id)
            .cloned()
            .ok_or_else(|| TaskerError::NotFound(format!("task {task_id}")))
    }

    async fn apply_update(&self, update: &TaskUpdate) -> TaskerResult<()> {
        let mut state = self.state.lock();
        if let Some(task) = state.tasks.get_mut(&update.task_id()) {
            if let Some(start_time) = update.start_time() {
                task.start_time = Some(start_time);
            }
        }
        state.updates.push(update.clone());
        Ok(())
    }

    async fn tasks_for_user(&self, user_id: Uuid) -> TaskerResult<Vec<UserTask>> {
        self.state
            .lock()
            .user_tasks
            .get(&user_id)
            .cloned()
            .ok_or_else(|| TaskerError::NotFound(format!("app for user {user_id}")))
    }
}

/// Scheduler returning a fixed task list, or failing
#[derive(Clone, Default)]
pub struct MockScheduler {
    tasks: Arc<Mutex<Vec<SchedulerTask>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<SchedulerTask>) -> Self {
        let scheduler = Self::default();
        *scheduler.tasks.lock() = tasks;
        scheduler
    }

    pub fn fail(&self) {
        *self.fail.lock() = true;
    }
}

#[async_trait]
impl SchedulerClient for MockScheduler {
    async fn scheduled_tasks(&self, _user_id: &str) -> TaskerResult<Vec<SchedulerTask>> {
        if *self.fail.lock() {
            return Err(TaskerError::SchedulerError("scheduler unavailable".to_string()));
        }
        Ok(self.tasks.lock().clone())
    }
}
