//! # Task Repository
//!
//! Point lookups and staged updates for task records. The orchestration core
//! depends on the [`TaskRepository`] trait; [`PgTaskRepository`] is the
//! PostgreSQL implementation.
//!
//! ## Schema
//!
//! ```sql
//! tasks         (id UUID PRIMARY KEY, task_group_id UUID, start_time TIMESTAMPTZ NULL)
//! products      (id UUID PRIMARY KEY, site VARCHAR NOT NULL)
//! task_products (task_id UUID, product_id UUID)
//! task_groups   (id UUID PRIMARY KEY, app_id UUID)
//! apps          (id UUID PRIMARY KEY, user_id UUID)
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{TaskerError, TaskerResult};
use crate::models::{Task, TaskUpdate, UserTask};

/// Task record access consumed by the dispatch core
#[async_trait]
pub trait TaskRepository: Send + Sync + 'static {
    /// Load a task with its destination eagerly resolved
    async fn find_with_destination(&self, task_id: Uuid) -> TaskerResult<Task>;

    /// Commit the mutations staged on `update`
    async fn apply_update(&self, update: &TaskUpdate) -> TaskerResult<()>;

    /// Every task belonging to the user's app
    async fn tasks_for_user(&self, user_id: Uuid) -> TaskerResult<Vec<UserTask>>;
}

#[derive(Debug, FromRow)]
struct TaskWithDestinationRow {
    id: Uuid,
    start_time: Option<DateTime<Utc>>,
    destination: String,
}

#[derive(Debug, FromRow)]
struct UserTaskRow {
    id: Uuid,
    start_time: Option<DateTime<Utc>>,
}

/// PostgreSQL task repository
#[derive(Debug, Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn find_with_destination(&self, task_id: Uuid) -> TaskerResult<Task> {
        let row = sqlx::query_as::<_, TaskWithDestinationRow>(
            r#"
            SELECT t.id, t.start_time, p.site AS destination
            FROM tasks t
            JOIN task_products tp ON tp.task_id = t.id
            JOIN products p ON p.id = tp.product_id
            WHERE t.id = $1
            ORDER BY p.id
            LIMIT 1
            "#,
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| TaskerError::NotFound(format!("task {task_id} with a product")))?;

        Ok(Task {
            id: row.id,
            destination: row.destination,
            start_time: row.start_time,
        })
    }

    async fn apply_update(&self, update: &TaskUpdate) -> TaskerResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET start_time = COALESCE($2, start_time)
            WHERE id = $1
            "#,
        )
        .bind(update.task_id())
        .bind(update.start_time())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TaskerError::NotFound(format!("task {}", update.task_id())));
        }

        debug!(task_id = %update.task_id(), "Task update saved");
        Ok(())
    }

    async fn tasks_for_user(&self, user_id: Uuid) -> TaskerResult<Vec<UserTask>> {
        let app_id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM apps WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        let app_id =
            app_id.ok_or_else(|| TaskerError::NotFound(format!("app for user {user_id}")))?;

        let rows = sqlx::query_as::<_, UserTaskRow>(
            r#"
            SELECT t.id, t.start_time
            FROM tasks t
            JOIN task_groups g ON g.id = t.task_group_id
            WHERE g.app_id = $1
            "#,
        )
        .bind(app_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| UserTask {
                id: row.id,
                start_time: row.start_time,
            })
            .collect())
    }
}
