//! # Start Time Writer
//!
//! Process-wide background worker that persists task start times after a
//! grace interval.
//!
//! ## Overview
//!
//! Workers report a "processing" status through a repository hook shortly
//! after dequeuing a task. Writing the start time immediately would race that
//! hook, so start times are held back for a fixed grace interval before being
//! saved. The delay narrows the race window; it does not close it. A single
//! authoritative write path or a conditional update would.
//!
//! The writer is owned by the application, not by the request that staged
//! the updates: a batch keeps its place in the queue after the request has
//! returned, and failures can only be logged.
//!
//! Every batch is due `grace` after it was scheduled, so batches become due in
//! the order they arrive and one FIFO worker serves them all.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info};

use crate::database::TaskRepository;
use crate::error::{TaskerError, TaskerResult};
use crate::models::TaskUpdate;

#[derive(Debug)]
struct StartTimeBatch {
    due_at: Instant,
    updates: Vec<TaskUpdate>,
}

/// Handle for scheduling deferred start-time writes
#[derive(Debug, Clone)]
pub struct StartTimeWriter {
    sender: mpsc::UnboundedSender<StartTimeBatch>,
    grace: Duration,
}

impl StartTimeWriter {
    /// Start the background worker
    ///
    /// The worker drains every pending batch and exits once all handles have
    /// been dropped; await the returned `JoinHandle` for a graceful shutdown.
    pub fn spawn(repository: Arc<dyn TaskRepository>, grace: Duration) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_writer(repository, receiver));
        info!(grace_ms = grace.as_millis() as u64, "Start time writer started");
        (Self { sender, grace }, handle)
    }

    /// Queue `updates` to be saved once the grace interval has elapsed
    pub fn schedule(&self, updates: Vec<TaskUpdate>) -> TaskerResult<()> {
        if updates.is_empty() {
            return Ok(());
        }
        let count = updates.len();
        self.sender
            .send(StartTimeBatch {
                due_at: Instant::now() + self.grace,
                updates,
            })
            .map_err(|_| TaskerError::Internal("start time writer has stopped".to_string()))?;
        debug!(updates = count, "Start time updates scheduled");
        Ok(())
    }
}

async fn run_writer(
    repository: Arc<dyn TaskRepository>,
    mut receiver: mpsc::UnboundedReceiver<StartTimeBatch>,
) {
    while let Some(batch) = receiver.recv().await {
        sleep_until(batch.due_at).await;

        let mut saved = 0usize;
        for update in &batch.updates {
            match update.save(repository.as_ref()).await {
                Ok(()) => saved += 1,
                Err(e) => {
                    error!(
                        task_id = %update.task_id(),
                        error = %e,
                        "Error updating task start time"
                    );
                }
            }
        }
        debug!(
            saved = saved,
            failed = batch.updates.len() - saved,
            "Start time batch persisted"
        );
    }
    info!("Start time writer stopped");
}
