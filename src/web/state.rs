//! # Web API Application State
//!
//! Shared handles every request handler works with.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::events::UpdateStream;
use crate::orchestration::TaskStarter;
use crate::services::{CommandService, TaskQueryService};

/// Shared state for the HTTP surface
///
/// Cloned per request by axum; every field is a cheap handle.
#[derive(Clone, Debug)]
pub struct AppState {
    pub task_starter: TaskStarter,
    pub update_stream: UpdateStream,
    pub task_queries: TaskQueryService,
    pub commands: CommandService,
    pub environment: Arc<str>,
    /// Cancelled when the server shuts down; parent of every update stream
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        task_starter: TaskStarter,
        update_stream: UpdateStream,
        task_queries: TaskQueryService,
        commands: CommandService,
        environment: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            task_starter,
            update_stream,
            task_queries,
            commands,
            environment: environment.into(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Use `shutdown` as the parent token of every update stream
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }
}
