//! # Command Service
//!
//! Publishes control commands on a task's control channel. Workers executing
//! the task subscribe to the channel named by its control token.

use std::sync::Arc;
use tracing::info;

use crate::error::{TaskerError, TaskerResult};
use crate::messaging::KeyValueChannel;
use crate::models::{AuthenticatedCaller, TaskCommand};

#[derive(Clone)]
pub struct CommandService {
    channel: Arc<dyn KeyValueChannel>,
}

impl std::fmt::Debug for CommandService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandService").finish()
    }
}

impl CommandService {
    pub fn new(channel: Arc<dyn KeyValueChannel>) -> Self {
        Self { channel }
    }

    /// Publish `command` to the task identified by `control_token`
    pub async fn send_command(
        &self,
        caller: &AuthenticatedCaller,
        control_token: &str,
        command: TaskCommand,
    ) -> TaskerResult<bool> {
        if control_token.is_empty() {
            return Err(TaskerError::ValidationError(
                "control token must not be empty".to_string(),
            ));
        }

        let receivers = self.channel.publish(control_token, command.as_str()).await?;

        info!(
            user_id = %caller.user_id(),
            command = %command,
            receivers = receivers,
            "Command published"
        );
        Ok(true)
    }
}
