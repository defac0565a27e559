//! # Key-Value Channel
//!
//! The narrow interface the dispatch core consumes from the shared key-value
//! store. The store plays two roles at once: a work queue (ordered lists per
//! destination) and an event bus (publish/subscribe). It is also the only
//! synchronization point between this service, the workers and the status
//! hook, so no component here holds locks of its own.

use async_trait::async_trait;

use super::errors::MessagingResult;

/// A single command staged on a [`CommandPipeline`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineCommand {
    /// Append `value` to the tail of the list at `key`
    RPush { key: String, value: String },
}

/// Batch of commands submitted and acknowledged as one round trip
///
/// Commands are submitted in the order they were staged, so relative order of
/// pushes onto the same queue is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandPipeline {
    commands: Vec<PipelineCommand>,
}

impl CommandPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a push of `value` onto the list at `key`
    pub fn rpush(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.commands.push(PipelineCommand::RPush {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn commands(&self) -> &[PipelineCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Live multi-channel subscription
///
/// Closing consumes the subscription, so it can only be released once.
#[async_trait]
pub trait ChannelSubscription: Send {
    /// Wait for the next payload. `None` means the subscription was closed
    /// by the store and will yield nothing more.
    ///
    /// Must be cancel-safe: it is raced against cancellation in a `select!`.
    async fn next_message(&mut self) -> Option<String>;

    /// Unsubscribe and release the underlying connection
    async fn close(self: Box<Self>) -> MessagingResult<()>;
}

/// Operations the dispatch core needs from the shared key-value store
#[async_trait]
pub trait KeyValueChannel: Send + Sync + 'static {
    /// Whether `member` belongs to the set at `key`
    async fn is_member(&self, key: &str, member: &str) -> MessagingResult<bool>;

    /// All members of the set at `key`
    async fn members(&self, key: &str) -> MessagingResult<Vec<String>>;

    /// Scalar value at `key`, if any
    async fn get(&self, key: &str) -> MessagingResult<Option<String>>;

    /// Publish `payload` on `channel`, returning the number of receivers
    async fn publish(&self, channel: &str, payload: &str) -> MessagingResult<u64>;

    /// Submit every staged command as a single atomic round trip
    async fn execute(&self, pipeline: CommandPipeline) -> MessagingResult<()>;

    /// Open one subscription covering all `channels`
    async fn subscribe(&self, channels: &[String]) -> MessagingResult<Box<dyn ChannelSubscription>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_preserves_staging_order() {
        let mut pipeline = CommandPipeline::new();
        pipeline.rpush("queue:a", "t1").rpush("queue:b", "t2").rpush("queue:a", "t3");

        let values: Vec<&str> = pipeline
            .commands()
            .iter()
            .map(|PipelineCommand::RPush { value, .. }| value.as_str())
            .collect();
        assert_eq!(values, vec!["t1", "t2", "t3"]);
        assert_eq!(pipeline.len(), 3);
    }

    #[test]
    fn test_empty_pipeline() {
        assert!(CommandPipeline::new().is_empty());
    }
}
