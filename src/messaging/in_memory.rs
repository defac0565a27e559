//! In-process key-value channel
//!
//! Keeps sets, lists, scalars and subscribers in memory with the same
//! observable semantics as the Redis backend. Used by the test suite and for
//! running the server without a Redis instance. Exposes counters and failure
//! switches so callers can assert on round trips and exercise error paths.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::channel::{ChannelSubscription, CommandPipeline, KeyValueChannel, PipelineCommand};
use super::errors::{MessagingError, MessagingResult};

#[derive(Default)]
struct ChannelState {
    sets: HashMap<String, HashSet<String>>,
    lists: HashMap<String, Vec<String>>,
    scalars: HashMap<String, String>,
    subscribers: HashMap<u64, Subscriber>,
}

struct Subscriber {
    channels: HashSet<String>,
    sender: mpsc::UnboundedSender<String>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<ChannelState>,
    next_subscriber_id: AtomicU64,
    pipeline_executions: AtomicUsize,
    membership_checks: AtomicUsize,
    closed_subscriptions: AtomicUsize,
    fail_membership: AtomicBool,
    fail_pipeline: AtomicBool,
    fail_publish: AtomicBool,
}

/// Shared in-memory channel; clones observe the same state
#[derive(Clone, Default)]
pub struct InMemoryChannel {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for InMemoryChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryChannel")
            .field("pipeline_executions", &self.pipeline_executions())
            .field("active_subscriptions", &self.active_subscriptions())
            .finish()
    }
}

impl InMemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `member` to the set at `key`
    pub fn add_member(&self, key: &str, member: &str) {
        self.inner
            .state
            .lock()
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
    }

    /// Set the scalar at `key`
    pub fn set_value(&self, key: &str, value: &str) {
        self.inner
            .state
            .lock()
            .scalars
            .insert(key.to_string(), value.to_string());
    }

    /// Snapshot of the list at `key`
    pub fn list(&self, key: &str) -> Vec<String> {
        self.inner
            .state
            .lock()
            .lists
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of successful pipeline round trips
    pub fn pipeline_executions(&self) -> usize {
        self.inner.pipeline_executions.load(Ordering::SeqCst)
    }

    /// Number of membership queries issued, failed ones included
    pub fn membership_checks(&self) -> usize {
        self.inner.membership_checks.load(Ordering::SeqCst)
    }

    /// Number of subscriptions released through `close`
    pub fn closed_subscriptions(&self) -> usize {
        self.inner.closed_subscriptions.load(Ordering::SeqCst)
    }

    /// Number of subscriptions still registered
    pub fn active_subscriptions(&self) -> usize {
        self.inner.state.lock().subscribers.len()
    }

    /// Make every membership query fail
    pub fn fail_membership_checks(&self, fail: bool) {
        self.inner.fail_membership.store(fail, Ordering::SeqCst);
    }

    /// Make every pipeline execution fail
    pub fn fail_pipelines(&self, fail: bool) {
        self.inner.fail_pipeline.store(fail, Ordering::SeqCst);
    }

    /// Make every publish fail
    pub fn fail_publishes(&self, fail: bool) {
        self.inner.fail_publish.store(fail, Ordering::SeqCst);
    }

    /// Drop every subscriber's sending side, as a server-side disconnect would
    pub fn disconnect_subscribers(&self) {
        let mut state = self.inner.state.lock();
        for subscriber in state.subscribers.values_mut() {
            let (closed, _) = mpsc::unbounded_channel();
            subscriber.sender = closed;
        }
    }
}

#[async_trait]
impl KeyValueChannel for InMemoryChannel {
    async fn is_member(&self, key: &str, member: &str) -> MessagingResult<bool> {
        self.inner.membership_checks.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_membership.load(Ordering::SeqCst) {
            return Err(MessagingError::command("SISMEMBER", "injected failure"));
        }
        Ok(self
            .inner
            .state
            .lock()
            .sets
            .get(key)
            .is_some_and(|set| set.contains(member)))
    }

    async fn members(&self, key: &str) -> MessagingResult<Vec<String>> {
        Ok(self
            .inner
            .state
            .lock()
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn get(&self, key: &str) -> MessagingResult<Option<String>> {
        Ok(self.inner.state.lock().scalars.get(key).cloned())
    }

    async fn publish(&self, channel: &str, payload: &str) -> MessagingResult<u64> {
        if self.inner.fail_publish.load(Ordering::SeqCst) {
            return Err(MessagingError::command("PUBLISH", "injected failure"));
        }
        let state = self.inner.state.lock();
        let mut receivers = 0;
        for subscriber in state.subscribers.values() {
            if subscriber.channels.contains(channel)
                && subscriber.sender.send(payload.to_string()).is_ok()
            {
                receivers += 1;
            }
        }
        Ok(receivers)
    }

    async fn execute(&self, pipeline: CommandPipeline) -> MessagingResult<()> {
        if self.inner.fail_pipeline.load(Ordering::SeqCst) {
            return Err(MessagingError::command("EXEC", "injected failure"));
        }
        let mut state = self.inner.state.lock();
        for command in pipeline.commands() {
            match command {
                PipelineCommand::RPush { key, value } => {
                    state.lists.entry(key.clone()).or_default().push(value.clone());
                }
            }
        }
        self.inner.pipeline_executions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn subscribe(&self, channels: &[String]) -> MessagingResult<Box<dyn ChannelSubscription>> {
        let id = self.inner.next_subscriber_id.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = mpsc::unbounded_channel();
        self.inner.state.lock().subscribers.insert(
            id,
            Subscriber {
                channels: channels.iter().cloned().collect(),
                sender,
            },
        );
        Ok(Box::new(InMemorySubscription {
            id,
            receiver,
            inner: Arc::clone(&self.inner),
        }))
    }
}

struct InMemorySubscription {
    id: u64,
    receiver: mpsc::UnboundedReceiver<String>,
    inner: Arc<Inner>,
}

#[async_trait]
impl ChannelSubscription for InMemorySubscription {
    async fn next_message(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    async fn close(self: Box<Self>) -> MessagingResult<()> {
        self.inner.state.lock().subscribers.remove(&self.id);
        self.inner.closed_subscriptions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_only_matching_subscribers() {
        let channel = InMemoryChannel::new();
        let mut first = channel.subscribe(&["a".to_string()]).await.unwrap();
        let mut second = channel.subscribe(&["b".to_string()]).await.unwrap();

        assert_eq!(channel.publish("a", "hello").await.unwrap(), 1);
        assert_eq!(first.next_message().await.as_deref(), Some("hello"));

        channel.disconnect_subscribers();
        assert_eq!(second.next_message().await, None);

        first.close().await.unwrap();
        second.close().await.unwrap();
        assert_eq!(channel.closed_subscriptions(), 2);
        assert_eq!(channel.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_pipeline_appends_and_counts() {
        let channel = InMemoryChannel::new();
        let mut pipeline = CommandPipeline::new();
        pipeline.rpush("queue:x", "1").rpush("queue:x", "2");
        channel.execute(pipeline).await.unwrap();

        assert_eq!(channel.list("queue:x"), vec!["1", "2"]);
        assert_eq!(channel.pipeline_executions(), 1);
    }

    #[tokio::test]
    async fn test_injected_membership_failure() {
        let channel = InMemoryChannel::new();
        channel.fail_membership_checks(true);
        assert!(channel.is_member("set", "x").await.is_err());
        assert_eq!(channel.membership_checks(), 1);
    }
}
