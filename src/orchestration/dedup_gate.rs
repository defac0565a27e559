//! # Dedup Gate
//!
//! Answers whether a task is already being executed by some worker, using
//! membership in the shared processing set.
//!
//! Store errors are treated as "not processing".

use std::sync::Arc;
use tracing::warn;

use crate::constants::PROCESSING_SET_KEY;
use crate::messaging::KeyValueChannel;

#[derive(Clone)]
pub struct DedupGate {
    channel: Arc<dyn KeyValueChannel>,
}

impl std::fmt::Debug for DedupGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DedupGate")
            .field("set", &PROCESSING_SET_KEY)
            .finish()
    }
}

impl DedupGate {
    pub fn new(channel: Arc<dyn KeyValueChannel>) -> Self {
        Self { channel }
    }

    /// Whether `task_id` is in the processing set; never fails
    pub async fn is_processing(&self, task_id: &str) -> bool {
        match self.channel.is_member(PROCESSING_SET_KEY, task_id).await {
            Ok(processing) => processing,
            Err(e) => {
                warn!(
                    task_id = task_id,
                    error = %e,
                    "Processing check failed, treating task as not processing"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::InMemoryChannel;

    #[tokio::test]
    async fn test_member_is_processing() {
        let channel = InMemoryChannel::new();
        channel.add_member(PROCESSING_SET_KEY, "t1");
        let gate = DedupGate::new(Arc::new(channel));

        assert!(gate.is_processing("t1").await);
        assert!(!gate.is_processing("t2").await);
    }

    #[tokio::test]
    async fn test_store_failure_fails_open() {
        let channel = InMemoryChannel::new();
        channel.add_member(PROCESSING_SET_KEY, "t1");
        channel.fail_membership_checks(true);
        let gate = DedupGate::new(Arc::new(channel.clone()));

        assert!(!gate.is_processing("t1").await);
        assert_eq!(channel.membership_checks(), 1);
    }
}
