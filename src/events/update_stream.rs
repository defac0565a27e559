//! # Update Stream
//!
//! Fans status updates from any number of per-task channels into a single
//! stream for one client.
//!
//! ## Overview
//!
//! Opening a stream subscribes to `tasks:updates:<token>` for every requested
//! subscription token through one multi-channel subscription. A dispatch
//! loop receives raw payloads one at a time and hands each to its own task,
//! which translates it and forwards it to the client. A slow client therefore
//! never stalls receipt of later payloads, at the cost of no ordering
//! guarantee between updates that arrive close together.
//!
//! ## Lifecycle
//!
//! ```text
//! Open ──(cancelled | channel closed | client gone)──▶ Closing ──▶ Closed
//! ```
//!
//! The dispatch loop is the only owner of teardown. It releases the
//! subscription exactly once on every exit path and drops its sender. The
//! output ends once the last in-flight forwarder is done; forwarders give up
//! on cancellation, so a cancelled stream ends promptly.

use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::status::{process_update, ClientStatusUpdate};
use crate::constants::{update_channel, DEFAULT_STREAM_BUFFER};
use crate::error::{TaskerError, TaskerResult};
use crate::messaging::{ChannelSubscription, KeyValueChannel};

/// Upper bound on waiting for the store to acknowledge an unsubscribe
const SUBSCRIPTION_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifecycle of a client's update stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Open,
    Closing,
    Closed,
}

/// Opens update streams against a key-value channel
#[derive(Clone)]
pub struct UpdateStream {
    channel: Arc<dyn KeyValueChannel>,
    buffer: usize,
}

impl std::fmt::Debug for UpdateStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateStream")
            .field("buffer", &self.buffer)
            .finish()
    }
}

impl UpdateStream {
    pub fn new(channel: Arc<dyn KeyValueChannel>) -> Self {
        Self {
            channel,
            buffer: DEFAULT_STREAM_BUFFER,
        }
    }

    /// Set the capacity of each client's output buffer
    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer.max(1);
        self
    }

    /// Subscribe to every token's channel and start dispatching
    ///
    /// The stream lives until `cancel` fires, the store closes the
    /// subscription, or the returned [`LiveUpdates`] is dropped.
    pub async fn open(
        &self,
        subscription_tokens: &[String],
        cancel: CancellationToken,
    ) -> TaskerResult<LiveUpdates> {
        if subscription_tokens.is_empty() {
            return Err(TaskerError::ValidationError(
                "at least one subscription token is required".to_string(),
            ));
        }

        let channels: Vec<String> = subscription_tokens
            .iter()
            .map(|token| update_channel(token))
            .collect();

        let subscription = self.channel.subscribe(&channels).await?;
        info!(channels = channels.len(), "Update stream opened");

        let (sender, receiver) = mpsc::channel(self.buffer);
        let (state_sender, state_receiver) = watch::channel(StreamState::Open);

        tokio::spawn(dispatch_updates(subscription, sender, cancel, state_sender));

        Ok(LiveUpdates {
            updates: ReceiverStream::new(receiver),
            state: state_receiver,
        })
    }
}

/// Client-facing stream of translated updates
#[derive(Debug)]
pub struct LiveUpdates {
    updates: ReceiverStream<ClientStatusUpdate>,
    state: watch::Receiver<StreamState>,
}

impl LiveUpdates {
    pub fn state(&self) -> StreamState {
        *self.state.borrow()
    }

    /// Wait until teardown has finished
    pub async fn closed(&mut self) {
        // An error means the dispatch loop is gone, which only happens after Closed
        let _ = self
            .state
            .wait_for(|state| *state == StreamState::Closed)
            .await;
    }
}

impl Stream for LiveUpdates {
    type Item = ClientStatusUpdate;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.updates).poll_next(cx)
    }
}

async fn dispatch_updates(
    mut subscription: Box<dyn ChannelSubscription>,
    sender: mpsc::Sender<ClientStatusUpdate>,
    cancel: CancellationToken,
    state: watch::Sender<StreamState>,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Update stream cancelled");
                break;
            }
            _ = sender.closed() => {
                debug!("Update stream receiver dropped");
                break;
            }
            message = subscription.next_message() => match message {
                Some(payload) => {
                    tokio::spawn(forward_update(payload, sender.clone(), cancel.clone()));
                }
                None => {
                    debug!("Update subscription closed by channel");
                    break;
                }
            }
        }
    }

    state.send_replace(StreamState::Closing);

    match tokio::time::timeout(SUBSCRIPTION_CLOSE_TIMEOUT, subscription.close()).await {
        Ok(Ok(())) => debug!("Update subscription released"),
        Ok(Err(e)) => error!(error = %e, "Error closing subscription"),
        Err(_) => error!("Timed out closing subscription"),
    }

    drop(sender);
    state.send_replace(StreamState::Closed);
}

async fn forward_update(
    payload: String,
    sender: mpsc::Sender<ClientStatusUpdate>,
    cancel: CancellationToken,
) {
    let Some(update) = process_update(&payload) else {
        return;
    };

    tokio::select! {
        _ = cancel.cancelled() => {}
        result = sender.send(update) => {
            if result.is_err() {
                debug!("Dropping update for closed stream");
            }
        }
    }
}
