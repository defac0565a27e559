//! # Messaging Module
//!
//! Access to the shared key-value store used as both work queue and event
//! bus. Core components depend only on the [`KeyValueChannel`] trait; Redis is
//! the production backend and [`InMemoryChannel`] backs tests and local runs.

pub mod channel;
pub mod errors;
pub mod in_memory;
pub mod redis_channel;

pub use channel::{ChannelSubscription, CommandPipeline, KeyValueChannel, PipelineCommand};
pub use errors::{MessagingError, MessagingResult};
pub use in_memory::InMemoryChannel;
pub use redis_channel::RedisChannel;
