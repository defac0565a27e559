#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, Redis in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Tasker Dispatch
//!
//! Task start orchestration and live status distribution for the Tasker
//! task-automation platform.
//!
//! ## Overview
//!
//! Two responsibilities sit behind one HTTP surface:
//!
//! - **Starting tasks**: a caller names previously scheduled tasks; every
//!   task that is not already being executed is pushed onto its
//!   destination's work queue in one atomic pipeline, and the batch's start
//!   time is persisted shortly afterwards.
//! - **Streaming updates**: workers publish status changes on per-task
//!   channels; a client subscribes to any number of them and receives a
//!   single stream of translated updates until it disconnects.
//!
//! ## Module Organization
//!
//! - [`orchestration`] - Dedup gate, batch start orchestrator, deferred start-time writer
//! - [`events`] - Status translation and the live update stream
//! - [`messaging`] - Key-value channel abstraction with Redis and in-memory backends
//! - [`database`] - Task repository over PostgreSQL
//! - [`services`] - Scheduler client, task listings and control commands
//! - [`web`] - axum router, caller authentication and handlers
//! - [`config`] - Layered configuration
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tasker_dispatch::database::TaskRepository;
//! use tasker_dispatch::messaging::KeyValueChannel;
//! use tasker_dispatch::models::AuthenticatedCaller;
//! use tasker_dispatch::orchestration::{StartTimeWriter, TaskStarter};
//!
//! # async fn example(
//! #     channel: Arc<dyn KeyValueChannel>,
//! #     repository: Arc<dyn TaskRepository>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let (writer, _handle) = StartTimeWriter::spawn(Arc::clone(&repository), Duration::from_secs(5));
//! let starter = TaskStarter::new(channel, repository, writer);
//!
//! let caller = AuthenticatedCaller::new("user-1");
//! let outcome = starter.start_tasks(&caller, &["9f1c...".to_string()]).await?;
//! println!("enqueued {} tasks", outcome.enqueued.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod events;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod orchestration;
pub mod services;
pub mod utils;
pub mod web;

pub use config::{ConfigManager, DispatchConfig};
pub use error::{TaskerError, TaskerResult};
pub use events::{ClientStatusUpdate, LiveUpdates, UpdateStream, WireStatusUpdate};
pub use messaging::{InMemoryChannel, KeyValueChannel, RedisChannel};
pub use orchestration::{DedupGate, StartTasksOutcome, StartTimeWriter, TaskStarter};
