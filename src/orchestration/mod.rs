//! # Orchestration Module
//!
//! Starting batches of scheduled tasks: deduplication against the shared
//! processing set, queue fan-out per destination and deferred start-time
//! persistence.

pub mod dedup_gate;
pub mod start_time_writer;
pub mod task_starter;

pub use dedup_gate::DedupGate;
pub use start_time_writer::StartTimeWriter;
pub use task_starter::{StartTasksOutcome, TaskStarter};
