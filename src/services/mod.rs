//! # Services
//!
//! Caller-facing operations beyond batch start: scheduled and running task
//! queries, control commands, and the remote scheduler client they rely on.

pub mod command_service;
pub mod scheduler_client;
pub mod task_query_service;

pub use command_service::CommandService;
pub use scheduler_client::{HttpSchedulerClient, SchedulerClient, SchedulerTask};
pub use task_query_service::TaskQueryService;
