//! # Models
//!
//! Task records, update builders, caller identity and the client-facing
//! task views.

pub mod caller;
pub mod scheduled_task;
pub mod task;
pub mod task_command;

pub use caller::AuthenticatedCaller;
pub use scheduled_task::{RunningTask, ScheduledTask};
pub use task::{Task, TaskUpdate, UserTask};
pub use task_command::TaskCommand;
