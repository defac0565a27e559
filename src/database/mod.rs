//! # Database Module
//!
//! Connection pooling and the task repository backed by PostgreSQL.

pub mod connection;
pub mod task_repository;

pub use connection::DatabaseConnection;
pub use task_repository::{PgTaskRepository, TaskRepository};
