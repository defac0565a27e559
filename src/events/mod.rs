//! # Events Module
//!
//! Task status updates: wire/client translation and the per-client live
//! update stream.

pub mod status;
pub mod update_stream;

pub use status::{
    process_update, translate, ClientStatusUpdate, TaskStatus, WireStatusUpdate,
    UNKNOWN_STATUS_LABEL,
};
pub use update_stream::{LiveUpdates, StreamState, UpdateStream};
