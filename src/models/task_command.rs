//! Control commands clients can send to a running task.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Command published on a task's control channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskCommand {
    Pause,
    Resume,
    Stop,
}

impl TaskCommand {
    /// Wire representation published to workers
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCommand::Pause => "PAUSE",
            TaskCommand::Resume => "RESUME",
            TaskCommand::Stop => "STOP",
        }
    }
}

impl fmt::Display for TaskCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_representation_matches_serde() {
        for command in [TaskCommand::Pause, TaskCommand::Resume, TaskCommand::Stop] {
            let json = serde_json::to_string(&command).unwrap();
            assert_eq!(json, format!("\"{}\"", command.as_str()));
        }
    }
}
