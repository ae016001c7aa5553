//! Platform-specific operation events

use serde::{Deserialize, Serialize};

/// Platform operation events for tracking external processes and filesystem moves
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PlatformEvent {
    /// Process execution started
    ProcessExecutionStarted {
        /// Command being executed
        command: String,
        /// Command arguments
        args: Vec<String>,
        /// Working directory (if set)
        working_dir: Option<String>,
        /// Whether stdio is attached to the operator's terminal
        inherited: bool,
    },

    /// Process execution completed
    ProcessExecutionCompleted {
        /// Command that was executed
        command: String,
        /// Exit code from the process, `None` when killed by a signal
        exit_code: Option<i32>,
        /// Duration of execution in milliseconds
        duration_ms: u64,
    },

    /// Process could not be spawned
    ProcessExecutionFailed {
        /// Command that failed
        command: String,
        /// Error message
        error_message: String,
        /// Duration before failure in milliseconds
        duration_ms: u64,
    },

    /// File moved to a new location
    FileMoved {
        source_path: String,
        target_path: String,
        /// Whether the move had to fall back to copy and delete
        copied: bool,
    },
}
