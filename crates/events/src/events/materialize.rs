use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Configuration rendering events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MaterializeEvent {
    Started {
        config_dir: String,
        /// Number of entries in the template bundle before filtering
        entries: usize,
        security_addon: bool,
    },

    DirectoryCreated { path: String },

    FileRendered { path: String, bytes: usize },

    EntrySkipped { path: String, reason: String },

    Completed {
        files_written: usize,
        directories_created: usize,
        entries_skipped: usize,
    },

    /// Rendering stopped; files written before `path` remain on disk
    Failed {
        path: String,
        failure: FailureContext,
    },

    ComposeRelocated { from: String, to: String },
}
