//! Platform abstraction layer for the installer's host interactions.
//!
//! This crate provides a unified interface for:
//! - Process execution, captured or attached to the operator's terminal
//! - Filesystem moves that survive crossing filesystems
//! - Effective user queries
//!
//! Every external process is reported through `nodeup-events`, so the debug
//! log shows exactly which commands ran and how they exited.

pub mod core;
pub mod filesystem;
pub mod implementations;
pub mod process;
pub mod user;

pub use core::{Platform, PlatformContext};
pub use implementations::unix::UnixPlatform;

/// Re-export commonly used types
pub use filesystem::FilesystemOperations;
pub use process::{CommandOutput, PlatformCommand, ProcessOperations};
