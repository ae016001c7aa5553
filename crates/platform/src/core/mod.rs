//! Platform handle and per-operation context

use nodeup_errors::Error;
use nodeup_events::{EventEmitter, EventSender};
use std::process::ExitStatus;

use crate::filesystem::FilesystemOperations;
use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};

/// Carries the event sender that platform operations report through.
///
/// A context without a sender runs silently; probes in tests use that.
#[derive(Debug, Clone, Default)]
pub struct PlatformContext {
    event_sender: Option<EventSender>,
}

impl PlatformContext {
    pub fn new(event_sender: Option<EventSender>) -> Self {
        Self { event_sender }
    }
}

impl EventEmitter for PlatformContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

/// Host filesystem and process operations behind trait objects
pub struct Platform {
    filesystem_ops: Box<dyn FilesystemOperations>,
    process_ops: Box<dyn ProcessOperations>,
}

impl Platform {
    pub fn new(
        filesystem_ops: Box<dyn FilesystemOperations>,
        process_ops: Box<dyn ProcessOperations>,
    ) -> Self {
        Self {
            filesystem_ops,
            process_ops,
        }
    }

    /// Platform for the host this binary runs on
    pub fn current() -> Self {
        crate::implementations::unix::UnixPlatform::new()
    }

    pub fn filesystem(&self) -> &dyn FilesystemOperations {
        &*self.filesystem_ops
    }

    pub fn process(&self) -> &dyn ProcessOperations {
        &*self.process_ops
    }

    pub fn create_context(&self, event_sender: Option<EventSender>) -> PlatformContext {
        PlatformContext::new(event_sender)
    }

    /// Run `cmd` to completion with captured output
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    pub async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, Error> {
        self.process().execute_command(ctx, cmd).await
    }

    /// Run `cmd` with the operator's terminal attached
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    pub async fn run_inherited(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<ExitStatus, Error> {
        self.process().run_inherited(ctx, cmd).await
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform").finish_non_exhaustive()
    }
}
