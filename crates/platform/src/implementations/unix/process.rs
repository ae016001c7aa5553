//! Unix process operations implementation
//!
//! Wraps `tokio::process::Command` with platform events so every external
//! command the installer runs shows up in the debug log.

use async_trait::async_trait;
use nodeup_errors::{Error, PlatformError};
use nodeup_events::{AppEvent, EventEmitter, PlatformEvent};
use std::convert::TryFrom;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;

use crate::core::PlatformContext;
use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};

/// Unix implementation of process operations
pub struct UnixProcessOperations;

impl UnixProcessOperations {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnixProcessOperations {
    fn default() -> Self {
        Self::new()
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn build_command(cmd: &PlatformCommand) -> Command {
    let mut command = Command::new(cmd.program());
    command.args(cmd.get_args());

    if let Some(dir) = cmd.get_current_dir() {
        command.current_dir(dir);
    }

    for (key, value) in cmd.get_env_vars() {
        command.env(key, value);
    }

    command
}

fn emit_process_started(ctx: &PlatformContext, cmd: &PlatformCommand, inherited: bool) {
    ctx.emit(AppEvent::Platform(PlatformEvent::ProcessExecutionStarted {
        command: cmd.program().to_string(),
        args: cmd.get_args().to_vec(),
        working_dir: cmd.get_current_dir().map(|dir| dir.display().to_string()),
        inherited,
    }));
}

fn emit_process_completed(
    ctx: &PlatformContext,
    cmd: &PlatformCommand,
    status: ExitStatus,
    duration: Duration,
) {
    ctx.emit(AppEvent::Platform(PlatformEvent::ProcessExecutionCompleted {
        command: cmd.program().to_string(),
        exit_code: status.code(),
        duration_ms: duration_to_millis(duration),
    }));
}

fn emit_process_failed(
    ctx: &PlatformContext,
    cmd: &PlatformCommand,
    error: &PlatformError,
    duration: Duration,
) {
    ctx.emit(AppEvent::Platform(PlatformEvent::ProcessExecutionFailed {
        command: cmd.program().to_string(),
        error_message: error.to_string(),
        duration_ms: duration_to_millis(duration),
    }));
}

fn spawn_error(cmd: &PlatformCommand, err: &std::io::Error) -> PlatformError {
    if err.kind() == std::io::ErrorKind::NotFound {
        PlatformError::CommandNotFound {
            command: cmd.program().to_string(),
        }
    } else {
        PlatformError::ProcessExecutionFailed {
            command: cmd.display(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl ProcessOperations for UnixProcessOperations {
    async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, Error> {
        let start = Instant::now();
        emit_process_started(ctx, &cmd, false);

        let result = build_command(&cmd)
            .stdin(Stdio::null())
            .output()
            .await
            .map(|output| CommandOutput {
                status: output.status,
                stdout: output.stdout,
                stderr: output.stderr,
            })
            .map_err(|e| spawn_error(&cmd, &e));

        let duration = start.elapsed();
        match &result {
            Ok(output) => emit_process_completed(ctx, &cmd, output.status, duration),
            Err(e) => emit_process_failed(ctx, &cmd, e, duration),
        }

        result.map_err(Error::from)
    }

    async fn run_inherited(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<ExitStatus, Error> {
        let start = Instant::now();
        emit_process_started(ctx, &cmd, true);

        let result = build_command(&cmd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| spawn_error(&cmd, &e));

        let duration = start.elapsed();
        match &result {
            Ok(status) => emit_process_completed(ctx, &cmd, *status, duration),
            Err(e) => emit_process_failed(ctx, &cmd, e, duration),
        }

        result.map_err(Error::from)
    }

    fn create_command(&self, program: &str) -> PlatformCommand {
        PlatformCommand::new(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_execute_captures_output() {
        let ops = UnixProcessOperations::new();
        let (tx, rx) = nodeup_events::channel();
        let ctx = PlatformContext::new(Some(tx));

        let mut cmd = ops.create_command("sh");
        cmd.arg("-c").arg("echo hello; exit 3");
        let output = ops.execute_command(&ctx, cmd).await.unwrap();

        assert_eq!(output.stdout_text(), "hello");
        assert_eq!(output.status.code(), Some(3));
        assert!(!output.success());

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[1].event,
            AppEvent::Platform(PlatformEvent::ProcessExecutionCompleted {
                exit_code: Some(3),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_missing_program_is_command_not_found() {
        let ops = UnixProcessOperations::new();
        let ctx = PlatformContext::new(None);
        let cmd = ops.create_command("nodeup-definitely-not-a-binary");

        let err = ops.execute_command(&ctx, cmd).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Platform(PlatformError::CommandNotFound { .. })
        ));
    }
}
