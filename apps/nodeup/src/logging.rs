//! Structured logging integration for events
//!
//! Every event the installer emits is mirrored into the tracing pipeline with
//! structured fields, so a `--debug` log file holds the full run even though
//! the terminal only shows the operator-facing lines.

use nodeup_events::{
    AppEvent, ContainersEvent, CredentialsEvent, EventMessage, GeneralEvent, InstallEvent,
    MaterializeEvent, PlatformEvent, ProbeEvent, RuntimeEvent,
};
use tracing::{debug, error, info, trace, warn, Level};

/// Dispatch to the tracing macro matching a runtime level
macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            Level::ERROR => error!($($arg)+),
            Level::WARN => warn!($($arg)+),
            Level::INFO => info!($($arg)+),
            Level::DEBUG => debug!($($arg)+),
            _ => trace!($($arg)+),
        }
    };
}

/// Log an `EventMessage` at its metadata level with structured fields.
///
/// Issued credential secrets are never written.
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    let level = meta.tracing_level();
    let source = meta.source.as_str();

    match &message.event {
        AppEvent::General(event) => match event {
            GeneralEvent::Notice { message } => {
                log_at!(level, source, event_id = %meta.event_id, run_id = %meta.run_id, "{message}");
            }
            GeneralEvent::Section { title } => {
                log_at!(level, source, event_id = %meta.event_id, section = %title, "Section started");
            }
            GeneralEvent::Warning { message } | GeneralEvent::DebugLog { message } => {
                log_at!(level, source, event_id = %meta.event_id, "{message}");
            }
        },

        AppEvent::Platform(event) => match event {
            PlatformEvent::ProcessExecutionStarted {
                command,
                args,
                working_dir,
                inherited,
            } => {
                log_at!(
                    level,
                    source,
                    command = %command,
                    args = ?args,
                    working_dir = ?working_dir,
                    inherited = inherited,
                    "Process started"
                );
            }
            PlatformEvent::ProcessExecutionCompleted {
                command,
                exit_code,
                duration_ms,
            } => {
                log_at!(
                    level,
                    source,
                    command = %command,
                    exit_code = ?exit_code,
                    duration_ms = duration_ms,
                    "Process completed"
                );
            }
            PlatformEvent::ProcessExecutionFailed {
                command,
                error_message,
                duration_ms,
            } => {
                log_at!(
                    level,
                    source,
                    command = %command,
                    error = %error_message,
                    duration_ms = duration_ms,
                    "Process failed to run"
                );
            }
            PlatformEvent::FileMoved {
                source_path,
                target_path,
                copied,
            } => {
                log_at!(
                    level,
                    source,
                    from = %source_path,
                    to = %target_path,
                    copied = copied,
                    "File moved"
                );
            }
        },

        AppEvent::Probe(event) => {
            log_at!(level, source, probe = ?event, "Host probed");
        }

        AppEvent::Credentials(event) => match event {
            CredentialsEvent::ExistingAccepted { id } => {
                log_at!(level, source, node_id = %id, "Operator supplied credentials");
            }
            CredentialsEvent::ExistingIncomplete => {
                log_at!(level, source, "Operator credentials incomplete; issuing new ones");
            }
            CredentialsEvent::IssuanceStarted => {
                log_at!(level, source, "Requesting node credentials");
            }
            CredentialsEvent::Issued { id, dashboard_url, .. } => {
                log_at!(
                    level,
                    source,
                    node_id = %id,
                    dashboard = %dashboard_url,
                    "Node credentials issued"
                );
            }
            CredentialsEvent::IssuanceFailed { failure } => {
                log_at!(
                    level,
                    source,
                    code = ?failure.code,
                    message = %failure.message,
                    retryable = failure.retryable,
                    "Credential issuance failed"
                );
            }
            CredentialsEvent::AdoptionAcknowledged { acknowledged } => {
                log_at!(level, source, acknowledged = acknowledged, "Adoption prompt answered");
            }
        },

        AppEvent::Materialize(event) => match event {
            MaterializeEvent::Failed { path, failure } => {
                log_at!(
                    level,
                    source,
                    path = %path,
                    code = ?failure.code,
                    message = %failure.message,
                    "Template rendering failed"
                );
            }
            other => {
                log_at!(level, source, materialize = ?other, "Configuration step");
            }
        },

        AppEvent::Runtime(event) => match event {
            RuntimeEvent::ServiceStartFailed { runtime, failure } => {
                log_at!(
                    level,
                    source,
                    runtime = %runtime,
                    message = %failure.message,
                    "Runtime service failed to start"
                );
            }
            RuntimeEvent::PollAttempt {
                runtime,
                attempt,
                max_attempts,
                ready,
            } => {
                log_at!(
                    level,
                    source,
                    runtime = %runtime,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    ready = ready,
                    "Runtime readiness check"
                );
            }
            other => {
                log_at!(level, source, runtime_event = ?other, "Runtime step");
            }
        },

        AppEvent::Containers(event) => match event {
            ContainersEvent::StepStarted {
                runtime,
                step,
                command,
            } => {
                log_at!(
                    level,
                    source,
                    runtime = %runtime,
                    step = step.as_str(),
                    command = %command,
                    "Container step started"
                );
            }
            ContainersEvent::StepCompleted { runtime, step } => {
                log_at!(level, source, runtime = %runtime, step = step.as_str(), "Container step completed");
            }
            ContainersEvent::StepFailed {
                runtime,
                step,
                failure,
            } => {
                log_at!(
                    level,
                    source,
                    runtime = %runtime,
                    step = step.as_str(),
                    message = %failure.message,
                    "Container step failed"
                );
            }
        },

        AppEvent::Install(event) => match event {
            InstallEvent::Failed { failure } => {
                log_at!(
                    level,
                    source,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Installation failed"
                );
            }
            InstallEvent::InputCollected {
                dashboard_domain,
                enable_ipv6,
                has_credentials,
            } => {
                log_at!(
                    level,
                    source,
                    dashboard_domain = %dashboard_domain,
                    enable_ipv6 = enable_ipv6,
                    has_credentials = has_credentials,
                    "Operator input collected"
                );
            }
            other => {
                log_at!(level, source, install = ?other, "Installation step");
            }
        },
    }
}
