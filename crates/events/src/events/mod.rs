use serde::{Deserialize, Serialize};

use crate::EventSource;
use nodeup_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code (e.g. `install.port_occupied`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod containers;
pub mod credentials;
pub mod general;
pub mod install;
pub mod materialize;
pub mod platform;
pub mod probe;
pub mod runtime;

pub use containers::*;
pub use credentials::*;
pub use general::*;
pub use install::*;
pub use materialize::*;
pub use platform::*;
pub use probe::*;
pub use runtime::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (notices, warnings, errors)
    General(GeneralEvent),

    /// External processes and filesystem moves
    Platform(PlatformEvent),

    /// Host readiness queries
    Probe(ProbeEvent),

    /// Enrollment credential acquisition
    Credentials(CredentialsEvent),

    /// Template rendering into the config directory
    Materialize(MaterializeEvent),

    /// Runtime preflight, installation and readiness
    Runtime(RuntimeEvent),

    /// Compose pull and up
    Containers(ContainersEvent),

    /// Installation flow milestones
    Install(InstallEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::General,
            Self::Platform(_) => EventSource::Platform,
            Self::Probe(_) => EventSource::Probe,
            Self::Credentials(_) => EventSource::Credentials,
            Self::Materialize(_) => EventSource::Materialize,
            Self::Runtime(_) => EventSource::Runtime,
            Self::Containers(_) => EventSource::Containers,
            Self::Install(_) => EventSource::Install,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::Credentials(CredentialsEvent::IssuanceFailed { .. })
            | Self::Materialize(MaterializeEvent::Failed { .. })
            | Self::Runtime(RuntimeEvent::NotReady { .. })
            | Self::Containers(ContainersEvent::StepFailed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Credentials(CredentialsEvent::ExistingIncomplete)
            | Self::Runtime(
                RuntimeEvent::ServiceStartFailed { .. } | RuntimeEvent::SysctlDeclined,
            ) => Level::WARN,

            // Failed spawns are often a probe finding a binary missing, and
            // the terminal failure is reported once by the caller
            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Platform(_)
            | Self::Install(InstallEvent::Failed { .. })
            | Self::Probe(_)
            | Self::Materialize(
                MaterializeEvent::DirectoryCreated { .. }
                | MaterializeEvent::FileRendered { .. }
                | MaterializeEvent::EntrySkipped { .. },
            )
            | Self::Runtime(RuntimeEvent::PollAttempt { .. }) => Level::DEBUG,

            _ => Level::INFO,
        }
    }
}
