use nodeup_types::ContainerRuntime;
use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Container runtime preflight and bootstrap events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RuntimeEvent {
    Selected { runtime: ContainerRuntime },

    PreflightPassed { runtime: ContainerRuntime },

    /// Bootstrap state machine transition (`not_installed`, `installing`,
    /// `started`, `failed`)
    StateChanged {
        runtime: ContainerRuntime,
        from: String,
        to: String,
    },

    InstallStarted {
        runtime: ContainerRuntime,
        method: String,
    },

    InstallCompleted { runtime: ContainerRuntime },

    ServiceStarted { runtime: ContainerRuntime },

    /// Non-fatal; readiness polling still decides the outcome
    ServiceStartFailed {
        runtime: ContainerRuntime,
        failure: FailureContext,
    },

    PollAttempt {
        runtime: ContainerRuntime,
        attempt: u32,
        max_attempts: u32,
        ready: bool,
    },

    Ready {
        runtime: ContainerRuntime,
        attempts: u32,
    },

    NotReady {
        runtime: ContainerRuntime,
        attempts: u32,
    },

    SysctlAlreadyConfigured,

    SysctlConfigured,

    SysctlDeclined,
}
