use nodeup_types::ContainerRuntime;
use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Compose step being executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerStep {
    Pull,
    Up,
}

impl ContainerStep {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pull => "pull",
            Self::Up => "up",
        }
    }
}

/// Container image and service lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContainersEvent {
    StepStarted {
        runtime: ContainerRuntime,
        step: ContainerStep,
        command: String,
    },

    StepCompleted {
        runtime: ContainerRuntime,
        step: ContainerStep,
    },

    StepFailed {
        runtime: ContainerRuntime,
        step: ContainerStep,
        failure: FailureContext,
    },
}
