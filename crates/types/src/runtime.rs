//! Container runtime vocabulary

use nodeup_errors::InstallError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Container engine used to run the application stack.
///
/// The installation record holds an `Option<ContainerRuntime>`; `None` is the
/// transient "undefined" choice that exists only until the operator picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerRuntime {
    Docker,
    Podman,
}

impl ContainerRuntime {
    /// All supported runtimes, in prompt order.
    pub const ALL: [Self; 2] = [Self::Docker, Self::Podman];

    /// Name of the runtime CLI binary
    #[must_use]
    pub fn binary(self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Podman => "podman",
        }
    }

    /// Human readable name used in operator messages
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Docker => "Docker",
            Self::Podman => "Podman",
        }
    }

    /// Name of the system service that hosts the runtime daemon
    #[must_use]
    pub fn service_name(self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Podman => "podman.socket",
        }
    }

    /// Group granting non-root access to the runtime, if the runtime has one
    #[must_use]
    pub fn privileged_group(self) -> Option<&'static str> {
        match self {
            Self::Docker => Some("docker"),
            Self::Podman => None,
        }
    }
}

impl fmt::Display for ContainerRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

impl FromStr for ContainerRuntime {
    type Err = InstallError;

    /// Case-insensitive match against the closed `docker`/`podman` vocabulary.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|runtime| trimmed.eq_ignore_ascii_case(runtime.binary()))
            .ok_or_else(|| InstallError::InvalidRuntimeChoice {
                input: s.to_string(),
            })
    }
}
