//! Installation error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum InstallError {
    #[error("port {port} is occupied or cannot be bound: {message}")]
    PortOccupied { port: u16, message: String },

    #[error("dashboard domain name is required")]
    MissingDashboardDomain,

    #[error("unrecognized container type: {input}. Valid options are 'docker' or 'podman'")]
    InvalidRuntimeChoice { input: String },

    #[error("container runtime has not been chosen")]
    RuntimeUndefined,

    #[error("error requesting managed credentials: {message}")]
    CredentialIssuanceFailed { message: String },

    #[error("{runtime} is not installed: {message}")]
    RuntimeNotInstalled { runtime: String, message: String },

    #[error("you are not in the {group} group")]
    NotInPrivilegedGroup { group: String },

    #[error("root privileges are required to {operation}")]
    RootRequired { operation: String },

    #[error("failed to install {runtime}: {message}")]
    RuntimeInstallFailed { runtime: String, message: String },

    #[error("{runtime} is still not running after {attempts} checks")]
    RuntimeNotReady { runtime: String, attempts: u32 },

    #[error("failed to configure unprivileged ports: {message}")]
    SysctlFailed { message: String },

    #[error("failed to render template {path}: {message}")]
    TemplateFailed { path: String, message: String },

    #[error("filesystem operation failed: {operation} on {path}: {message}")]
    FilesystemError {
        operation: String,
        path: String,
        message: String,
    },

    #[error("container {step} failed: {message}")]
    ContainerStepFailed { step: String, message: String },

    #[error("failed to read operator input: {message}")]
    PromptFailed { message: String },
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::PortOccupied { .. } => Some(
                "Please close any services on ports 80/443 in order to run the installation smoothly. If you already have the Pangolin stack running, shut them down before proceeding.",
            ),
            Self::MissingDashboardDomain => {
                Some("Enter the public IP address or a domain name pointing at this node.")
            }
            Self::CredentialIssuanceFailed { .. } => Some(
                "Please obtain credentials manually from the dashboard and run the installer again.",
            ),
            Self::NotInPrivilegedGroup { .. } => Some(
                "The installer will not be able to run docker commands without running it as root.",
            ),
            Self::RootRequired { .. } => Some("You need to run the installer as root for such a configuration."),
            Self::RuntimeNotReady { .. } | Self::RuntimeInstallFailed { .. } => {
                Some("Please check the container runtime installation.")
            }
            Self::TemplateFailed { .. } => Some(
                "The configuration directory may be partially written. Remove it before running the installer again.",
            ),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::CredentialIssuanceFailed { .. } | Self::ContainerStepFailed { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::PortOccupied { .. } => "install.port_occupied",
            Self::MissingDashboardDomain => "install.missing_domain",
            Self::InvalidRuntimeChoice { .. } => "install.invalid_runtime",
            Self::RuntimeUndefined => "install.runtime_undefined",
            Self::CredentialIssuanceFailed { .. } => "install.issuance_failed",
            Self::RuntimeNotInstalled { .. } => "install.runtime_missing",
            Self::NotInPrivilegedGroup { .. } => "install.not_in_group",
            Self::RootRequired { .. } => "install.root_required",
            Self::RuntimeInstallFailed { .. } => "install.runtime_install_failed",
            Self::RuntimeNotReady { .. } => "install.runtime_not_ready",
            Self::SysctlFailed { .. } => "install.sysctl_failed",
            Self::TemplateFailed { .. } => "install.template_failed",
            Self::FilesystemError { .. } => "install.filesystem",
            Self::ContainerStepFailed { .. } => "install.container_step_failed",
            Self::PromptFailed { .. } => "install.prompt_failed",
        })
    }
}
