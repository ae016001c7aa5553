use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Top-level installation flow events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InstallEvent {
    Started { work_dir: String, root: bool },

    /// Port preflight skipped because the installer is not running as root
    PortCheckSkipped,

    /// Marker file found; nothing else runs
    AlreadyInstalled { marker: String },

    PublicIpDetected { ip: String },

    InputCollected {
        dashboard_domain: String,
        enable_ipv6: bool,
        has_credentials: bool,
    },

    ConfigurationWritten { config_dir: String },

    ContainersDeclined,

    Completed { outcome: String },

    Failed { failure: FailureContext },
}
