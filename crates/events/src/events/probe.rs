use nodeup_types::ContainerRuntime;
use serde::{Deserialize, Serialize};

/// Host readiness query results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProbeEvent {
    PortChecked { port: u16, available: bool },

    RuntimeInstalled {
        runtime: ContainerRuntime,
        installed: bool,
    },

    RuntimeRunning {
        runtime: ContainerRuntime,
        running: bool,
    },

    GroupMembership {
        runtime: ContainerRuntime,
        member: bool,
    },

    /// Whether the unprivileged port start line is present in sysctl.conf
    SysctlChecked { configured: bool },

    EffectiveUser { root: bool },
}
