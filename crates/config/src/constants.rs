//! Fixed values that are not exposed through TOML configuration
//!
//! These mirror paths and names the rendered stack expects.

/// Ports the reverse proxy must own on a root install.
pub const REQUIRED_PORTS: [u16; 2] = [80, 443];

/// Name of the rendered configuration directory under the working directory.
pub const CONFIG_DIR_NAME: &str = "config";

/// File whose presence marks a completed first run.
pub const MARKER_FILE_NAME: &str = "config.yml";

/// Subdirectory created for container logs.
pub const LOGS_DIR_NAME: &str = "logs";

/// Compose definition relocated from the config directory after rendering.
pub const COMPOSE_FILE_NAME: &str = "docker-compose.yml";

/// Path component marking the security add-on template subtree.
pub const SECURITY_ADDON_NAMESPACE: &str = "crowdsec";

pub const SYSCTL_CONF: &str = "/etc/sysctl.conf";
pub const OS_RELEASE: &str = "/etc/os-release";
pub const UNPRIVILEGED_PORT_SYSCTL_KEY: &str = "net.ipv4.ip_unprivileged_port_start";
pub const UNPRIVILEGED_PORT_START: u16 = 80;

pub const DEFAULT_DASHBOARD_URL: &str = "https://app.pangolin.net";
pub const DEFAULT_ISSUANCE_URL: &str =
    "https://api.pangolin.net/api/v1/remote-exit-node/quick-start";
pub const DEFAULT_PUBLIC_IP_URL: &str = "https://ifconfig.io/ip";
