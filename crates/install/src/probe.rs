//! Host readiness queries
//!
//! Probes are pure questions about the host. None of them decide what is
//! fatal; callers do.

use async_trait::async_trait;
use nodeup_config::constants;
use nodeup_errors::InstallError;
use nodeup_events::{AppEvent, EventEmitter, ProbeEvent};
use nodeup_platform::{user, Platform, PlatformCommand, PlatformContext};
use nodeup_types::ContainerRuntime;
use serde::Serialize;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Questions the installer asks about the host
#[async_trait]
pub trait HostProbe: Send + Sync {
    /// Docker: `docker --version` works. Podman: both `podman` and
    /// `podman-compose` answer `--version`.
    async fn is_runtime_installed(&self, runtime: ContainerRuntime) -> bool;

    /// `<runtime> info` exits successfully
    async fn is_runtime_running(&self, runtime: ContainerRuntime) -> bool;

    /// Bind `0.0.0.0:port` and release it immediately
    ///
    /// # Errors
    ///
    /// Returns `PortOccupied` if the port cannot be bound.
    async fn check_port_available(&self, port: u16) -> Result<(), InstallError>;

    /// Root always counts. Podman is rootless and always passes.
    async fn is_user_in_privileged_group(&self, runtime: ContainerRuntime) -> bool;

    async fn is_unprivileged_port_sysctl_set(&self) -> bool;

    async fn is_root(&self) -> bool;
}

/// Probe backed by the real host
pub struct SystemProbe {
    platform: Arc<Platform>,
    ctx: PlatformContext,
    sysctl_path: PathBuf,
}

impl SystemProbe {
    pub fn new(platform: Arc<Platform>, ctx: PlatformContext) -> Self {
        Self {
            platform,
            ctx,
            sysctl_path: PathBuf::from(constants::SYSCTL_CONF),
        }
    }

    #[must_use]
    pub fn with_sysctl_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sysctl_path = path.into();
        self
    }

    /// Run a command and report whether it exited zero. Spawn failures count as no.
    async fn succeeds(&self, program: &str, args: &[&str]) -> bool {
        let mut cmd = PlatformCommand::new(program);
        cmd.args(args);
        matches!(
            self.platform.execute_command(&self.ctx, cmd).await,
            Ok(output) if output.success()
        )
    }

    async fn group_names(&self) -> Vec<String> {
        let mut cmd = PlatformCommand::new("id");
        cmd.arg("-nG");
        match self.platform.execute_command(&self.ctx, cmd).await {
            Ok(output) if output.success() => user::parse_group_list(&output.stdout_text()),
            _ => Vec::new(),
        }
    }
}

/// True when some line of `contents` starts with the unprivileged port key
fn sysctl_line_present(contents: &str) -> bool {
    let prefix = format!("{}=", constants::UNPRIVILEGED_PORT_SYSCTL_KEY);
    contents
        .lines()
        .any(|line| line.trim_start().starts_with(&prefix))
}

#[async_trait]
impl HostProbe for SystemProbe {
    async fn is_runtime_installed(&self, runtime: ContainerRuntime) -> bool {
        let installed = match runtime {
            ContainerRuntime::Docker => self.succeeds("docker", &["--version"]).await,
            ContainerRuntime::Podman => {
                self.succeeds("podman", &["--version"]).await
                    && self.succeeds("podman-compose", &["--version"]).await
            }
        };
        self.ctx
            .emit(AppEvent::Probe(ProbeEvent::RuntimeInstalled { runtime, installed }));
        installed
    }

    async fn is_runtime_running(&self, runtime: ContainerRuntime) -> bool {
        let running = self.succeeds(runtime.binary(), &["info"]).await;
        self.ctx
            .emit(AppEvent::Probe(ProbeEvent::RuntimeRunning { runtime, running }));
        running
    }

    async fn check_port_available(&self, port: u16) -> Result<(), InstallError> {
        // The listener is released on drop
        let result = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(drop)
            .map_err(|e| InstallError::PortOccupied {
                port,
                message: e.to_string(),
            });
        self.ctx.emit(AppEvent::Probe(ProbeEvent::PortChecked {
            port,
            available: result.is_ok(),
        }));
        result
    }

    async fn is_user_in_privileged_group(&self, runtime: ContainerRuntime) -> bool {
        let member = match runtime.privileged_group() {
            None => true,
            Some(_) if user::is_root() => true,
            Some(group) => self.group_names().await.iter().any(|name| name == group),
        };
        self.ctx
            .emit(AppEvent::Probe(ProbeEvent::GroupMembership { runtime, member }));
        member
    }

    async fn is_unprivileged_port_sysctl_set(&self) -> bool {
        let configured = tokio::fs::read_to_string(&self.sysctl_path)
            .await
            .is_ok_and(|contents| sysctl_line_present(&contents));
        self.ctx
            .emit(AppEvent::Probe(ProbeEvent::SysctlChecked { configured }));
        configured
    }

    async fn is_root(&self) -> bool {
        let root = user::is_root();
        self.ctx.emit(AppEvent::Probe(ProbeEvent::EffectiveUser { root }));
        root
    }
}

/// Readiness of one container runtime
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeReport {
    pub runtime: ContainerRuntime,
    pub installed: bool,
    pub running: bool,
    pub in_group: bool,
}

/// Side-effect free summary of host readiness
#[derive(Debug, Clone, Serialize)]
pub struct HostReport {
    pub root: bool,
    /// `(port, available)` for each required port
    pub ports: Vec<(u16, bool)>,
    pub runtimes: Vec<RuntimeReport>,
    pub unprivileged_ports_configured: bool,
}

/// Ask every probe question once
pub async fn probe_host(probe: &dyn HostProbe) -> HostReport {
    let mut ports = Vec::with_capacity(constants::REQUIRED_PORTS.len());
    for port in constants::REQUIRED_PORTS {
        ports.push((port, probe.check_port_available(port).await.is_ok()));
    }

    let mut runtimes = Vec::with_capacity(ContainerRuntime::ALL.len());
    for runtime in ContainerRuntime::ALL {
        let installed = probe.is_runtime_installed(runtime).await;
        let running = installed && probe.is_runtime_running(runtime).await;
        runtimes.push(RuntimeReport {
            runtime,
            installed,
            running,
            in_group: probe.is_user_in_privileged_group(runtime).await,
        });
    }

    HostReport {
        root: probe.is_root().await,
        ports,
        runtimes,
        unprivileged_ports_configured: probe.is_unprivileged_port_sysctl_set().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn system_probe() -> SystemProbe {
        SystemProbe::new(Arc::new(Platform::current()), PlatformContext::new(None))
    }

    #[test]
    fn test_sysctl_line_detection() {
        assert!(sysctl_line_present(
            "# comment\nnet.ipv4.ip_unprivileged_port_start=80\n"
        ));
        assert!(!sysctl_line_present("# net.ipv4.ip_unprivileged_port_start=80\n"));
        assert!(!sysctl_line_present("net.ipv4.ip_forward=1\n"));
        assert!(!sysctl_line_present(""));
    }

    #[tokio::test]
    async fn test_port_check_is_repeatable() {
        // Find a free port, then release it before probing
        let port = TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0))
            .await
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let probe = system_probe();
        probe.check_port_available(port).await.unwrap();
        probe.check_port_available(port).await.unwrap();
    }

    #[tokio::test]
    async fn test_occupied_port_is_reported() {
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let err = system_probe().check_port_available(port).await.unwrap_err();
        assert!(matches!(err, InstallError::PortOccupied { port: p, .. } if p == port));
        drop(listener);
    }

    #[tokio::test]
    async fn test_sysctl_probe_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sysctl.conf");

        let probe = system_probe().with_sysctl_path(&path);
        assert!(!probe.is_unprivileged_port_sysctl_set().await);

        std::fs::write(&path, "net.ipv4.ip_unprivileged_port_start=80\n").unwrap();
        assert!(probe.is_unprivileged_port_sysctl_set().await);
    }

    #[tokio::test]
    async fn test_podman_needs_no_group() {
        assert!(
            system_probe()
                .is_user_in_privileged_group(ContainerRuntime::Podman)
                .await
        );
    }
}
