//! Side-effecting runtime operations

use async_trait::async_trait;
use nodeup_config::constants;
use nodeup_errors::{Error, InstallError, PlatformError};
use nodeup_events::{AppEvent, ContainerStep, EventEmitter, RuntimeEvent};
use nodeup_platform::{Platform, PlatformCommand, PlatformContext};
use nodeup_types::ContainerRuntime;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::distro::DistroFamily;

/// Operations that change the host's container runtime
#[async_trait]
pub trait RuntimeControl: Send + Sync {
    /// Install the runtime through the host package manager
    async fn install(&self, runtime: ContainerRuntime) -> Result<(), Error>;

    /// Enable and start the runtime's system service
    async fn start_service(&self, runtime: ContainerRuntime) -> Result<(), Error>;

    /// Append the unprivileged port line to sysctl.conf and reload
    async fn enable_unprivileged_ports(&self) -> Result<(), Error>;

    /// Run a compose step against `compose_file` with the operator's terminal attached
    async fn compose(
        &self,
        runtime: ContainerRuntime,
        step: ContainerStep,
        compose_file: &Path,
    ) -> Result<(), Error>;
}

/// Build the compose command line for a runtime and step.
///
/// Docker uses the `docker compose` plugin when present and the standalone
/// `docker-compose` binary otherwise.
#[must_use]
pub fn compose_invocation(
    runtime: ContainerRuntime,
    plugin_available: bool,
    step: ContainerStep,
    compose_file: &Path,
) -> PlatformCommand {
    let mut cmd = match runtime {
        ContainerRuntime::Docker if plugin_available => {
            let mut cmd = PlatformCommand::new("docker");
            cmd.arg("compose");
            cmd
        }
        ContainerRuntime::Docker => PlatformCommand::new("docker-compose"),
        ContainerRuntime::Podman => PlatformCommand::new("podman-compose"),
    };

    cmd.arg("-f").arg(compose_file.to_string_lossy());
    match step {
        ContainerStep::Pull => cmd.arg("pull"),
        ContainerStep::Up => cmd.args(["up", "-d"]),
    };

    if let Some(dir) = compose_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        cmd.current_dir(dir);
    }
    cmd
}

/// Script appending the unprivileged port line and reloading sysctl
#[must_use]
pub fn sysctl_script() -> String {
    format!(
        "echo '{}={}' >> {} && sysctl -p",
        constants::UNPRIVILEGED_PORT_SYSCTL_KEY,
        constants::UNPRIVILEGED_PORT_START,
        constants::SYSCTL_CONF
    )
}

/// Runtime control backed by the real host
pub struct SystemRuntime {
    platform: Arc<Platform>,
    ctx: PlatformContext,
    os_release: PathBuf,
}

impl SystemRuntime {
    pub fn new(platform: Arc<Platform>, ctx: PlatformContext) -> Self {
        Self {
            platform,
            ctx,
            os_release: PathBuf::from(constants::OS_RELEASE),
        }
    }

    async fn distro(&self) -> DistroFamily {
        match tokio::fs::read_to_string(&self.os_release).await {
            Ok(contents) => DistroFamily::from_os_release(&contents),
            Err(e) => {
                self.ctx.emit_debug(format!(
                    "cannot read {}: {e}; using the convenience script",
                    self.os_release.display()
                ));
                DistroFamily::ConvenienceScript
            }
        }
    }

    async fn compose_plugin_available(&self) -> bool {
        let mut cmd = PlatformCommand::new("docker");
        cmd.args(["compose", "version"]);
        matches!(
            self.platform.execute_command(&self.ctx, cmd).await,
            Ok(output) if output.success()
        )
    }

    /// Run attached to the terminal; a non-zero exit becomes `CommandFailed`
    async fn run_checked(&self, cmd: PlatformCommand) -> Result<(), Error> {
        let display = cmd.display();
        let status = self.platform.run_inherited(&self.ctx, cmd).await?;
        if status.success() {
            Ok(())
        } else {
            Err(PlatformError::CommandFailed {
                command: display,
                code: status.code(),
            }
            .into())
        }
    }
}

#[async_trait]
impl RuntimeControl for SystemRuntime {
    async fn install(&self, runtime: ContainerRuntime) -> Result<(), Error> {
        if runtime == ContainerRuntime::Podman {
            return Err(InstallError::RuntimeNotInstalled {
                runtime: runtime.display_name().to_string(),
                message: "automated installation is only available for Docker".to_string(),
            }
            .into());
        }

        let family = self.distro().await;
        self.ctx
            .emit(AppEvent::Runtime(RuntimeEvent::InstallStarted {
                runtime,
                method: family.label().to_string(),
            }));

        let mut cmd = PlatformCommand::shell(&family.install_script());
        // apt must not stop at debconf questions
        cmd.env("DEBIAN_FRONTEND", "noninteractive");
        self.run_checked(cmd)
            .await
            .map_err(|e| {
                InstallError::RuntimeInstallFailed {
                    runtime: runtime.display_name().to_string(),
                    message: e.to_string(),
                }
                .into()
            })
    }

    async fn start_service(&self, runtime: ContainerRuntime) -> Result<(), Error> {
        let mut cmd = PlatformCommand::new("systemctl");
        cmd.args(["enable", "--now", runtime.service_name()]);
        let display = cmd.display();

        let output = self.platform.execute_command(&self.ctx, cmd).await?;
        if output.success() {
            Ok(())
        } else {
            Err(PlatformError::ProcessExecutionFailed {
                command: display,
                message: output.stderr_text(),
            }
            .into())
        }
    }

    async fn enable_unprivileged_ports(&self) -> Result<(), Error> {
        self.run_checked(PlatformCommand::shell(&sysctl_script()))
            .await
            .map_err(|e| {
                InstallError::SysctlFailed {
                    message: e.to_string(),
                }
                .into()
            })
    }

    async fn compose(
        &self,
        runtime: ContainerRuntime,
        step: ContainerStep,
        compose_file: &Path,
    ) -> Result<(), Error> {
        let plugin = runtime == ContainerRuntime::Docker && self.compose_plugin_available().await;
        let cmd = compose_invocation(runtime, plugin, step, compose_file);

        self.run_checked(cmd).await.map_err(|e| {
            InstallError::ContainerStepFailed {
                step: step.as_str().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }
}
