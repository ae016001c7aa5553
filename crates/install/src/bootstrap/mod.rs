//! Container runtime preflight and bootstrap

mod control;
mod distro;

pub use control::{compose_invocation, sysctl_script, RuntimeControl, SystemRuntime};
pub use distro::DistroFamily;

use nodeup_errors::{Error, InstallError};
use nodeup_events::{AppEvent, EventEmitter, EventSender, FailureContext, RuntimeEvent};
use nodeup_types::ContainerRuntime;
use std::fmt;
use std::time::Duration;

use crate::probe::HostProbe;
use crate::prompt::Prompter;

/// Bootstrap state of the chosen runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    NotInstalled,
    Installing,
    Started,
    Failed,
}

impl fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotInstalled => "not_installed",
            Self::Installing => "installing",
            Self::Started => "started",
            Self::Failed => "failed",
        })
    }
}

/// Brings the chosen runtime to a usable state
pub struct RuntimeBootstrapper<'a> {
    probe: &'a dyn HostProbe,
    control: &'a dyn RuntimeControl,
    poll_attempts: u32,
    poll_interval: Duration,
    auto_install_supported: bool,
    tx: EventSender,
}

impl<'a> RuntimeBootstrapper<'a> {
    pub fn new(
        probe: &'a dyn HostProbe,
        control: &'a dyn RuntimeControl,
        tx: EventSender,
    ) -> Self {
        Self {
            probe,
            control,
            poll_attempts: 5,
            poll_interval: Duration::from_secs(2),
            auto_install_supported: cfg!(target_os = "linux"),
            tx,
        }
    }

    #[must_use]
    pub fn with_polling(mut self, attempts: u32, interval: Duration) -> Self {
        self.poll_attempts = attempts.max(1);
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_auto_install(mut self, supported: bool) -> Self {
        self.auto_install_supported = supported;
        self
    }

    fn transition(&self, runtime: ContainerRuntime, from: BootstrapState, to: BootstrapState) {
        self.tx.emit(AppEvent::Runtime(RuntimeEvent::StateChanged {
            runtime,
            from: from.to_string(),
            to: to.to_string(),
        }));
    }

    /// Verify the host can run `runtime` before any container command.
    ///
    /// # Errors
    ///
    /// Docker: not installed without root, or the user lacks the docker group.
    /// Podman: not installed, sysctl approval without root, or a failed sysctl
    /// reload.
    pub async fn preflight(
        &self,
        runtime: ContainerRuntime,
        prompter: &mut dyn Prompter,
    ) -> Result<(), Error> {
        match runtime {
            ContainerRuntime::Docker => self.preflight_docker().await?,
            ContainerRuntime::Podman => self.preflight_podman(prompter).await?,
        }
        self.tx
            .emit(AppEvent::Runtime(RuntimeEvent::PreflightPassed { runtime }));
        Ok(())
    }

    async fn preflight_docker(&self) -> Result<(), Error> {
        let runtime = ContainerRuntime::Docker;
        if !self.probe.is_runtime_installed(runtime).await && !self.probe.is_root().await {
            return Err(InstallError::RuntimeNotInstalled {
                runtime: runtime.display_name().to_string(),
                message: "Please install Docker manually or run this installer as root."
                    .to_string(),
            }
            .into());
        }

        if !self.probe.is_user_in_privileged_group(runtime).await {
            return Err(InstallError::NotInPrivilegedGroup {
                group: runtime.privileged_group().unwrap_or("docker").to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn preflight_podman(&self, prompter: &mut dyn Prompter) -> Result<(), Error> {
        let runtime = ContainerRuntime::Podman;
        if !self.probe.is_runtime_installed(runtime).await {
            return Err(InstallError::RuntimeNotInstalled {
                runtime: runtime.display_name().to_string(),
                message: "Podman or podman-compose is not installed. Please install both manually. Automated installation will be available in a later release.".to_string(),
            }
            .into());
        }

        if self.probe.is_unprivileged_port_sysctl_set().await {
            self.tx.emit_notice("Unprivileged ports have been configured.");
            self.tx
                .emit(AppEvent::Runtime(RuntimeEvent::SysctlAlreadyConfigured));
            return Ok(());
        }

        self.tx.emit_notice(
            "Would you like to configure ports >= 80 as unprivileged ports? This enables podman containers to listen on low-range ports.",
        );
        self.tx.emit_notice(
            "Pangolin will experience startup issues if this is not configured, because it needs to listen on port 80/443 by default.",
        );
        let prompt = format!(
            "The installer is about to execute \"{}\". Approve?",
            sysctl_script()
        );

        if !prompter.read_bool(&prompt, true)? {
            self.tx.emit_warning(
                "You need to configure port forwarding or adjust the listening ports before running pangolin.",
            );
            self.tx.emit(AppEvent::Runtime(RuntimeEvent::SysctlDeclined));
            return Ok(());
        }

        if !self.probe.is_root().await {
            return Err(InstallError::RootRequired {
                operation: "configure unprivileged ports".to_string(),
            }
            .into());
        }

        self.control.enable_unprivileged_ports().await?;
        self.tx.emit(AppEvent::Runtime(RuntimeEvent::SysctlConfigured));
        Ok(())
    }

    /// Offer to install a missing runtime, then start it and wait for it.
    ///
    /// Only Docker on hosts with automatic installation support is offered.
    /// Everything else returns the current state untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if installation fails or the runtime never becomes
    /// ready. A failed service start is reported and not fatal.
    pub async fn bootstrap(
        &self,
        runtime: ContainerRuntime,
        prompter: &mut dyn Prompter,
    ) -> Result<BootstrapState, Error> {
        if self.probe.is_runtime_installed(runtime).await {
            return Ok(BootstrapState::Started);
        }
        if runtime != ContainerRuntime::Docker || !self.auto_install_supported {
            return Ok(BootstrapState::NotInstalled);
        }

        let prompt = format!(
            "{} is not installed. Would you like to install it?",
            runtime.display_name()
        );
        if !prompter.read_bool(&prompt, true)? {
            return Ok(BootstrapState::NotInstalled);
        }

        self.transition(runtime, BootstrapState::NotInstalled, BootstrapState::Installing);
        if let Err(e) = self.control.install(runtime).await {
            self.transition(runtime, BootstrapState::Installing, BootstrapState::Failed);
            return Err(e);
        }
        self.tx
            .emit(AppEvent::Runtime(RuntimeEvent::InstallCompleted { runtime }));

        match self.control.start_service(runtime).await {
            Ok(()) => {
                self.tx
                    .emit(AppEvent::Runtime(RuntimeEvent::ServiceStarted { runtime }));
            }
            Err(e) => {
                self.tx
                    .emit(AppEvent::Runtime(RuntimeEvent::ServiceStartFailed {
                        runtime,
                        failure: FailureContext::from_error(&e),
                    }));
            }
        }

        match self.wait_until_ready(runtime).await {
            Ok(_) => {
                self.transition(runtime, BootstrapState::Installing, BootstrapState::Started);
                self.tx.emit_notice(format!(
                    "{} installed successfully!",
                    runtime.display_name()
                ));
                Ok(BootstrapState::Started)
            }
            Err(e) => {
                self.transition(runtime, BootstrapState::Installing, BootstrapState::Failed);
                Err(e)
            }
        }
    }

    /// Check readiness up to the configured number of times, sleeping only
    /// between checks. Returns the number of checks made.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeNotReady` when every check fails.
    pub async fn wait_until_ready(&self, runtime: ContainerRuntime) -> Result<u32, Error> {
        let name = runtime.display_name();
        self.tx.emit_notice(format!("Waiting for {name} to start..."));

        for attempt in 1..=self.poll_attempts {
            let ready = self.probe.is_runtime_running(runtime).await;
            self.tx.emit(AppEvent::Runtime(RuntimeEvent::PollAttempt {
                runtime,
                attempt,
                max_attempts: self.poll_attempts,
                ready,
            }));

            if ready {
                self.tx.emit_notice(format!("{name} is running!"));
                self.tx.emit(AppEvent::Runtime(RuntimeEvent::Ready {
                    runtime,
                    attempts: attempt,
                }));
                return Ok(attempt);
            }

            if attempt < self.poll_attempts {
                self.tx
                    .emit_notice(format!("{name} is not running yet, waiting..."));
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        self.tx.emit(AppEvent::Runtime(RuntimeEvent::NotReady {
            runtime,
            attempts: self.poll_attempts,
        }));
        Err(InstallError::RuntimeNotReady {
            runtime: name.to_string(),
            attempts: self.poll_attempts,
        }
        .into())
    }
}
