//! First-run installation flow

use nodeup_config::constants;
use nodeup_errors::{Error, InstallError};
use nodeup_events::{
    AppEvent, ContainerStep, ContainersEvent, EventEmitter, FailureContext, InstallEvent,
    RuntimeEvent,
};
use nodeup_platform::{Platform, PlatformContext};
use nodeup_types::{ContainerRuntime, Credentials, InstallationConfig};

use crate::bootstrap::{compose_invocation, RuntimeBootstrapper, RuntimeControl};
use crate::context::InstallContext;
use crate::credentials::CredentialAcquirer;
use crate::materialize::{ConfigMaterializer, TemplateBundle};
use crate::probe::HostProbe;
use crate::prompt::Prompter;
use crate::remote::{CredentialIssuer, PublicIpSource};

const DOMAIN_PROMPT: &str =
    "The public addressable IP address for this node or a domain pointing to it";
const IPV6_PROMPT: &str = "Is your server IPv6 capable?";
const CONTAINERS_PROMPT: &str = "Would you like to install and start the containers?";
const RUNTIME_PROMPT: &str = "Would you like to run Pangolin as Docker or Podman containers?";

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// A configuration directory already existed; nothing was touched
    AlreadyInstalled,
    /// Configuration written, containers not started
    Configured,
    /// Configuration written and containers brought up
    Started,
}

impl InstallOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyInstalled => "already_installed",
            Self::Configured => "configured",
            Self::Started => "started",
        }
    }
}

/// Host collaborators the flow drives
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub probe: &'a dyn HostProbe,
    pub control: &'a dyn RuntimeControl,
    pub issuer: &'a dyn CredentialIssuer,
    pub ip_source: &'a dyn PublicIpSource,
    pub platform: &'a Platform,
}

/// Sequences probing, input collection, rendering and container bring-up
pub struct Orchestrator<'a> {
    context: InstallContext,
    services: Services<'a>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(context: InstallContext, services: Services<'a>) -> Self {
        Self { context, services }
    }

    fn platform_context(&self) -> PlatformContext {
        self.services
            .platform
            .create_context(Some(self.context.event_sender.clone()))
    }

    /// Run the installer to completion.
    ///
    /// # Errors
    ///
    /// Any fatal condition stops the flow and is returned. State written
    /// before the failure stays on disk.
    pub async fn run(&self, prompter: &mut dyn Prompter) -> Result<InstallOutcome, Error> {
        match self.run_inner(prompter).await {
            Ok(outcome) => {
                self.context
                    .emit(AppEvent::Install(InstallEvent::Completed {
                        outcome: outcome.as_str().to_string(),
                    }));
                Ok(outcome)
            }
            Err(e) => {
                self.context.emit(AppEvent::Install(InstallEvent::Failed {
                    failure: FailureContext::from_error(&e),
                }));
                Err(e)
            }
        }
    }

    async fn run_inner(&self, prompter: &mut dyn Prompter) -> Result<InstallOutcome, Error> {
        let probe = self.services.probe;
        let root = probe.is_root().await;
        self.context.emit(AppEvent::Install(InstallEvent::Started {
            work_dir: self.context.work_dir().display().to_string(),
            root,
        }));

        // Binding low ports needs root; without it the check would always fail
        if root {
            for port in constants::REQUIRED_PORTS {
                probe.check_port_available(port).await?;
            }
        } else {
            self.context
                .emit(AppEvent::Install(InstallEvent::PortCheckSkipped));
        }

        let marker = self.context.marker_path();
        let pctx = self.platform_context();
        if self.services.platform.filesystem().exists(&pctx, &marker).await {
            self.context
                .emit_notice("Looks like you already installed a Pangolin node!");
            self.context
                .emit(AppEvent::Install(InstallEvent::AlreadyInstalled {
                    marker: marker.display().to_string(),
                }));
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        let acquirer = CredentialAcquirer::new(
            self.services.issuer,
            self.context.dashboard_url.clone(),
            self.context.event_sender.clone(),
        );

        let mut config = InstallationConfig::new(self.context.versions.clone());
        let existing = self.collect_input(&mut config, &acquirer, prompter).await?;

        self.context.emit_section("Generating Configuration Files");
        config.credentials = Some(acquirer.acquire(existing, prompter).await?);
        self.write_configuration(&config, pctx).await?;

        self.context.emit_section("Starting installation");
        if !prompter.read_bool(CONTAINERS_PROMPT, true)? {
            self.context
                .emit(AppEvent::Install(InstallEvent::ContainersDeclined));
            return Ok(InstallOutcome::Configured);
        }

        let choice = prompter.read_string(RUNTIME_PROMPT, ContainerRuntime::Docker.binary())?;
        config.runtime = Some(choice.parse::<ContainerRuntime>()?);
        self.bring_up(&config, prompter).await?;

        Ok(InstallOutcome::Started)
    }

    /// Fill the record from operator answers. Returns any credentials the
    /// operator already holds.
    async fn collect_input(
        &self,
        config: &mut InstallationConfig,
        acquirer: &CredentialAcquirer<'_>,
        prompter: &mut dyn Prompter,
    ) -> Result<Option<Credentials>, Error> {
        self.context.emit_section("Basic Configuration");

        let existing = match &self.context.preset_credentials {
            Some(credentials) => Some(credentials.clone()),
            None => acquirer.collect_existing(prompter)?,
        };

        let detected = self.services.ip_source.public_ip().await;
        if let Some(ip) = detected {
            self.context.emit_notice(format!("Detected public IP: {ip}"));
            self.context
                .emit(AppEvent::Install(InstallEvent::PublicIpDetected {
                    ip: ip.to_string(),
                }));
        }
        let default_domain = detected.map(|ip| ip.to_string()).unwrap_or_default();
        config.dashboard_domain = prompter
            .read_string(DOMAIN_PROMPT, &default_domain)?
            .trim()
            .to_string();

        self.context.emit_section("Advanced Configuration");
        config.enable_ipv6 = prompter.read_bool(IPV6_PROMPT, true)?;

        if !config.has_dashboard_domain() {
            return Err(InstallError::MissingDashboardDomain.into());
        }

        self.context
            .emit(AppEvent::Install(InstallEvent::InputCollected {
                dashboard_domain: config.dashboard_domain.clone(),
                enable_ipv6: config.enable_ipv6,
                has_credentials: existing.is_some(),
            }));
        Ok(existing)
    }

    async fn write_configuration(
        &self,
        config: &InstallationConfig,
        pctx: PlatformContext,
    ) -> Result<(), Error> {
        let bundle = match &self.context.templates {
            Some(dir) => TemplateBundle::from_dir(dir)?,
            None => TemplateBundle::embedded(),
        };

        let materializer =
            ConfigMaterializer::new(self.services.platform, pctx, self.context.config_dir());
        materializer
            .materialize(config, &bundle, &self.context.dashboard_url)
            .await?;
        materializer
            .relocate_compose(&self.context.compose_path())
            .await?;

        self.context
            .emit_notice("Configuration files created successfully!");
        self.context
            .emit(AppEvent::Install(InstallEvent::ConfigurationWritten {
                config_dir: self.context.config_dir().display().to_string(),
            }));
        Ok(())
    }

    async fn bring_up(
        &self,
        config: &InstallationConfig,
        prompter: &mut dyn Prompter,
    ) -> Result<(), Error> {
        let runtime = config.runtime.ok_or(InstallError::RuntimeUndefined)?;
        self.context
            .emit(AppEvent::Runtime(RuntimeEvent::Selected { runtime }));

        let bootstrapper = RuntimeBootstrapper::new(
            self.services.probe,
            self.services.control,
            self.context.event_sender.clone(),
        )
        .with_polling(self.context.poll_attempts, self.context.poll_interval)
        .with_auto_install(self.context.auto_install_supported);

        bootstrapper.preflight(runtime, prompter).await?;
        bootstrapper.bootstrap(runtime, prompter).await?;

        for step in [ContainerStep::Pull, ContainerStep::Up] {
            self.compose_step(runtime, step).await?;
        }
        Ok(())
    }

    async fn compose_step(&self, runtime: ContainerRuntime, step: ContainerStep) -> Result<(), Error> {
        let compose_file = self.context.compose_path();
        // Display form only; the control decides between the plugin and standalone binary
        let command = compose_invocation(runtime, true, step, &compose_file).display();
        self.context
            .emit(AppEvent::Containers(ContainersEvent::StepStarted {
                runtime,
                step,
                command,
            }));

        match self
            .services
            .control
            .compose(runtime, step, &compose_file)
            .await
        {
            Ok(()) => {
                self.context
                    .emit(AppEvent::Containers(ContainersEvent::StepCompleted {
                        runtime,
                        step,
                    }));
                Ok(())
            }
            Err(e) => {
                self.context
                    .emit(AppEvent::Containers(ContainersEvent::StepFailed {
                        runtime,
                        step,
                        failure: FailureContext::from_error(&e),
                    }));
                Err(e)
            }
        }
    }
}
