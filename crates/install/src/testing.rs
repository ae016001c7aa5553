//! In-memory collaborators for unit tests

use async_trait::async_trait;
use nodeup_errors::{Error, InstallError, NetworkError};
use nodeup_events::ContainerStep;
use nodeup_types::{ContainerRuntime, Credentials};
use std::collections::VecDeque;
use std::net::IpAddr;
use std::path::Path;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::bootstrap::RuntimeControl;
use crate::probe::HostProbe;
use crate::prompt::Prompter;
use crate::remote::{CredentialIssuer, PublicIpSource};

/// One scripted operator answer
#[derive(Debug, Clone)]
pub enum Answer {
    Bool(bool),
    Text(String),
    /// Accept whatever default the prompt offers
    Default,
}

/// Prompter replaying a fixed script; panics on an unscripted prompt
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    prompts: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    /// A prompter that must never be asked anything
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn asked(&self) -> usize {
        self.prompts.len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.clone()
    }

    fn next(&mut self, prompt: &str) -> Answer {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected prompt: {prompt}"))
    }
}

impl Prompter for ScriptedPrompter {
    fn read_string(&mut self, prompt: &str, default: &str) -> Result<String, Error> {
        match self.next(prompt) {
            Answer::Text(text) => Ok(text),
            Answer::Default => Ok(default.to_string()),
            Answer::Bool(b) => panic!("expected text for {prompt:?}, scripted {b}"),
        }
    }

    fn read_bool(&mut self, prompt: &str, default: bool) -> Result<bool, Error> {
        match self.next(prompt) {
            Answer::Bool(b) => Ok(b),
            Answer::Default => Ok(default),
            Answer::Text(text) => panic!("expected yes/no for {prompt:?}, scripted {text:?}"),
        }
    }
}

/// Issuer returning a fixed result and counting calls
pub struct FakeIssuer {
    credentials: Option<Credentials>,
    calls: AtomicUsize,
}

impl FakeIssuer {
    pub fn succeeding(credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            credentials: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialIssuer for FakeIssuer {
    async fn issue(&self) -> Result<Credentials, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.credentials.clone().ok_or_else(|| {
            NetworkError::HttpError {
                status: 503,
                message: "service unavailable".to_string(),
            }
            .into()
        })
    }
}

pub struct FakeIpSource(pub Option<IpAddr>);

#[async_trait]
impl PublicIpSource for FakeIpSource {
    async fn public_ip(&self) -> Option<IpAddr> {
        self.0
    }
}

/// Configurable host probe.
///
/// By default nothing is installed, nothing ever runs, every port is free,
/// the user is in the runtime group and is not root.
pub struct FakeProbe {
    installed: Vec<ContainerRuntime>,
    ready_after: Option<u32>,
    busy_ports: Vec<u16>,
    in_group: bool,
    sysctl: bool,
    root: bool,
    running_checks: AtomicU32,
    port_checks: AtomicU32,
}

impl Default for FakeProbe {
    fn default() -> Self {
        Self {
            installed: Vec::new(),
            ready_after: None,
            busy_ports: Vec::new(),
            in_group: true,
            sysctl: false,
            root: false,
            running_checks: AtomicU32::new(0),
            port_checks: AtomicU32::new(0),
        }
    }
}

impl FakeProbe {
    pub fn installed(mut self, runtime: ContainerRuntime) -> Self {
        self.installed.push(runtime);
        self
    }

    /// The runtime reports running from the `n`th readiness check on
    pub fn ready_after(mut self, n: u32) -> Self {
        self.ready_after = Some(n);
        self
    }

    pub fn busy_port(mut self, port: u16) -> Self {
        self.busy_ports.push(port);
        self
    }

    pub fn in_group(mut self, member: bool) -> Self {
        self.in_group = member;
        self
    }

    pub fn sysctl(mut self, configured: bool) -> Self {
        self.sysctl = configured;
        self
    }

    pub fn root(mut self, root: bool) -> Self {
        self.root = root;
        self
    }

    pub fn running_checks(&self) -> u32 {
        self.running_checks.load(Ordering::SeqCst)
    }

    pub fn port_checks(&self) -> u32 {
        self.port_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostProbe for FakeProbe {
    async fn is_runtime_installed(&self, runtime: ContainerRuntime) -> bool {
        self.installed.contains(&runtime)
    }

    async fn is_runtime_running(&self, _runtime: ContainerRuntime) -> bool {
        let check = self.running_checks.fetch_add(1, Ordering::SeqCst) + 1;
        self.ready_after.is_some_and(|n| check >= n)
    }

    async fn check_port_available(&self, port: u16) -> Result<(), InstallError> {
        self.port_checks.fetch_add(1, Ordering::SeqCst);
        if self.busy_ports.contains(&port) {
            return Err(InstallError::PortOccupied {
                port,
                message: "address already in use".to_string(),
            });
        }
        Ok(())
    }

    async fn is_user_in_privileged_group(&self, runtime: ContainerRuntime) -> bool {
        runtime.privileged_group().is_none() || self.in_group
    }

    async fn is_unprivileged_port_sysctl_set(&self) -> bool {
        self.sysctl
    }

    async fn is_root(&self) -> bool {
        self.root
    }
}

/// Runtime control recording each call as a short string
#[derive(Default)]
pub struct FakeControl {
    fail_install: bool,
    fail_start: bool,
    fail_sysctl: bool,
    fail_step: Option<ContainerStep>,
    calls: Mutex<Vec<String>>,
}

impl FakeControl {
    pub fn failing_install(mut self) -> Self {
        self.fail_install = true;
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn failing_sysctl(mut self) -> Self {
        self.fail_sysctl = true;
        self
    }

    pub fn failing_step(mut self, step: ContainerStep) -> Self {
        self.fail_step = Some(step);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl RuntimeControl for FakeControl {
    async fn install(&self, runtime: ContainerRuntime) -> Result<(), Error> {
        self.record(format!("install {runtime}"));
        if self.fail_install {
            return Err(InstallError::RuntimeInstallFailed {
                runtime: runtime.display_name().to_string(),
                message: "package manager exited with 100".to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn start_service(&self, runtime: ContainerRuntime) -> Result<(), Error> {
        self.record(format!("start {runtime}"));
        if self.fail_start {
            return Err(Error::internal("systemctl unavailable"));
        }
        Ok(())
    }

    async fn enable_unprivileged_ports(&self) -> Result<(), Error> {
        self.record("sysctl".to_string());
        if self.fail_sysctl {
            return Err(InstallError::SysctlFailed {
                message: "sysctl -p exited with 255".to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn compose(
        &self,
        runtime: ContainerRuntime,
        step: ContainerStep,
        compose_file: &Path,
    ) -> Result<(), Error> {
        self.record(format!(
            "{} {runtime} {}",
            step.as_str(),
            compose_file.display()
        ));
        if self.fail_step == Some(step) {
            return Err(InstallError::ContainerStepFailed {
                step: step.as_str().to_string(),
                message: "exit status 1".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
