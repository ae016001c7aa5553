//! Inputs and settings for one installer run

use nodeup_config::{constants, Config};
use nodeup_events::{EventEmitter, EventSender};
use nodeup_types::{ComponentVersions, Credentials};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings for one installer run
#[derive(Clone, Debug)]
pub struct InstallContext {
    /// Directory receiving `config/` and the compose file
    pub work_dir: PathBuf,
    /// Component versions injected at build time
    pub versions: ComponentVersions,
    /// Dashboard the operator adopts the node in
    pub dashboard_url: String,
    /// Readiness checks before giving up on a runtime
    pub poll_attempts: u32,
    /// Delay between readiness checks
    pub poll_interval: Duration,
    /// On-disk template tree replacing the embedded bundle
    pub templates: Option<PathBuf>,
    /// Credentials supplied up front; skips the "already have credentials" question
    pub preset_credentials: Option<Credentials>,
    /// Whether a missing Docker may be installed automatically
    pub auto_install_supported: bool,
    /// Event sender for operator output
    pub event_sender: EventSender,
}

impl InstallContext {
    /// Create a context with default settings rooted at `work_dir`
    pub fn new(work_dir: impl Into<PathBuf>, event_sender: EventSender) -> Self {
        let defaults = Config::default();
        Self {
            work_dir: work_dir.into(),
            versions: nodeup_config::component_versions(),
            dashboard_url: defaults.dashboard.url,
            poll_attempts: defaults.runtime.poll_attempts,
            poll_interval: Duration::from_secs(defaults.runtime.poll_interval_secs),
            templates: None,
            preset_credentials: None,
            auto_install_supported: cfg!(target_os = "linux"),
            event_sender,
        }
    }

    /// Build a context from loaded installer settings
    pub fn from_config(config: &Config, event_sender: EventSender) -> Self {
        Self {
            dashboard_url: config.dashboard.url.clone(),
            poll_attempts: config.runtime.poll_attempts,
            poll_interval: config.poll_interval(),
            ..Self::new(config.work_dir(), event_sender)
        }
    }

    #[must_use]
    pub fn with_templates(mut self, templates: Option<PathBuf>) -> Self {
        self.templates = templates;
        self
    }

    #[must_use]
    pub fn with_preset_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.preset_credentials = credentials;
        self
    }

    #[must_use]
    pub fn with_polling(mut self, attempts: u32, interval: Duration) -> Self {
        self.poll_attempts = attempts;
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_auto_install(mut self, supported: bool) -> Self {
        self.auto_install_supported = supported;
        self
    }

    pub fn config_dir(&self) -> PathBuf {
        self.work_dir.join(constants::CONFIG_DIR_NAME)
    }

    pub fn marker_path(&self) -> PathBuf {
        self.config_dir().join(constants::MARKER_FILE_NAME)
    }

    pub fn compose_path(&self) -> PathBuf {
        self.work_dir.join(constants::COMPOSE_FILE_NAME)
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

impl EventEmitter for InstallContext {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.event_sender)
    }
}
