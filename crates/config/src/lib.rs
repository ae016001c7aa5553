#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for nodeup
//!
//! Installer settings are merged from, in increasing precedence:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/nodeup/config.toml or `--config`)
//! - Environment variables
//! - CLI flags (applied by the binary)
//!
//! These settings describe how the installer runs. The record that gets
//! rendered into the node's configuration is `nodeup_types::InstallationConfig`.

pub mod build_info;
pub mod constants;

pub use build_info::component_versions;

use nodeup_errors::{ConfigError, Error};
use nodeup_types::ColorChoice;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneralConfig {
    #[serde(default)]
    pub color: ColorChoice,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Directory receiving `config/` and the compose file. Defaults to the
    /// current directory.
    pub work_dir: Option<PathBuf>,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_issuance_url")]
    pub issuance_url: String,
    #[serde(default = "default_public_ip_url")]
    pub public_ip_url: String,
    #[serde(default = "default_public_ip_timeout")]
    pub public_ip_timeout: u64, // seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
}

/// Runtime readiness polling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

/// Dashboard the operator adopts the node in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_dashboard_url")]
    pub url: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            issuance_url: default_issuance_url(),
            public_ip_url: default_public_ip_url(),
            public_ip_timeout: default_public_ip_timeout(),
            timeout: default_timeout(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            poll_attempts: default_poll_attempts(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            url: default_dashboard_url(),
        }
    }
}

// Default value functions for serde
fn default_issuance_url() -> String {
    constants::DEFAULT_ISSUANCE_URL.to_string()
}

fn default_public_ip_url() -> String {
    constants::DEFAULT_PUBLIC_IP_URL.to_string()
}

fn default_public_ip_timeout() -> u64 {
    10
}

fn default_timeout() -> u64 {
    30
}

fn default_poll_attempts() -> u32 {
    5
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_dashboard_url() -> String {
    constants::DEFAULT_DASHBOARD_URL.to_string()
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("nodeup").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the default file exists but cannot be parsed.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "loading installer settings");
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: &Option<PathBuf>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds a value that cannot
    /// be parsed into the expected type.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(dir) = std::env::var("NODEUP_WORK_DIR") {
            if !dir.trim().is_empty() {
                self.paths.work_dir = Some(PathBuf::from(dir));
            }
        }

        if let Ok(url) = std::env::var("NODEUP_ISSUANCE_URL") {
            self.network.issuance_url = url;
        }

        if let Ok(url) = std::env::var("NODEUP_PUBLIC_IP_URL") {
            self.network.public_ip_url = url;
        }

        if let Ok(attempts) = std::env::var("NODEUP_POLL_ATTEMPTS") {
            self.runtime.poll_attempts =
                attempts.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "NODEUP_POLL_ATTEMPTS".to_string(),
                    value: attempts,
                })?;
        }

        if let Ok(interval) = std::env::var("NODEUP_POLL_INTERVAL_SECS") {
            self.runtime.poll_interval_secs =
                interval.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "NODEUP_POLL_INTERVAL_SECS".to_string(),
                    value: interval,
                })?;
        }

        if let Ok(color) = std::env::var("NODEUP_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "NODEUP_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        self.validate()
    }

    /// Validate cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns an error if the poll budget is zero or an endpoint is blank.
    pub fn validate(&self) -> Result<(), Error> {
        if self.runtime.poll_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "runtime.poll_attempts".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.network.issuance_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "network.issuance_url".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Working directory (with default)
    #[must_use]
    pub fn work_dir(&self) -> PathBuf {
        self.paths
            .work_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Delay between runtime readiness checks
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.runtime.poll_interval_secs)
    }
}
