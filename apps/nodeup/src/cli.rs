//! Command line interface definition

use clap::{Args, Parser, Subcommand};
use nodeup_types::ColorChoice;
use std::path::PathBuf;

/// nodeup - Installer for Pangolin remote nodes
#[derive(Parser)]
#[command(name = "nodeup")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Installer for Pangolin remote nodes")]
#[command(long_about = None)]
pub struct Cli {
    /// Defaults to `install` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub install: InstallArgs,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Args)]
pub struct GlobalArgs {
    /// Output the probe report in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to config/logs/
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory receiving config/ and docker-compose.yml
    #[arg(long, global = true, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,
}

/// Options for a first-run installation
#[derive(Args, Clone, Default)]
pub struct InstallArgs {
    /// Render templates from this directory instead of the built-in set
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Node ID issued by the dashboard
    #[arg(long, env = "NODEUP_NODE_ID", value_name = "ID")]
    pub node_id: Option<String>,

    /// Node secret issued by the dashboard
    #[arg(long, env = "NODEUP_NODE_SECRET", hide_env_values = true, value_name = "SECRET")]
    pub node_secret: Option<String>,
}

impl InstallArgs {
    /// Fill options the subcommand left unset from those given before it
    #[must_use]
    pub fn or(self, outer: &InstallArgs) -> Self {
        Self {
            templates: self.templates.or_else(|| outer.templates.clone()),
            node_id: self.node_id.or_else(|| outer.node_id.clone()),
            node_secret: self.node_secret.or_else(|| outer.node_secret.clone()),
        }
    }
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Configure this host as a remote node and start its containers
    Install(InstallArgs),

    /// Report host readiness without changing anything
    Probe,
}
