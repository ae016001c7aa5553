//! nodeup - Installer for Pangolin remote nodes
//!
//! Collects the operator's answers, writes the node configuration and brings
//! the container stack up through the install crate.

mod cli;
mod display;
mod error;
mod events;
mod logging;
mod prompt;
mod setup;

use crate::cli::{Cli, Commands, GlobalArgs, InstallArgs};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::ConsoleSink;
use crate::prompt::DialoguerPrompter;
use crate::setup::SystemSetup;
use clap::Parser;
use nodeup_config::{constants, Config};
use nodeup_events::EventSender;
use nodeup_install::{probe_host, InstallContext, Orchestrator};
use nodeup_types::{ColorChoice, Credentials};
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

/// Normal-mode filter. The console sink is the operator surface, so the
/// binary's own event mirror only runs in debug mode.
const NORMAL_LOG_FILTER: &str =
    "warn,nodeup=off,nodeup_install=warn,nodeup_net=warn,nodeup_config=warn,nodeup_platform=warn";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    // Settings come first so the debug log can follow a configured work dir
    let loaded = load_config(&cli.global).await;
    init_tracing(&cli.global, loaded.as_ref().ok());

    let result = match loaded {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("Application error: {}", e);
        if json_mode {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        } else {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// File config, then environment, then CLI flags
async fn load_config(global: &GlobalArgs) -> Result<Config, CliError> {
    // 1. File config (or defaults)
    let mut config = Config::load_or_default(&global.config).await?;

    // 2. Environment variables
    config.merge_env()?;

    // 3. CLI flags (highest precedence)
    apply_cli_config(&mut config, global);
    Ok(config)
}

/// Main application logic
async fn run(cli: Cli, config: Config) -> Result<(), CliError> {
    info!("Starting nodeup v{}", env!("CARGO_PKG_VERSION"));

    let colors_enabled = match config.general.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stdout().features().colors_supported(),
    };
    let event_sender = EventSender::new(ConsoleSink::new(colors_enabled, cli.global.debug));
    let renderer = OutputRenderer::new(cli.global.json, colors_enabled);
    let setup = SystemSetup::new(&config, &event_sender)?;

    match cli.command {
        Some(Commands::Probe) => {
            let report = probe_host(setup.probe()).await;
            renderer.render_host_report(&report)?;
        }
        Some(Commands::Install(args)) => {
            let args = args.or(&cli.install);
            run_install(&config, &args, &setup, event_sender, &renderer).await?;
        }
        None => {
            run_install(&config, &cli.install, &setup, event_sender, &renderer).await?;
        }
    }

    info!("Command completed successfully");
    Ok(())
}

async fn run_install(
    config: &Config,
    args: &InstallArgs,
    setup: &SystemSetup,
    event_sender: EventSender,
    renderer: &OutputRenderer,
) -> Result<(), CliError> {
    let context = InstallContext::from_config(config, event_sender)
        .with_templates(args.templates.clone())
        .with_preset_credentials(preset_credentials(args)?);

    print_banner();

    let mut prompter = DialoguerPrompter::new();
    let outcome = Orchestrator::new(context, setup.services())
        .run(&mut prompter)
        .await?;

    info!(outcome = outcome.as_str(), "installer finished");
    renderer.render_outcome(outcome)?;
    Ok(())
}

/// Credentials given on the command line or through the environment
fn preset_credentials(args: &InstallArgs) -> Result<Option<Credentials>, CliError> {
    match (&args.node_id, &args.node_secret) {
        (None, None) => Ok(None),
        (Some(id), Some(secret)) => Credentials::from_parts(id.as_str(), secret.as_str())
            .map(Some)
            .ok_or_else(|| {
                CliError::InvalidArguments("--node-id and --node-secret must not be empty".to_string())
            }),
        _ => Err(CliError::InvalidArguments(
            "--node-id and --node-secret must be given together".to_string(),
        )),
    }
}

fn print_banner() {
    println!("Welcome to the Pangolin Remote Node installer!");
    println!("This installer will help you set up Pangolin on your server.");
    println!("\nPlease make sure you have the following prerequisites:");
    println!("- Open TCP ports 80 and 443 and UDP ports 51820 and 21820 on your VPS and firewall.");
    println!("\nLets get started!");
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &GlobalArgs) {
    if let Some(color) = global.color {
        config.general.color = color;
    }
    if let Some(dir) = &global.work_dir {
        config.paths.work_dir = Some(dir.clone());
    }
}

/// Where `--debug` writes its log file
fn log_dir(global: &GlobalArgs, config: Option<&Config>) -> Option<PathBuf> {
    let work_dir = match config {
        Some(config) => config.work_dir(),
        None => global
            .work_dir
            .clone()
            .or_else(|| std::env::var_os("NODEUP_WORK_DIR").map(PathBuf::from))
            .or_else(|| std::env::current_dir().ok())?,
    };
    let in_config = work_dir
        .join(constants::CONFIG_DIR_NAME)
        .join(constants::LOGS_DIR_NAME);
    if in_config.is_dir() {
        return Some(in_config);
    }
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|dir| dir.join("nodeup").join("logs"))
}

/// Initialize tracing/logging
fn init_tracing(global: &GlobalArgs, config: Option<&Config>) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || global.debug;

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        if let Some(log_dir) = log_dir(global, config) {
            if let Err(e) = std::fs::create_dir_all(&log_dir) {
                eprintln!("Warning: Failed to create log directory: {e}");
            }

            let log_file = log_dir.join(format!(
                "nodeup-{}.log",
                chrono::Utc::now().format("%Y%m%d-%H%M%S")
            ));

            match std::fs::File::create(&log_file) {
                Ok(file) => {
                    tracing_subscriber::fmt()
                        .json()
                        .with_writer(file)
                        .with_env_filter(
                            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
                                |_| tracing_subscriber::EnvFilter::new("info,nodeup=debug,nodeup_install=debug"),
                            ),
                        )
                        .init();

                    eprintln!("Debug logging enabled: {}", log_file.display());
                    return;
                }
                Err(e) => eprintln!("Warning: Failed to create log file: {e}"),
            }
        }

        // Fallback to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,nodeup=debug")),
            )
            .init();
    } else {
        // Normal mode: warnings only, on stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(NORMAL_LOG_FILTER)),
            )
            .init();
    }
}
