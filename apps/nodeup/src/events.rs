//! Terminal rendering of installer events

use console::style;
use nodeup_events::{
    AppEvent, ContainersEvent, CredentialsEvent, EventMessage, EventSink, GeneralEvent,
    InstallEvent, MaterializeEvent, RuntimeEvent,
};

use crate::logging::log_event_with_tracing;

/// Event sink printing operator-facing lines and mirroring every event into
/// the log.
///
/// Runs on the emitting task, so a line is on screen before the next prompt.
pub struct ConsoleSink {
    debug_enabled: bool,
}

impl ConsoleSink {
    pub fn new(colors_enabled: bool, debug_enabled: bool) -> Self {
        console::set_colors_enabled(colors_enabled);
        console::set_colors_enabled_stderr(colors_enabled);
        Self { debug_enabled }
    }

    fn show_status(message: &str) {
        println!("{message}");
    }

    fn show_warning(message: &str) {
        eprintln!("{} {message}", style("Warning:").yellow().bold());
    }

    fn show_error(message: &str) {
        eprintln!("{} {message}", style("Error:").red().bold());
    }

    fn show_debug(&self, message: &str) {
        if self.debug_enabled {
            eprintln!("{}", style(message).dim());
        }
    }

    fn render(&self, event: &AppEvent) {
        match event {
            AppEvent::General(general) => self.render_general(general),
            AppEvent::Credentials(credentials) => Self::render_credentials(credentials),
            AppEvent::Runtime(runtime) => self.render_runtime(runtime),
            AppEvent::Containers(ContainersEvent::StepStarted { command, .. }) => {
                Self::show_status(&format!("{} {command}", style("==>").cyan()));
            }
            AppEvent::Materialize(MaterializeEvent::ComposeRelocated { from, to }) => {
                self.show_debug(&format!("moved {from} to {to}"));
            }
            AppEvent::Install(InstallEvent::PortCheckSkipped) => {
                self.show_debug("not running as root; skipping the port 80/443 check");
            }
            // Terminal failures are printed once by main
            AppEvent::Install(InstallEvent::Failed { .. })
            | AppEvent::Materialize(MaterializeEvent::Failed { .. })
            | AppEvent::Containers(ContainersEvent::StepFailed { .. }) => {}
            other => self.show_debug(&format!("{other:?}")),
        }
    }

    fn render_general(&self, event: &GeneralEvent) {
        match event {
            GeneralEvent::Notice { message } => Self::show_status(message),
            GeneralEvent::Section { title } => {
                Self::show_status(&format!("\n{}", style(format!("=== {title} ===")).bold()));
            }
            GeneralEvent::Warning { message } => Self::show_warning(message),
            GeneralEvent::DebugLog { message } => self.show_debug(message),
        }
    }

    fn render_credentials(event: &CredentialsEvent) {
        match event {
            CredentialsEvent::Issued {
                id,
                secret,
                dashboard_url,
            } => {
                Self::show_status("Your managed credentials have been obtained successfully.");
                Self::show_status(&format!("\tID:     {}", style(id).bold()));
                Self::show_status(&format!("\tSecret: {}", style(secret).bold()));
                Self::show_status(&format!(
                    "\nTake these to the Pangolin dashboard {dashboard_url} to adopt your node.\n"
                ));
            }
            CredentialsEvent::ExistingIncomplete => {
                Self::show_warning("ID or secret left empty; new credentials will be requested.");
            }
            _ => {}
        }
    }

    fn render_runtime(&self, event: &RuntimeEvent) {
        match event {
            RuntimeEvent::InstallStarted { runtime, method } => Self::show_status(&format!(
                "Installing {} using {method}...",
                runtime.display_name()
            )),
            RuntimeEvent::ServiceStarted { runtime } => Self::show_status(&format!(
                "{} service started successfully!",
                runtime.display_name()
            )),
            RuntimeEvent::ServiceStartFailed { runtime, failure } => Self::show_error(&format!(
                "starting {} service: {}",
                runtime.display_name(),
                failure.message
            )),
            other => self.show_debug(&format!("{other:?}")),
        }
    }
}

impl EventSink for ConsoleSink {
    fn handle(&self, message: EventMessage) {
        log_event_with_tracing(&message);
        self.render(&message.event);
    }
}
