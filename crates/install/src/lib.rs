#![warn(clippy::pedantic)]
#![deny(clippy::all)]

//! First-run installation of a Pangolin remote node
//!
//! This crate sequences host probing, credential acquisition, configuration
//! rendering and container runtime bring-up. Every host side effect sits
//! behind a trait (`HostProbe`, `RuntimeControl`, `CredentialIssuer`,
//! `PublicIpSource`, `Prompter`) so the flow can run against fakes.

mod bootstrap;
mod context;
mod credentials;
mod materialize;
mod orchestrator;
mod probe;
mod prompt;
mod remote;

#[cfg(test)]
mod testing;

pub use bootstrap::{
    compose_invocation, BootstrapState, DistroFamily, RuntimeBootstrapper, RuntimeControl,
    SystemRuntime,
};
pub use context::InstallContext;
pub use credentials::CredentialAcquirer;
pub use materialize::{
    include_entry, is_hidden_artifact, ConfigMaterializer, MaterializeReport, TemplateBundle,
    TemplateEntry,
};
pub use orchestrator::{InstallOutcome, Orchestrator, Services};
pub use probe::{probe_host, HostProbe, HostReport, RuntimeReport, SystemProbe};
pub use prompt::Prompter;
pub use remote::{CredentialIssuer, HttpRemote, PublicIpSource};

// Re-export EventSender for callers building an InstallContext
pub use nodeup_events::EventSender;
