//! Host collaborators wired from the loaded settings

use crate::error::CliError;
use nodeup_config::Config;
use nodeup_events::EventSender;
use nodeup_install::{HttpRemote, Services, SystemProbe, SystemRuntime};
use nodeup_net::{NetClient, NetConfig};
use nodeup_platform::Platform;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Real implementations of every installer seam
pub struct SystemSetup {
    platform: Arc<Platform>,
    probe: SystemProbe,
    runtime: SystemRuntime,
    remote: HttpRemote,
}

impl SystemSetup {
    pub fn new(config: &Config, event_sender: &EventSender) -> Result<Self, CliError> {
        let platform = Arc::new(Platform::current());
        let ctx = platform.create_context(Some(event_sender.clone()));

        let net = NetClient::new(NetConfig {
            timeout: Duration::from_secs(config.network.timeout),
            ..NetConfig::default()
        })?;
        let remote = HttpRemote::new(
            net,
            config.network.issuance_url.clone(),
            config.network.public_ip_url.clone(),
            Duration::from_secs(config.network.public_ip_timeout),
            event_sender.clone(),
        );
        debug!(issuance_url = remote.issuance_url(), "network client ready");

        Ok(Self {
            probe: SystemProbe::new(platform.clone(), ctx.clone()),
            runtime: SystemRuntime::new(platform.clone(), ctx),
            platform,
            remote,
        })
    }

    pub fn probe(&self) -> &SystemProbe {
        &self.probe
    }

    pub fn services(&self) -> Services<'_> {
        Services {
            probe: &self.probe,
            control: &self.runtime,
            issuer: &self.remote,
            ip_source: &self.remote,
            platform: self.platform.as_ref(),
        }
    }
}
