//! Remote collaborators: credential issuer and public IP source

use async_trait::async_trait;
use nodeup_errors::{Error, InstallError};
use nodeup_events::EventSender;
use nodeup_net::NetClient;
use nodeup_types::Credentials;
use std::net::IpAddr;
use std::time::Duration;

/// Issues a fresh enrollment identity for this node
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    /// Request a new id/secret pair. Called at most once per run.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is unreachable or returns an unusable
    /// pair.
    async fn issue(&self) -> Result<Credentials, Error>;
}

/// Best-effort lookup of this host's public address
#[async_trait]
pub trait PublicIpSource: Send + Sync {
    async fn public_ip(&self) -> Option<IpAddr>;
}

/// HTTP-backed issuer and IP source
pub struct HttpRemote {
    client: NetClient,
    issuance_url: String,
    public_ip_url: String,
    public_ip_timeout: Duration,
    tx: EventSender,
}

impl HttpRemote {
    pub fn new(
        client: NetClient,
        issuance_url: impl Into<String>,
        public_ip_url: impl Into<String>,
        public_ip_timeout: Duration,
        tx: EventSender,
    ) -> Self {
        Self {
            client,
            issuance_url: issuance_url.into(),
            public_ip_url: public_ip_url.into(),
            public_ip_timeout,
            tx,
        }
    }

    #[must_use]
    pub fn issuance_url(&self) -> &str {
        &self.issuance_url
    }
}

#[async_trait]
impl CredentialIssuer for HttpRemote {
    async fn issue(&self) -> Result<Credentials, Error> {
        let issued =
            nodeup_net::request_credentials(&self.client, &self.issuance_url, &self.tx).await?;

        Credentials::from_parts(issued.remote_exit_node_id, issued.secret).ok_or_else(|| {
            InstallError::CredentialIssuanceFailed {
                message: "issuer returned an empty id or secret".to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl PublicIpSource for HttpRemote {
    async fn public_ip(&self) -> Option<IpAddr> {
        nodeup_net::detect_public_ip(
            &self.client,
            &self.public_ip_url,
            self.public_ip_timeout,
            &self.tx,
        )
        .await
    }
}
