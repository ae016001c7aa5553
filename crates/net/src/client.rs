//! HTTP client with a per-request timeout override

use nodeup_errors::{Error, NetworkError};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use std::time::Duration;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("nodeup/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client wrapper
///
/// Requests are sent exactly once. The installer's remote calls are either
/// best-effort (public IP) or must not be repeated (credential issuance).
#[derive(Clone)]
pub struct NetClient {
    client: Client,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::RequestFailed(e.to_string()))?;

        Ok(Self { client })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    /// Execute a GET request, optionally with a tighter timeout than the default
    ///
    /// # Errors
    ///
    /// Returns an error on timeouts, connection failures or transport errors.
    /// Non-2xx responses are returned as `Ok`.
    pub async fn get(&self, url: &str, timeout: Option<Duration>) -> Result<Response, Error> {
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        Self::send(request, url).await
    }

    /// Execute a POST request with a JSON body
    ///
    /// # Errors
    ///
    /// Returns an error on timeouts, connection failures or transport errors.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<Response, Error> {
        Self::send(self.client.post(url).json(body), url).await
    }

    async fn send(request: RequestBuilder, url: &str) -> Result<Response, Error> {
        request
            .send()
            .await
            .map_err(|e| map_reqwest_error(&e, url).into())
    }
}

pub(crate) fn map_reqwest_error(error: &reqwest::Error, url: &str) -> NetworkError {
    if error.is_timeout() {
        NetworkError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        NetworkError::ConnectionRefused(error.to_string())
    } else {
        NetworkError::RequestFailed(error.to_string())
    }
}
