#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for nodeup
//!
//! This crate handles the installer's two remote calls: the best-effort
//! public IP lookup and the one-shot credential issuance request.

mod client;
mod issuance;

pub use client::{NetClient, NetConfig};
pub use issuance::{request_credentials, IssuedCredentials};

use nodeup_errors::{Error, NetworkError};
use nodeup_events::{EventEmitter, EventSender};
use std::net::IpAddr;
use std::time::Duration;
use url::Url;

/// Fetch text content from a URL
///
/// # Errors
///
/// Returns an error if the URL is malformed, the HTTP request fails, the
/// server returns an error status, or the body cannot be decoded as text.
pub async fn fetch_text(
    client: &NetClient,
    url: &str,
    timeout: Option<Duration>,
    tx: &EventSender,
) -> Result<String, Error> {
    let url = parse_url(url)?;
    tx.emit_debug(format!("Fetching text from {url}"));

    let response = client.get(url.as_str(), timeout).await?;

    if !response.status().is_success() {
        return Err(NetworkError::HttpError {
            status: response.status().as_u16(),
            message: response.status().to_string(),
        }
        .into());
    }

    response
        .text()
        .await
        .map_err(|e| client::map_reqwest_error(&e, url.as_str()).into())
}

/// Look up this host's public address
///
/// Returns `None` on any failure, including a body that is not an IP address.
/// The caller falls back to an empty default.
pub async fn detect_public_ip(
    client: &NetClient,
    url: &str,
    timeout: Duration,
    tx: &EventSender,
) -> Option<IpAddr> {
    match fetch_text(client, url, Some(timeout), tx).await {
        Ok(body) => {
            let parsed = body.trim().parse::<IpAddr>().ok();
            if parsed.is_none() {
                tx.emit_debug(format!("Public IP lookup returned a non-address body from {url}"));
            }
            parsed
        }
        Err(e) => {
            tx.emit_debug(format!("Public IP lookup failed: {e}"));
            None
        }
    }
}

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL string is malformed or invalid according to RFC 3986.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| NetworkError::InvalidUrl(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        assert!(parse_url("https://ifconfig.io/ip").is_ok());
        assert!(parse_url("not a url").is_err());
    }
}
