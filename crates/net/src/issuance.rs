//! Remote node credential issuance

use nodeup_errors::{Error, NetworkError};
use nodeup_events::{EventEmitter, EventSender};
use serde::Deserialize;

use crate::client::{map_reqwest_error, NetClient};

/// Identity pair returned by the issuance endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedCredentials {
    pub remote_exit_node_id: String,
    pub secret: String,
}

/// The endpoint may wrap the pair in a `data` envelope
#[derive(Deserialize)]
#[serde(untagged)]
enum IssuanceResponse {
    Enveloped { data: IssuedCredentials },
    Bare(IssuedCredentials),
}

impl IssuanceResponse {
    fn into_credentials(self) -> IssuedCredentials {
        match self {
            Self::Enveloped { data } | Self::Bare(data) => data,
        }
    }
}

/// Request a fresh id/secret pair. Sent once, never retried.
///
/// # Errors
///
/// Returns an error on a malformed URL, transport failure, a non-2xx status, a body that does
/// not carry both fields, or a pair where either field is empty.
pub async fn request_credentials(
    client: &NetClient,
    url: &str,
    tx: &EventSender,
) -> Result<IssuedCredentials, Error> {
    let url = crate::parse_url(url)?;
    tx.emit_debug(format!("Requesting node credentials from {url}"));

    let response = client.post_json(url.as_str(), &serde_json::json!({})).await?;
    let status = response.status();

    if !status.is_success() {
        return Err(NetworkError::HttpError {
            status: status.as_u16(),
            message: status.to_string(),
        }
        .into());
    }

    let body = response
        .text()
        .await
        .map_err(|e| Error::from(map_reqwest_error(&e, url.as_str())))?;

    let credentials = serde_json::from_str::<IssuanceResponse>(&body)
        .map_err(|e| NetworkError::InvalidResponse {
            url: url.to_string(),
            message: e.to_string(),
        })?
        .into_credentials();

    if credentials.remote_exit_node_id.trim().is_empty() || credentials.secret.trim().is_empty() {
        return Err(NetworkError::InvalidResponse {
            url: url.to_string(),
            message: "response carried an empty id or secret".to_string(),
        }
        .into());
    }

    Ok(credentials)
}
