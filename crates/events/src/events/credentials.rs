use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Enrollment credential events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CredentialsEvent {
    /// Operator supplied an id/secret pair
    ExistingAccepted { id: String },

    /// Operator answered yes but left one half blank
    ExistingIncomplete,

    IssuanceStarted,

    /// The issuer returned a fresh pair. The secret is shown to the operator
    /// exactly once and never written to logs.
    Issued {
        id: String,
        secret: String,
        dashboard_url: String,
    },

    IssuanceFailed { failure: FailureContext },

    AdoptionAcknowledged { acknowledged: bool },
}
