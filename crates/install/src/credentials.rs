//! Enrollment credential acquisition

use nodeup_errors::{Error, InstallError};
use nodeup_events::{AppEvent, CredentialsEvent, EventEmitter, EventSender, FailureContext};
use nodeup_types::Credentials;

use crate::prompt::Prompter;
use crate::remote::CredentialIssuer;

const EXISTING_PROMPT: &str =
    "Do you already have credentials from the dashboard? If not, we will create them later";
const ADOPTION_PROMPT: &str = "Have you adopted your node?";

/// Obtains or accepts the node's id/secret pair
pub struct CredentialAcquirer<'a> {
    issuer: &'a dyn CredentialIssuer,
    dashboard_url: String,
    tx: EventSender,
}

impl<'a> CredentialAcquirer<'a> {
    pub fn new(
        issuer: &'a dyn CredentialIssuer,
        dashboard_url: impl Into<String>,
        tx: EventSender,
    ) -> Self {
        Self {
            issuer,
            dashboard_url: dashboard_url.into(),
            tx,
        }
    }

    /// Ask whether the operator already holds credentials and read them.
    ///
    /// The values are not validated remotely. A pair with either half blank
    /// is discarded so issuance runs later.
    ///
    /// # Errors
    ///
    /// Returns an error if the console cannot be read.
    pub fn collect_existing(
        &self,
        prompter: &mut dyn Prompter,
    ) -> Result<Option<Credentials>, Error> {
        if !prompter.read_bool(EXISTING_PROMPT, false)? {
            return Ok(None);
        }

        let id = prompter.read_string("Enter your ID", "")?;
        let secret = prompter.read_string("Enter your secret", "")?;

        let credentials = Credentials::from_parts(id, secret);
        if credentials.is_none() {
            self.tx
                .emit(AppEvent::Credentials(CredentialsEvent::ExistingIncomplete));
        }
        Ok(credentials)
    }

    /// Return `existing` unchanged, or issue a fresh pair.
    ///
    /// Issuance happens once. On success the pair is shown to the operator,
    /// who must acknowledge adopting the node in the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `CredentialIssuanceFailed` if the issuer fails, or an error if
    /// the console cannot be read.
    pub async fn acquire(
        &self,
        existing: Option<Credentials>,
        prompter: &mut dyn Prompter,
    ) -> Result<Credentials, Error> {
        if let Some(credentials) = existing {
            self.tx
                .emit(AppEvent::Credentials(CredentialsEvent::ExistingAccepted {
                    id: credentials.id().to_string(),
                }));
            return Ok(credentials);
        }

        self.tx
            .emit(AppEvent::Credentials(CredentialsEvent::IssuanceStarted));

        let credentials = match self.issuer.issue().await {
            Ok(credentials) => credentials,
            Err(e) => {
                let error = InstallError::CredentialIssuanceFailed {
                    message: e.to_string(),
                };
                self.tx
                    .emit(AppEvent::Credentials(CredentialsEvent::IssuanceFailed {
                        failure: FailureContext::from_error(&error),
                    }));
                return Err(error.into());
            }
        };

        self.tx.emit(AppEvent::Credentials(CredentialsEvent::Issued {
            id: credentials.id().to_string(),
            secret: credentials.secret().to_string(),
            dashboard_url: self.dashboard_url.clone(),
        }));

        let acknowledged = prompter.read_bool(ADOPTION_PROMPT, true)?;
        self.tx.emit(AppEvent::Credentials(
            CredentialsEvent::AdoptionAcknowledged { acknowledged },
        ));

        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Answer, FakeIssuer, ScriptedPrompter};

    fn creds(id: &str, secret: &str) -> Credentials {
        Credentials::from_parts(id, secret).unwrap()
    }

    #[test]
    fn test_collect_existing_declined() {
        let issuer = FakeIssuer::succeeding(creds("id", "secret"));
        let (tx, _rx) = nodeup_events::channel();
        let acquirer = CredentialAcquirer::new(&issuer, "https://app.pangolin.net", tx);
        let mut prompter = ScriptedPrompter::new([Answer::Bool(false)]);

        assert!(acquirer.collect_existing(&mut prompter).unwrap().is_none());
        assert_eq!(prompter.asked(), 1);
    }

    #[test]
    fn test_half_populated_input_is_discarded() {
        let issuer = FakeIssuer::succeeding(creds("id", "secret"));
        let (tx, rx) = nodeup_events::channel();
        let acquirer = CredentialAcquirer::new(&issuer, "https://app.pangolin.net", tx);
        let mut prompter = ScriptedPrompter::new([
            Answer::Bool(true),
            Answer::Text("node-abc".into()),
            Answer::Text(String::new()),
        ]);

        assert!(acquirer.collect_existing(&mut prompter).unwrap().is_none());
        assert!(rx.try_iter().any(|m| matches!(
            m.event,
            AppEvent::Credentials(CredentialsEvent::ExistingIncomplete)
        )));
    }

    #[tokio::test]
    async fn test_existing_credentials_skip_issuer() {
        let issuer = FakeIssuer::succeeding(creds("fresh", "pair"));
        let (tx, _rx) = nodeup_events::channel();
        let acquirer = CredentialAcquirer::new(&issuer, "https://app.pangolin.net", tx);
        let mut prompter = ScriptedPrompter::silent();

        let result = acquirer
            .acquire(Some(creds("mine", "s3cret")), &mut prompter)
            .await
            .unwrap();

        assert_eq!(result.id(), "mine");
        assert_eq!(issuer.calls(), 0);
        assert_eq!(prompter.asked(), 0);
    }

    #[tokio::test]
    async fn test_issued_credentials_require_adoption_prompt() {
        let issuer = FakeIssuer::succeeding(creds("fresh", "pair"));
        let (tx, rx) = nodeup_events::channel();
        let acquirer = CredentialAcquirer::new(&issuer, "https://app.pangolin.net", tx);
        let mut prompter = ScriptedPrompter::new([Answer::Bool(true)]);

        let result = acquirer.acquire(None, &mut prompter).await.unwrap();

        assert_eq!((result.id(), result.secret()), ("fresh", "pair"));
        assert_eq!(issuer.calls(), 1);
        assert_eq!(prompter.prompts(), vec![ADOPTION_PROMPT.to_string()]);
        assert!(rx.try_iter().any(|m| matches!(
            m.event,
            AppEvent::Credentials(CredentialsEvent::Issued { ref id, .. }) if id == "fresh"
        )));
    }

    #[tokio::test]
    async fn test_issuer_failure_is_fatal_and_not_retried() {
        let issuer = FakeIssuer::failing();
        let (tx, _rx) = nodeup_events::channel();
        let acquirer = CredentialAcquirer::new(&issuer, "https://app.pangolin.net", tx);
        let mut prompter = ScriptedPrompter::silent();

        let err = acquirer.acquire(None, &mut prompter).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Install(InstallError::CredentialIssuanceFailed { .. })
        ));
        assert_eq!(issuer.calls(), 1);
        assert_eq!(prompter.asked(), 0);
    }
}
