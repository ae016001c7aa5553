//! The installation record and its parts

use serde::{Deserialize, Serialize};

use crate::ContainerRuntime;

/// Pinned versions of the stack components.
///
/// Injected at build time and never changed after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentVersions {
    pub pangolin: String,
    pub gerbil: String,
    pub badger: String,
}

/// Enrollment identity of a remote node.
///
/// Both halves are always non-empty; a half-populated pair cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    id: String,
    secret: String,
}

impl Credentials {
    /// Build credentials from operator or issuer supplied parts.
    ///
    /// Returns `None` unless both parts are non-empty after trimming.
    #[must_use]
    pub fn from_parts(id: impl Into<String>, secret: impl Into<String>) -> Option<Self> {
        let id = id.into().trim().to_string();
        let secret = secret.into().trim().to_string();
        if id.is_empty() || secret.is_empty() {
            return None;
        }
        Some(Self { id, secret })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

/// Mutable record threaded through a first-run installation.
///
/// Its only durable projection is the rendered configuration directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationConfig {
    /// `None` until the operator picks a runtime.
    pub runtime: Option<ContainerRuntime>,
    pub versions: ComponentVersions,
    pub dashboard_domain: String,
    pub enable_ipv6: bool,
    /// Placeholder for the reverse proxy bouncer key; empty on the active path.
    pub traefik_bouncer_key: String,
    /// Always false on the active path.
    pub install_security_addon: bool,
    pub credentials: Option<Credentials>,
}

impl InstallationConfig {
    /// Create an empty record carrying the build's component versions
    #[must_use]
    pub fn new(versions: ComponentVersions) -> Self {
        Self {
            runtime: None,
            versions,
            dashboard_domain: String::new(),
            enable_ipv6: true,
            traefik_bouncer_key: String::new(),
            install_security_addon: false,
            credentials: None,
        }
    }

    /// Whether the record carries a usable dashboard domain
    #[must_use]
    pub fn has_dashboard_domain(&self) -> bool {
        !self.dashboard_domain.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn versions() -> ComponentVersions {
        ComponentVersions {
            pangolin: "1.10.0".into(),
            gerbil: "1.2.1".into(),
            badger: "v1.2.0".into(),
        }
    }

    #[test]
    fn test_new_record_is_unresolved() {
        let config = InstallationConfig::new(versions());
        assert!(config.runtime.is_none());
        assert!(config.credentials.is_none());
        assert!(!config.install_security_addon);
        assert!(!config.has_dashboard_domain());
    }

    #[test]
    fn test_whitespace_domain_is_missing() {
        let mut config = InstallationConfig::new(versions());
        config.dashboard_domain = "   ".into();
        assert!(!config.has_dashboard_domain());
        config.dashboard_domain = "node.example.com".into();
        assert!(config.has_dashboard_domain());
    }

    #[test]
    fn test_credentials_trim_parts() {
        let creds = Credentials::from_parts("  abc123 ", "\tsecret\n").unwrap();
        assert_eq!(creds.id(), "abc123");
        assert_eq!(creds.secret(), "secret");
    }

    proptest! {
        #[test]
        fn credentials_are_never_half_populated(id in ".{0,12}", secret in ".{0,12}") {
            match Credentials::from_parts(id.clone(), secret.clone()) {
                Some(creds) => {
                    prop_assert!(!creds.id().is_empty());
                    prop_assert!(!creds.secret().is_empty());
                }
                None => {
                    prop_assert!(id.trim().is_empty() || secret.trim().is_empty());
                }
            }
        }
    }
}
