//! Integration tests for error types

#[cfg(test)]
mod tests {
    use nodeup_errors::*;

    #[test]
    fn test_error_conversion() {
        let net_err = NetworkError::Timeout {
            url: "https://ifconfig.io/ip".into(),
        };
        let err: Error = net_err.into();
        assert!(matches!(err, Error::Network(_)));
    }

    #[test]
    fn test_error_display() {
        let err = InstallError::PortOccupied {
            port: 443,
            message: "address in use".into(),
        };
        assert_eq!(
            err.to_string(),
            "port 443 is occupied or cannot be bound: address in use"
        );
    }

    #[test]
    fn test_invalid_runtime_message_lists_vocabulary() {
        let err = InstallError::InvalidRuntimeChoice {
            input: "swarm".into(),
        };
        let message = err.to_string();
        assert!(message.contains("swarm"));
        assert!(message.contains("'docker' or 'podman'"));
    }

    #[test]
    fn test_user_facing_delegates_to_domain() {
        let err: Error = InstallError::CredentialIssuanceFailed {
            message: "HTTP error 503".into(),
        }
        .into();
        assert_eq!(err.user_code(), Some("install.issuance_failed"));
        assert!(err.user_hint().unwrap().contains("manually"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_io_error_conversion_keeps_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::io_with_path(&io_err, "/srv/node/config");
        match &err {
            Error::Io { kind, path, .. } => {
                assert_eq!(*kind, std::io::ErrorKind::PermissionDenied);
                assert_eq!(path.as_deref(), Some(std::path::Path::new("/srv/node/config")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.user_message().contains("/srv/node/config"));
    }
}
