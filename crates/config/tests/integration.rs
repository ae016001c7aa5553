//! Integration tests for config

#[cfg(test)]
mod tests {
    use nodeup_config::*;
    use nodeup_types::ColorChoice;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for var in [
            "NODEUP_WORK_DIR",
            "NODEUP_ISSUANCE_URL",
            "NODEUP_PUBLIC_IP_URL",
            "NODEUP_POLL_ATTEMPTS",
            "NODEUP_POLL_INTERVAL_SECS",
            "NODEUP_COLOR",
        ] {
            std::env::remove_var(var);
        }
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
color = "never"

[paths]
work_dir = "/srv/node"

[network]
issuance_url = "https://issuer.internal/quick-start"

[runtime]
poll_attempts = 8
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.color, ColorChoice::Never);
        assert_eq!(config.work_dir(), PathBuf::from("/srv/node"));
        assert_eq!(config.network.issuance_url, "https://issuer.internal/quick-start");
        assert_eq!(config.network.public_ip_url, constants::DEFAULT_PUBLIC_IP_URL);
        assert_eq!(config.runtime.poll_attempts, 8);
        assert_eq!(config.runtime.poll_interval_secs, 2);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let result = Config::load_from_file(std::path::Path::new("/nonexistent/nodeup.toml")).await;
        assert!(matches!(
            result,
            Err(nodeup_errors::Error::Config(nodeup_errors::ConfigError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_zero_poll_attempts_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[runtime]\npoll_attempts = 0").unwrap();
        assert!(Config::load_from_file(temp_file.path()).await.is_err());
    }

    #[test]
    fn test_defaults_match_installer_contract() {
        let config = Config::default();
        assert_eq!(config.runtime.poll_attempts, 5);
        assert_eq!(config.poll_interval(), std::time::Duration::from_secs(2));
        assert_eq!(config.network.public_ip_timeout, 10);
        assert_eq!(config.dashboard.url, "https://app.pangolin.net");
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("NODEUP_WORK_DIR", "/opt/node");
        std::env::set_var("NODEUP_POLL_ATTEMPTS", "3");
        std::env::set_var("NODEUP_COLOR", "always");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.work_dir(), PathBuf::from("/opt/node"));
        assert_eq!(config.runtime.poll_attempts, 3);
        assert_eq!(config.general.color, ColorChoice::Always);

        clear_env();
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("NODEUP_POLL_INTERVAL_SECS", "soon");

        let mut config = Config::default();
        assert!(config.merge_env().is_err());

        clear_env();
    }
}
