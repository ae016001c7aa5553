//! Integration tests for install crate

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use nodeup_errors::InstallError;
    use nodeup_events::{AppEvent, MaterializeEvent};
    use nodeup_install::*;
    use nodeup_platform::Platform;
    use nodeup_types::{ComponentVersions, ContainerRuntime, Credentials, InstallationConfig};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn record() -> InstallationConfig {
        let mut config = InstallationConfig::new(ComponentVersions {
            pangolin: "1.10.0".to_string(),
            gerbil: "1.2.1".to_string(),
            badger: "v1.2.0".to_string(),
        });
        config.dashboard_domain = "node.example.com".to_string();
        config.credentials = Credentials::from_parts("node-42", "hunter2");
        config
    }

    #[tokio::test]
    async fn test_embedded_bundle_renders_full_tree() {
        let temp = tempdir().unwrap();
        let platform = Platform::current();
        let (tx, rx) = nodeup_events::channel();
        let config_dir = temp.path().join("config");
        let materializer =
            ConfigMaterializer::new(&platform, platform.create_context(Some(tx)), &config_dir);

        let report = materializer
            .materialize(&record(), &TemplateBundle::embedded(), "https://app.pangolin.net")
            .await
            .unwrap();

        for path in [
            "config.yml",
            "docker-compose.yml",
            "traefik/traefik_config.yml",
            "traefik/dynamic_config.yml",
        ] {
            assert!(config_dir.join(path).is_file(), "{path} missing");
        }
        assert!(config_dir.join("logs").is_dir());
        assert!(!config_dir.join("crowdsec").exists());
        assert_eq!(report.skipped.len(), 2);

        let app_config = std::fs::read_to_string(config_dir.join("config.yml")).unwrap();
        assert!(app_config.contains("node-42"));
        assert!(app_config.contains("hunter2"));
        assert!(app_config.contains("https://app.pangolin.net"));
        assert!(!app_config.contains("{{"));

        let compose = std::fs::read_to_string(config_dir.join("docker-compose.yml")).unwrap();
        assert!(compose.contains("fosrl/gerbil:1.2.1"));
        assert!(compose.contains("enable_ipv6: true"));

        let rendered: Vec<String> = rx
            .try_iter()
            .filter_map(|m| match m.event {
                AppEvent::Materialize(MaterializeEvent::FileRendered { path, .. }) => Some(path),
                _ => None,
            })
            .collect();
        let mut sorted = rendered.clone();
        sorted.sort();
        assert_eq!(rendered, sorted);
    }

    #[tokio::test]
    async fn test_security_addon_renders_only_its_subtree() {
        let temp = tempdir().unwrap();
        let platform = Platform::current();
        let config_dir = temp.path().join("config");
        let materializer =
            ConfigMaterializer::new(&platform, platform.create_context(None), &config_dir);

        let mut config = record();
        config.install_security_addon = true;
        let report = materializer
            .materialize(&config, &TemplateBundle::embedded(), "https://app.pangolin.net")
            .await
            .unwrap();

        assert!(report
            .files_written
            .iter()
            .all(|p| p.starts_with("crowdsec/")));
        assert!(config_dir.join("crowdsec/acquis.yaml").is_file());
        assert!(!config_dir.join("config.yml").exists());
    }

    #[tokio::test]
    async fn test_compose_file_is_moved_not_copied() {
        let temp = tempdir().unwrap();
        let platform = Platform::current();
        let config_dir = temp.path().join("config");
        let materializer =
            ConfigMaterializer::new(&platform, platform.create_context(None), &config_dir);

        materializer
            .materialize(&record(), &TemplateBundle::embedded(), "https://app.pangolin.net")
            .await
            .unwrap();
        let target = temp.path().join("docker-compose.yml");
        materializer.relocate_compose(&target).await.unwrap();

        assert!(target.is_file());
        assert!(!config_dir.join("docker-compose.yml").exists());
    }

    #[tokio::test]
    async fn test_on_disk_templates_override_embedded() {
        let temp = tempdir().unwrap();
        let templates = temp.path().join("templates");
        std::fs::create_dir_all(templates.join("crowdsec")).unwrap();
        std::fs::write(templates.join("config.yml"), "domain: {{ dashboard_domain }}\n").unwrap();
        std::fs::write(templates.join("crowdsec/extra.yaml"), "skip me").unwrap();
        std::fs::write(templates.join(".DS_Store"), "junk").unwrap();

        let bundle = TemplateBundle::from_dir(&templates).unwrap();
        assert_eq!(bundle.len(), 3);

        let platform = Platform::current();
        let config_dir = temp.path().join("config");
        let materializer =
            ConfigMaterializer::new(&platform, platform.create_context(None), &config_dir);
        let report = materializer
            .materialize(&record(), &bundle, "https://app.pangolin.net")
            .await
            .unwrap();

        assert_eq!(report.files_written, vec!["config.yml".to_string()]);
        assert_eq!(
            std::fs::read_to_string(config_dir.join("config.yml")).unwrap(),
            "domain: node.example.com\n"
        );
        assert!(!config_dir.join(".DS_Store").exists());
    }

    struct StaticProbe;

    #[async_trait]
    impl HostProbe for StaticProbe {
        async fn is_runtime_installed(&self, runtime: ContainerRuntime) -> bool {
            runtime == ContainerRuntime::Docker
        }

        async fn is_runtime_running(&self, _runtime: ContainerRuntime) -> bool {
            false
        }

        async fn check_port_available(&self, port: u16) -> Result<(), InstallError> {
            if port == 80 {
                return Err(InstallError::PortOccupied {
                    port,
                    message: "address already in use".to_string(),
                });
            }
            Ok(())
        }

        async fn is_user_in_privileged_group(&self, _runtime: ContainerRuntime) -> bool {
            true
        }

        async fn is_unprivileged_port_sysctl_set(&self) -> bool {
            false
        }

        async fn is_root(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_probe_report_collects_every_answer() {
        let report = probe_host(&StaticProbe).await;

        assert!(report.root);
        assert_eq!(report.ports, vec![(80, false), (443, true)]);
        assert_eq!(report.runtimes.len(), 2);
        assert!(report.runtimes[0].installed);
        assert!(!report.runtimes[1].installed);
        assert!(!report.unprivileged_ports_configured);
    }

    #[tokio::test]
    async fn test_system_probe_port_check_is_repeatable() {
        let platform = Arc::new(Platform::current());
        let probe = SystemProbe::new(platform.clone(), platform.create_context(None));

        let listener = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        probe.check_port_available(port).await.unwrap();
        probe.check_port_available(port).await.unwrap();
    }
}
