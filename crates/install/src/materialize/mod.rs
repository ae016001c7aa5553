//! Rendering the template bundle into the live configuration directory

mod bundle;

pub use bundle::{include_entry, is_hidden_artifact, TemplateBundle, TemplateEntry};

use nodeup_config::constants;
use nodeup_errors::{Error, InstallError, PlatformError};
use nodeup_events::{AppEvent, EventEmitter, FailureContext, MaterializeEvent};
use nodeup_platform::{Platform, PlatformContext};
use nodeup_types::InstallationConfig;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// What a materialization run wrote
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaterializeReport {
    pub files_written: Vec<String>,
    pub directories_created: usize,
    pub skipped: Vec<String>,
}

/// Renders templates under one configuration directory
pub struct ConfigMaterializer<'a> {
    platform: &'a Platform,
    ctx: PlatformContext,
    config_dir: PathBuf,
}

fn render_context(config: &InstallationConfig, dashboard_url: &str) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("dashboard_domain", &config.dashboard_domain);
    context.insert("pangolin_version", &config.versions.pangolin);
    context.insert("gerbil_version", &config.versions.gerbil);
    context.insert("badger_version", &config.versions.badger);
    context.insert("enable_ipv6", &config.enable_ipv6);
    context.insert("traefik_bouncer_key", &config.traefik_bouncer_key);
    context.insert("install_crowdsec", &config.install_security_addon);
    context.insert(
        "hybrid_id",
        config.credentials.as_ref().map_or("", |c| c.id()),
    );
    context.insert(
        "hybrid_secret",
        config.credentials.as_ref().map_or("", |c| c.secret()),
    );
    context.insert(
        "runtime",
        config.runtime.map_or("undefined", |r| r.binary()),
    );
    context.insert("dashboard_url", dashboard_url);
    context
}

/// Flatten tera's error chain; the top-level message alone only names the template
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn filesystem_error(operation: &str, path: &Path, err: &PlatformError) -> Error {
    InstallError::FilesystemError {
        operation: operation.to_string(),
        path: path.display().to_string(),
        message: err.to_string(),
    }
    .into()
}

impl<'a> ConfigMaterializer<'a> {
    pub fn new(platform: &'a Platform, ctx: PlatformContext, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            ctx,
            config_dir: config_dir.into(),
        }
    }

    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    async fn ensure_dir(&self, dir: &Path, created: &mut BTreeSet<PathBuf>) -> Result<(), Error> {
        if created.contains(dir) {
            return Ok(());
        }
        self.platform
            .filesystem()
            .create_dir_all(&self.ctx, dir)
            .await
            .map_err(|e| filesystem_error("create directory", dir, &e))?;
        self.ctx
            .emit(AppEvent::Materialize(MaterializeEvent::DirectoryCreated {
                path: dir.display().to_string(),
            }));
        created.insert(dir.to_path_buf());
        Ok(())
    }

    /// Render every included template of `bundle` against `config`.
    ///
    /// Entries are processed in path order. A render or write failure stops
    /// the walk and leaves the files written so far in place.
    ///
    /// # Errors
    ///
    /// Returns `MissingDashboardDomain` before touching the disk when the
    /// domain is blank, `TemplateFailed` when a template does not render, and
    /// `FilesystemError` when a directory or file cannot be written.
    pub async fn materialize(
        &self,
        config: &InstallationConfig,
        bundle: &TemplateBundle,
        dashboard_url: &str,
    ) -> Result<MaterializeReport, Error> {
        if !config.has_dashboard_domain() {
            return Err(InstallError::MissingDashboardDomain.into());
        }

        self.ctx.emit(AppEvent::Materialize(MaterializeEvent::Started {
            config_dir: self.config_dir.display().to_string(),
            entries: bundle.len(),
            security_addon: config.install_security_addon,
        }));

        let mut created = BTreeSet::new();
        self.ensure_dir(&self.config_dir, &mut created).await?;
        self.ensure_dir(&self.config_dir.join(constants::LOGS_DIR_NAME), &mut created)
            .await?;

        let context = render_context(config, dashboard_url);
        let mut report = MaterializeReport::default();

        for entry in bundle.entries() {
            if !include_entry(&entry.path, config.install_security_addon) {
                let reason = if is_hidden_artifact(&entry.path) {
                    "hidden artifact"
                } else if config.install_security_addon {
                    "outside the security add-on"
                } else {
                    "security add-on disabled"
                };
                self.ctx
                    .emit(AppEvent::Materialize(MaterializeEvent::EntrySkipped {
                        path: entry.path.clone(),
                        reason: reason.to_string(),
                    }));
                report.skipped.push(entry.path.clone());
                continue;
            }

            let target = self.config_dir.join(&entry.path);
            let rendered = match tera::Tera::one_off(&entry.contents, &context, false) {
                Ok(rendered) => rendered,
                Err(e) => {
                    let error = InstallError::TemplateFailed {
                        path: entry.path.clone(),
                        message: error_chain(&e),
                    };
                    self.ctx.emit(AppEvent::Materialize(MaterializeEvent::Failed {
                        path: entry.path.clone(),
                        failure: FailureContext::from_error(&error),
                    }));
                    return Err(error.into());
                }
            };

            if let Some(parent) = target.parent() {
                self.ensure_dir(parent, &mut created).await?;
            }
            self.platform
                .filesystem()
                .write_file(&self.ctx, &target, rendered.as_bytes())
                .await
                .map_err(|e| filesystem_error("write file", &target, &e))?;

            self.ctx
                .emit(AppEvent::Materialize(MaterializeEvent::FileRendered {
                    path: entry.path.clone(),
                    bytes: rendered.len(),
                }));
            report.files_written.push(entry.path.clone());
        }

        report.directories_created = created.len();
        self.ctx.emit(AppEvent::Materialize(MaterializeEvent::Completed {
            files_written: report.files_written.len(),
            directories_created: report.directories_created,
            entries_skipped: report.skipped.len(),
        }));
        tracing::debug!(
            files = report.files_written.len(),
            skipped = report.skipped.len(),
            "configuration rendered"
        );

        Ok(report)
    }

    /// Move the rendered compose file out of the configuration directory to
    /// `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be moved.
    pub async fn relocate_compose(&self, target: &Path) -> Result<(), Error> {
        let source = self.config_dir.join(constants::COMPOSE_FILE_NAME);
        self.platform
            .filesystem()
            .move_file(&self.ctx, &source, target)
            .await
            .map_err(|e| filesystem_error("move compose file", &source, &e))?;

        self.ctx
            .emit(AppEvent::Materialize(MaterializeEvent::ComposeRelocated {
                from: source.display().to_string(),
                to: target.display().to_string(),
            }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeup_types::{ComponentVersions, ContainerRuntime, Credentials};
    use tempfile::TempDir;

    fn config() -> InstallationConfig {
        let mut config = InstallationConfig::new(ComponentVersions {
            pangolin: "1.10.0".into(),
            gerbil: "1.2.1".into(),
            badger: "v1.2.0".into(),
        });
        config.dashboard_domain = "node.example.com".into();
        config.credentials = Credentials::from_parts("node-1", "s3cret");
        config
    }

    fn entry(path: &str, contents: &str) -> TemplateEntry {
        TemplateEntry {
            path: path.into(),
            contents: contents.into(),
        }
    }

    #[tokio::test]
    async fn test_empty_domain_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let platform = Platform::current();
        let config_dir = dir.path().join("config");
        let materializer = ConfigMaterializer::new(&platform, PlatformContext::default(), &config_dir);

        let mut config = config();
        config.dashboard_domain = "  ".into();
        let err = materializer
            .materialize(&config, &TemplateBundle::embedded(), "https://app.pangolin.net")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Install(InstallError::MissingDashboardDomain)
        ));
        assert!(!config_dir.exists());
    }

    #[tokio::test]
    async fn test_renders_variables_and_conditionals() {
        let dir = TempDir::new().unwrap();
        let platform = Platform::current();
        let materializer =
            ConfigMaterializer::new(&platform, PlatformContext::default(), dir.path());
        let bundle = TemplateBundle::from_entries([entry(
            "nested/out.txt",
            "{{ dashboard_domain }} {{ runtime }} {{ hybrid_id }}{% if enable_ipv6 %} v6{% endif %}",
        )]);

        let mut config = config();
        config.enable_ipv6 = false;
        materializer
            .materialize(&config, &bundle, "https://app.pangolin.net")
            .await
            .unwrap();
        let rendered = std::fs::read_to_string(dir.path().join("nested/out.txt")).unwrap();
        assert_eq!(rendered, "node.example.com undefined node-1");

        config.enable_ipv6 = true;
        config.runtime = Some(ContainerRuntime::Podman);
        materializer
            .materialize(&config, &bundle, "https://app.pangolin.net")
            .await
            .unwrap();
        let rendered = std::fs::read_to_string(dir.path().join("nested/out.txt")).unwrap();
        assert_eq!(rendered, "node.example.com podman node-1 v6");
    }

    #[tokio::test]
    async fn test_render_failure_keeps_earlier_files() {
        let dir = TempDir::new().unwrap();
        let platform = Platform::current();
        let materializer =
            ConfigMaterializer::new(&platform, PlatformContext::default(), dir.path());
        let bundle = TemplateBundle::from_entries([
            entry("a.yml", "ok: {{ dashboard_domain }}"),
            entry("b.yml", "broken: {{ unclosed"),
            entry("c.yml", "never"),
        ]);

        let err = materializer
            .materialize(&config(), &bundle, "https://app.pangolin.net")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Install(InstallError::TemplateFailed { ref path, .. }) if path == "b.yml"
        ));
        assert!(dir.path().join("a.yml").exists());
        assert!(!dir.path().join("b.yml").exists());
        assert!(!dir.path().join("c.yml").exists());
    }

    #[tokio::test]
    async fn test_logs_directory_and_report() {
        let dir = TempDir::new().unwrap();
        let platform = Platform::current();
        let config_dir = dir.path().join("config");
        let materializer =
            ConfigMaterializer::new(&platform, PlatformContext::default(), &config_dir);

        let report = materializer
            .materialize(&config(), &TemplateBundle::embedded(), "https://app.pangolin.net")
            .await
            .unwrap();

        assert!(config_dir.join("logs").is_dir());
        assert!(report.files_written.contains(&"config.yml".to_string()));
        assert!(report.skipped.iter().all(|p| p.starts_with("crowdsec/")));
        assert!(!config_dir.join("crowdsec").exists());
    }

    #[tokio::test]
    async fn test_relocate_without_rendered_compose_fails() {
        let dir = TempDir::new().unwrap();
        let platform = Platform::current();
        let materializer =
            ConfigMaterializer::new(&platform, PlatformContext::default(), dir.path());
        let target = dir.path().join("moved.yml");

        let err = materializer.relocate_compose(&target).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Install(InstallError::FilesystemError { ref operation, .. })
                if operation == "move compose file"
        ));
        assert!(!target.exists());
    }
}
