//! Template bundle and inclusion rules

use nodeup_config::constants;
use nodeup_errors::{Error, InstallError};
use std::path::Path;
use walkdir::WalkDir;

const EMBEDDED: &[(&str, &str)] = &[
    ("config.yml", include_str!("../../templates/config.yml")),
    (
        "crowdsec/acquis.yaml",
        include_str!("../../templates/crowdsec/acquis.yaml"),
    ),
    (
        "crowdsec/profiles.yaml",
        include_str!("../../templates/crowdsec/profiles.yaml"),
    ),
    (
        "docker-compose.yml",
        include_str!("../../templates/docker-compose.yml"),
    ),
    (
        "traefik/dynamic_config.yml",
        include_str!("../../templates/traefik/dynamic_config.yml"),
    ),
    (
        "traefik/traefik_config.yml",
        include_str!("../../templates/traefik/traefik_config.yml"),
    ),
];

/// A template keyed by its `/`-separated path relative to the bundle root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateEntry {
    pub path: String,
    pub contents: String,
}

/// Read-only set of templates, sorted by path
#[derive(Debug, Clone)]
pub struct TemplateBundle {
    entries: Vec<TemplateEntry>,
}

impl TemplateBundle {
    /// Build a bundle from arbitrary entries
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = TemplateEntry>) -> Self {
        let mut entries: Vec<TemplateEntry> = entries.into_iter().collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Self { entries }
    }

    /// Templates compiled into the binary
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_entries(EMBEDDED.iter().map(|(path, contents)| TemplateEntry {
            path: (*path).to_string(),
            contents: (*contents).to_string(),
        }))
    }

    /// Load every regular file under `root` as a template.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be walked or a file is not UTF-8.
    pub fn from_dir(root: &Path) -> Result<Self, Error> {
        let mut entries = Vec::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| InstallError::FilesystemError {
                operation: "walk templates".to_string(),
                path: root.display().to_string(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(root).map_err(|e| {
                InstallError::FilesystemError {
                    operation: "walk templates".to_string(),
                    path: entry.path().display().to_string(),
                    message: e.to_string(),
                }
            })?;
            let path = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let contents = std::fs::read_to_string(entry.path())
                .map_err(|e| Error::io_with_path(&e, entry.path()))?;

            entries.push(TemplateEntry { path, contents });
        }

        Ok(Self::from_entries(entries))
    }

    #[must_use]
    pub fn entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Files operating systems drop into directories on their own
#[must_use]
pub fn is_hidden_artifact(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    matches!(name, ".DS_Store" | "Thumbs.db" | "desktop.ini") || name.starts_with("._")
}

/// Whether a template belongs in the rendered tree.
///
/// The security add-on subtree and everything else are mutually exclusive:
/// an entry under a `crowdsec` component is rendered exactly when the add-on
/// is enabled.
#[must_use]
pub fn include_entry(path: &str, security_addon: bool) -> bool {
    if is_hidden_artifact(path) {
        return false;
    }
    let in_addon = path
        .split('/')
        .any(|component| component == constants::SECURITY_ADDON_NAMESPACE);
    in_addon == security_addon
}
