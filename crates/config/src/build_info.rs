//! Component versions injected by the release pipeline
//!
//! The pipeline exports `NODEUP_PANGOLIN_VERSION`, `NODEUP_GERBIL_VERSION` and
//! `NODEUP_BADGER_VERSION` while compiling; local builds fall back to `latest`.

use nodeup_types::ComponentVersions;

const FALLBACK_VERSION: &str = "latest";

fn pinned(value: Option<&'static str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => FALLBACK_VERSION.to_string(),
    }
}

/// Versions baked into this binary
#[must_use]
pub fn component_versions() -> ComponentVersions {
    ComponentVersions {
        pangolin: pinned(option_env!("NODEUP_PANGOLIN_VERSION")),
        gerbil: pinned(option_env!("NODEUP_GERBIL_VERSION")),
        badger: pinned(option_env!("NODEUP_BADGER_VERSION")),
    }
}
