use serde::{Deserialize, Serialize};

/// Free-form operator output not tied to one component
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    /// Plain line of text
    Notice { message: String },

    /// Heading such as "Basic Configuration"
    Section { title: String },

    Warning { message: String },

    /// Only shown with `--debug`
    DebugLog { message: String },
}

impl GeneralEvent {
    pub fn notice(message: impl Into<String>) -> Self {
        Self::Notice {
            message: message.into(),
        }
    }

    pub fn section(title: impl Into<String>) -> Self {
        Self::Section {
            title: title.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
        }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::DebugLog {
            message: message.into(),
        }
    }
}
