use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::Level;
use uuid::Uuid;

/// Identifier shared by every event of this process
fn current_run_id() -> Uuid {
    static RUN_ID: OnceLock<Uuid> = OnceLock::new();
    *RUN_ID.get_or_init(Uuid::new_v4)
}

/// Metadata stamped on each emitted event.
///
/// The `run_id` lets a debug log holding several installer runs be split
/// back into individual runs.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    pub event_id: Uuid,
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub level: EventLevel,
    pub source: EventSource,
}

impl EventMeta {
    #[must_use]
    pub fn new(level: impl Into<EventLevel>, source: EventSource) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            run_id: current_run_id(),
            timestamp: Utc::now(),
            level: level.into(),
            source,
        }
    }

    /// Level to log this event at
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        self.level.into()
    }
}

/// Severity of an event
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<EventLevel> for Level {
    fn from(level: EventLevel) -> Self {
        match level {
            EventLevel::Trace => Level::TRACE,
            EventLevel::Debug => Level::DEBUG,
            EventLevel::Info => Level::INFO,
            EventLevel::Warn => Level::WARN,
            EventLevel::Error => Level::ERROR,
        }
    }
}

impl From<Level> for EventLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::TRACE => EventLevel::Trace,
            Level::DEBUG => EventLevel::Debug,
            Level::INFO => EventLevel::Info,
            Level::WARN => EventLevel::Warn,
            Level::ERROR => EventLevel::Error,
        }
    }
}

/// Installer component an event came from
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    General,
    Platform,
    Probe,
    Credentials,
    Materialize,
    Runtime,
    Containers,
    Install,
}

impl EventSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Platform => "platform",
            Self::Probe => "probe",
            Self::Credentials => "credentials",
            Self::Materialize => "materialize",
            Self::Runtime => "runtime",
            Self::Containers => "containers",
            Self::Install => "install",
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_is_shared() {
        let first = EventMeta::new(Level::INFO, EventSource::Install);
        let second = EventMeta::new(Level::ERROR, EventSource::Runtime);
        assert_eq!(first.run_id, second.run_id);
        assert_ne!(first.event_id, second.event_id);
        assert_eq!(second.tracing_level(), Level::ERROR);
    }
}
