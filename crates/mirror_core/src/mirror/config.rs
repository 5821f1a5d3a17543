//! Controller configuration.

use log::Level;

const DEFAULT_LABEL: &str = "mirror";

/// Per-controller settings.
///
/// `label` tags every log line as `collection=<label>`; `guard_level` is the
/// level used for skipped-mutation diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    pub label: String,
    pub guard_level: Level,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            guard_level: Level::Warn,
        }
    }
}

impl MirrorConfig {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        let trimmed = label.trim();
        self.label = if trimmed.is_empty() {
            DEFAULT_LABEL.to_string()
        } else {
            trimmed.replace(char::is_whitespace, "_")
        };
        self
    }

    pub fn with_guard_level(mut self, level: Level) -> Self {
        self.guard_level = level;
        self
    }
}
