//! Editor configuration.

use crate::errors::EditorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-session editor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Quiet period before an edit is sent for remote validation
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Maximum number of undo steps (0 = unlimited)
    #[serde(default = "default_undo_levels")]
    pub undo_levels: usize,

    /// Submit edits to the remote validator at all
    #[serde(default = "default_remote_validation")]
    pub remote_validation: bool,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_undo_levels() -> usize {
    100
}

fn default_remote_validation() -> bool {
    true
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            undo_levels: default_undo_levels(),
            remote_validation: default_remote_validation(),
        }
    }
}

impl EditorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        serde_json::from_str(json).map_err(|e| EditorError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.undo_levels, 100);
        assert!(config.remote_validation);
    }

    #[test]
    fn test_partial_json() {
        let config = EditorConfig::from_json(r#"{ "debounceMs": 50 }"#).unwrap();
        assert_eq!(config.debounce_ms, 50);
        assert_eq!(config.undo_levels, 100);
    }

    #[test]
    fn test_invalid_json() {
        let err = EditorConfig::from_json(r#"{ "debounceMs": "soon" }"#).unwrap_err();
        assert!(matches!(err, EditorError::Config(_)));
    }
}
