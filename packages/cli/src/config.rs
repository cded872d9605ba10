use anyhow::Context;
use marble_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "marble.config.json";

/// Marble configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Data model JSON describing tables and field types
    #[serde(default = "default_data_model")]
    pub data_model: String,

    /// Settings for editing sessions
    #[serde(default)]
    pub editor: EditorConfig,
}

fn default_data_model() -> String {
    "data_model.json".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("invalid {}", config_path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Data model path, `explicit` taking precedence over the configured one
    pub fn data_model_path(&self, cwd: &Path, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => cwd.join(path),
            None => cwd.join(&self.data_model),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_model: default_data_model(),
            editor: EditorConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "dataModel": "schemas/bank.json",
            "editor": { "debounceMs": 150, "remoteValidation": false }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.data_model, "schemas/bank.json");
        assert_eq!(config.editor.debounce_ms, 150);
        assert!(!config.editor.remote_validation);
        assert_eq!(config.editor.undo_levels, 100);
    }

    #[test]
    fn test_default_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.data_model, "data_model.json");
    }

    #[test]
    fn test_data_model_path() {
        let config = Config::default();
        let cwd = Path::new("/work");

        assert_eq!(config.data_model_path(cwd, None), PathBuf::from("/work/data_model.json"));
        assert_eq!(
            config.data_model_path(cwd, Some(Path::new("/abs/model.json"))),
            PathBuf::from("/abs/model.json")
        );
    }
}
