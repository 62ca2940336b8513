//! Settings file for the command line
//!
//! ```toml
//! [view]
//! project_stage = "development"
//! legacy_decorate = true
//!
//! [beans]
//! title = "Dashboard"
//! user = { name = "ada", roles = ["admin"] }
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::el::Beans;
use crate::view::ViewConfig;

/// Errors that can occur when loading or parsing settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse settings TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("[beans] cannot be used as expression values: {0}")]
    BeanError(#[from] serde_json::Error),
}

/// View configuration plus the beans made available to expressions
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub view: ViewConfig,
    pub beans: Beans,
}

#[derive(Deserialize)]
struct TomlSettings {
    #[serde(default)]
    view: ViewConfig,
    #[serde(default)]
    beans: toml::Table,
}

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load settings from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, SettingsError> {
        let parsed: TomlSettings = toml::from_str(content)?;
        let beans = match serde_json::to_value(parsed.beans)? {
            serde_json::Value::Object(map) => map,
            _ => Beans::new(),
        };

        Ok(Settings {
            view: parsed.view,
            beans,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ProjectStage;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = Settings::from_str("").unwrap();
        assert_eq!(settings.view, ViewConfig::default());
        assert!(settings.beans.is_empty());
    }

    #[test]
    fn test_view_and_beans() {
        let settings = Settings::from_str(
            r#"
            [view]
            project_stage = "development"
            legacy_decorate = true

            [beans]
            title = "Dashboard"
            user = { name = "ada", roles = ["admin"] }
            "#,
        )
        .unwrap();

        assert_eq!(settings.view.project_stage, ProjectStage::Development);
        assert!(settings.view.legacy_decorate);
        assert!(settings.view.trim_outside_composition);
        assert_eq!(settings.beans.get("title"), Some(&json!("Dashboard")));
        assert_eq!(
            settings.beans.get("user"),
            Some(&json!({ "name": "ada", "roles": ["admin"] }))
        );
    }

    #[test]
    fn test_unknown_stage_is_error() {
        let err = Settings::from_str("[view]\nproject_stage = \"staging\"").unwrap_err();
        assert!(matches!(err, SettingsError::ParseError(_)));
    }
}
