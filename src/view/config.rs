//! Configuration for building views

use std::str::FromStr;

use serde::Deserialize;

/// Deployment stage of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStage {
    Development,
    #[default]
    Production,
    SystemTest,
    UnitTest,
}

impl FromStr for ProjectStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            "systemtest" => Ok(Self::SystemTest),
            "unittest" => Ok(Self::UnitTest),
            other => Err(format!("unknown project stage '{}'", other)),
        }
    }
}

/// Options controlling fragment compilation and traversal
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Stage; development enables the diagnostic include
    pub project_stage: ProjectStage,

    /// Compile `ui:decorate` with partial-state template tracking
    pub legacy_decorate: bool,

    /// Drop content outside the first `ui:composition` of a fragment
    pub trim_outside_composition: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            project_stage: ProjectStage::default(),
            legacy_decorate: false,
            trim_outside_composition: true,
        }
    }
}

impl ViewConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the project stage
    pub fn with_project_stage(mut self, stage: ProjectStage) -> Self {
        self.project_stage = stage;
        self
    }

    /// Enable or disable the legacy decorate variant
    pub fn with_legacy_decorate(mut self, legacy: bool) -> Self {
        self.legacy_decorate = legacy;
        self
    }

    /// Enable or disable composition trimming
    pub fn with_trim_outside_composition(mut self, trim: bool) -> Self {
        self.trim_outside_composition = trim;
        self
    }

    pub fn is_development(&self) -> bool {
        self.project_stage == ProjectStage::Development
    }
}
