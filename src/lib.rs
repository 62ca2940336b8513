//! Facelet Compose - template composition for view fragments
//!
//! This library builds views out of fragments that cooperate through templates:
//! `ui:composition` and `ui:decorate` fill a template's `ui:insert` slots with
//! their `ui:define` blocks, `ui:include` pulls in another fragment, and
//! `ui:param` passes values into the fragment being included.
//!
//! # Example
//!
//! ```rust
//! use facelet_compose::render;
//!
//! let markup = render(
//!     &[
//!         ("/layout.view", r#"div { ui:insert[name: "body"] { "empty" } }"#),
//!         ("/page.view", r#"ui:composition[template: "/layout.view"] {
//!             ui:define[name: "body"] { "Hello" }
//!         }"#),
//!     ],
//!     "/page.view",
//! )
//! .unwrap();
//! assert_eq!(markup, "<div>Hello</div>");
//! ```

pub mod el;
pub mod error;
pub mod parser;
pub mod settings;
pub mod tag;
pub mod template;
pub mod view;

pub use error::ParseError;
pub use parser::{parse, Document};
pub use settings::{Settings, SettingsError};
pub use view::{Component, FaceletError, MemoryLoader, ProjectStage, ViewConfig, ViewEngine};

use el::Beans;
use thiserror::Error;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error while building the view
    #[error(transparent)]
    View(#[from] FaceletError),

    /// Error loading settings
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}

impl RenderError {
    /// Message with source context for parse errors
    pub fn report(&self) -> String {
        match self {
            RenderError::View(e) => e.report(),
            other => other.to_string(),
        }
    }
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// View building options
    pub view: ViewConfig,
    /// Application objects visible to expressions
    pub beans: Beans,
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the view configuration
    pub fn with_view(mut self, view: ViewConfig) -> Self {
        self.view = view;
        self
    }

    /// Set the beans
    pub fn with_beans(mut self, beans: Beans) -> Self {
        self.beans = beans;
        self
    }
}

impl From<Settings> for RenderConfig {
    fn from(settings: Settings) -> Self {
        Self {
            view: settings.view,
            beans: settings.beans,
        }
    }
}

/// Render `view_id` from in-memory `(path, source)` pages with default configuration
pub fn render(pages: &[(&str, &str)], view_id: &str) -> Result<String, RenderError> {
    render_with_config(pages, view_id, RenderConfig::default())
}

/// Render `view_id` from in-memory pages with custom configuration
///
/// # Example
///
/// ```rust
/// use facelet_compose::{render_with_config, ProjectStage, RenderConfig, ViewConfig};
///
/// let config = RenderConfig::new()
///     .with_view(ViewConfig::new().with_project_stage(ProjectStage::Development));
///
/// let markup = render_with_config(
///     &[("/page.view", r#"ui:include[src: "jakarta.faces.error.xhtml"]"#)],
///     "/page.view",
///     config,
/// )
/// .unwrap();
/// assert!(markup.contains("facelet-dev-error"));
/// ```
pub fn render_with_config(
    pages: &[(&str, &str)],
    view_id: &str,
    config: RenderConfig,
) -> Result<String, RenderError> {
    let loader = pages
        .iter()
        .fold(MemoryLoader::new(), |loader, (path, source)| loader.with(*path, *source));
    let engine = ViewEngine::new(loader, config.view);
    let view = engine.build_view(view_id, &config.beans)?;
    Ok(view.to_markup())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_plain_page() {
        let markup = render(&[("/p.view", r#"p[class: "x"] { "hi" }"#)], "/p.view").unwrap();
        assert_eq!(markup, r#"<p class="x">hi</p>"#);
    }

    #[test]
    fn test_render_with_beans() {
        let config = RenderConfig::new().with_beans(Beans::from_iter([(
            "user".to_string(),
            json!({ "name": "ada" }),
        )]));
        let markup =
            render_with_config(&[("/p.view", r#"span { "Hi #{user.name}" }"#)], "/p.view", config)
                .unwrap();
        assert_eq!(markup, "<span>Hi ada</span>");
    }

    #[test]
    fn test_render_missing_view_error() {
        let err = render(&[], "/nope.view").unwrap_err();
        assert!(matches!(
            err,
            RenderError::View(FaceletError::ResourceNotFound { .. })
        ));
        assert_eq!(err.to_string(), "fragment not found: /nope.view");
    }

    #[test]
    fn test_render_parse_error_report() {
        let err = render(&[("/p.view", "div [class \"x\"]")], "/p.view").unwrap_err();
        assert!(err.report().contains("/p.view"));
    }

    #[test]
    fn test_render_config_from_settings() {
        let settings = Settings::from_str("[view]\nlegacy_decorate = true\n[beans]\nx = 1").unwrap();
        let config = RenderConfig::from(settings);
        assert!(config.view.legacy_decorate);
        assert_eq!(config.beans.get("x"), Some(&json!(1)));
    }
}
