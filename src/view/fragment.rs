//! Loading, compiling and including view fragments

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use crate::tag::{FaceletHandler, DIAGNOSTIC_TEMPLATE_PATH};

use super::builder;
use super::component::Component;
use super::config::ViewConfig;
use super::context::FaceletContext;
use super::error::FaceletError;

/// Markup served at [`DIAGNOSTIC_TEMPLATE_PATH`]
pub const DIAGNOSTIC_TEMPLATE: &str = r#"
div[class: "facelet-dev-error"] {
    h2 { "An error occurred while building this view" }
    ui:insert[name: "details"] {
        p { "Check the server log for details." }
    }
}
"#;

/// Source text for fragment paths
pub trait ResourceLoader: fmt::Debug + Send + Sync {
    /// Read the fragment at `path`; `Ok(None)` when it does not exist
    fn load(&self, path: &str) -> io::Result<Option<String>>;
}

/// Fragments held in memory, keyed by absolute path
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    sources: HashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(path.into(), source.into());
    }
}

impl ResourceLoader for MemoryLoader {
    fn load(&self, path: &str) -> io::Result<Option<String>> {
        Ok(self.sources.get(path).cloned())
    }
}

/// Fragments read from files below a root directory
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceLoader for DirectoryLoader {
    fn load(&self, path: &str) -> io::Result<Option<String>> {
        let file = self.root.join(path.trim_start_matches('/'));
        match std::fs::read_to_string(&file) {
            Ok(source) => Ok(Some(source)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Applies the fragment at a path into a parent component
pub trait PageIncluder: Send + Sync {
    fn include_fragment(
        &self,
        ctx: &mut FaceletContext<'_>,
        parent: &mut Component,
        path: &str,
    ) -> Result<(), FaceletError>;
}

/// A compiled fragment; immutable and shared by every traversal
#[derive(Debug)]
pub struct Fragment {
    path: Arc<str>,
    root: Arc<dyn FaceletHandler>,
}

impl Fragment {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn root(&self) -> &Arc<dyn FaceletHandler> {
        &self.root
    }

    pub fn apply(&self, ctx: &mut FaceletContext<'_>, parent: &mut Component) -> Result<(), FaceletError> {
        self.root.apply(ctx, parent)
    }
}

/// Compiles fragments on first use and caches them by absolute path
#[derive(Debug)]
pub struct FragmentLibrary {
    loader: Box<dyn ResourceLoader>,
    config: ViewConfig,
    cache: DashMap<String, Arc<Fragment>>,
}

impl FragmentLibrary {
    pub fn new(loader: impl ResourceLoader + 'static, config: ViewConfig) -> Self {
        Self {
            loader: Box::new(loader),
            config,
            cache: DashMap::new(),
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// The compiled fragment at absolute `path`
    pub fn fragment(&self, path: &str) -> Result<Arc<Fragment>, FaceletError> {
        if let Some(cached) = self.cache.get(path) {
            return Ok(cached.clone());
        }

        let source = if path == DIAGNOSTIC_TEMPLATE_PATH {
            DIAGNOSTIC_TEMPLATE.to_string()
        } else {
            self.loader
                .load(path)
                .map_err(|source| FaceletError::Io {
                    path: path.to_string(),
                    source,
                })?
                .ok_or_else(|| FaceletError::ResourceNotFound {
                    path: path.to_string(),
                })?
        };

        let fragment = Arc::new(self.compile(path, &source)?);
        tracing::debug!(fragment = path, "compiled fragment");
        Ok(self
            .cache
            .entry(path.to_string())
            .or_insert(fragment)
            .clone())
    }

    fn compile(&self, path: &str, source: &str) -> Result<Fragment, FaceletError> {
        let document = crate::parser::parse(source).map_err(|errors| FaceletError::MalformedTemplate {
            path: path.to_string(),
            source_text: source.to_string(),
            errors,
        })?;
        let path: Arc<str> = Arc::from(path);
        let root = builder::compile(path.clone(), source, &document, &self.config)?;
        Ok(Fragment { path, root })
    }

    /// Number of compiled fragments held
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl PageIncluder for FragmentLibrary {
    fn include_fragment(
        &self,
        ctx: &mut FaceletContext<'_>,
        parent: &mut Component,
        path: &str,
    ) -> Result<(), FaceletError> {
        let resolved = resolve_path(ctx.current_fragment(), path);
        let fragment = self.fragment(&resolved)?;
        ctx.with_fragment(fragment.path.clone(), |ctx| fragment.apply(ctx, parent))
    }
}

/// Absolute, normalised form of `path`.
///
/// Relative paths resolve against the directory of `base`. `..` never climbs
/// above the root.
pub fn resolve_path(base: Option<&str>, path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    if !path.starts_with('/') {
        if let Some(base) = base {
            let dir = base.rsplit_once('/').map_or("", |(dir, _)| dir);
            segments.extend(dir.split('/'));
        }
    }

    for segment in path.split('/') {
        segments.push(segment);
    }

    let mut normalised: Vec<&str> = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment {
            "" | "." => {}
            ".." => {
                normalised.pop();
            }
            other => normalised.push(other),
        }
    }
    format!("/{}", normalised.join("/"))
}
