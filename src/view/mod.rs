//! Building views from fragments
//!
//! A [`ViewEngine`] owns the [`FragmentLibrary`] and runs one traversal per
//! build: a fresh [`FaceletContext`] is created, the view fragment is included
//! into an empty root [`Component`], and the finished tree is returned.
//!
//! ```rust
//! use facelet_compose::el::Beans;
//! use facelet_compose::view::{MemoryLoader, ViewConfig, ViewEngine};
//!
//! let loader = MemoryLoader::new()
//!     .with("/t.view", r#"h1 { ui:insert[name: "title"] { "Untitled" } }"#)
//!     .with("/page.view", r#"ui:composition[template: "t.view"] {
//!         ui:define[name: "title"] { "Hello" }
//!     }"#);
//!
//! let engine = ViewEngine::new(loader, ViewConfig::default());
//! let view = engine.build_view("/page.view", &Beans::new()).unwrap();
//! assert_eq!(view.to_markup(), "<h1>Hello</h1>");
//! ```

mod builder;
mod component;
mod config;
mod context;
mod error;
mod fragment;
mod scope;
mod state;

use crate::el::{Beans, DefaultEvaluator, ExpressionEvaluator};

pub use component::{Component, ComponentKind};
pub use config::{ProjectStage, ViewConfig};
pub use context::FaceletContext;
pub use error::FaceletError;
pub use fragment::{
    resolve_path, DirectoryLoader, Fragment, FragmentLibrary, MemoryLoader, PageIncluder,
    ResourceLoader, DIAGNOSTIC_TEMPLATE,
};
pub use scope::{DeferredValue, Environment, ParameterSet, ScopeResolver, ValueBinding, VariableScope};
pub use state::{InMemoryStateCoordinator, StateCoordinator};

/// Builds views from the fragments of one library
#[derive(Debug)]
pub struct ViewEngine {
    library: FragmentLibrary,
    evaluator: Box<dyn ExpressionEvaluator>,
}

impl ViewEngine {
    pub fn new(loader: impl ResourceLoader + 'static, config: ViewConfig) -> Self {
        Self {
            library: FragmentLibrary::new(loader, config),
            evaluator: Box::new(DefaultEvaluator),
        }
    }

    /// Use a different expression evaluator
    pub fn with_evaluator(mut self, evaluator: impl ExpressionEvaluator + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    pub fn library(&self) -> &FragmentLibrary {
        &self.library
    }

    pub fn config(&self) -> &ViewConfig {
        self.library.config()
    }

    /// Build `view_id` with `beans` as the application objects
    pub fn build_view(&self, view_id: &str, beans: &Beans) -> Result<Component, FaceletError> {
        let ctx = FaceletContext::new(self.evaluator.as_ref(), &self.library, self.config())
            .with_beans(beans.clone());
        self.build(ctx, view_id)
    }

    /// Build `view_id`, recording legacy decorate markers in `state`
    pub fn build_view_with_state(
        &self,
        view_id: &str,
        beans: &Beans,
        state: &mut dyn StateCoordinator,
    ) -> Result<Component, FaceletError> {
        let ctx = FaceletContext::new(self.evaluator.as_ref(), &self.library, self.config())
            .with_beans(beans.clone())
            .with_state(state);
        self.build(ctx, view_id)
    }

    fn build(&self, mut ctx: FaceletContext<'_>, view_id: &str) -> Result<Component, FaceletError> {
        tracing::debug!(view = view_id, "building view");
        let mut root = Component::root();
        ctx.include_fragment(&mut root, view_id)?;
        Ok(root)
    }
}
