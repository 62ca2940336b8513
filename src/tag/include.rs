//! `ui:include`: applies another fragment in a nested variable scope

use std::any::Any;
use std::sync::Arc;

use crate::view::{Component, FaceletContext, FaceletError};

use super::{FaceletHandler, TagAttribute, TagConfig};

/// `src` value that development builds replace with the bundled diagnostic template
pub const DEV_ERROR_INCLUDE_SENTINEL: &str = "jakarta.faces.error.xhtml";

/// Path under which the fragment library serves the bundled diagnostic template
pub const DIAGNOSTIC_TEMPLATE_PATH: &str = "/META-INF/rsc/facelet-dev-error-include.view";

#[derive(Debug)]
pub struct IncludeHandler {
    src: TagAttribute,
    next: Arc<dyn FaceletHandler>,
}

impl IncludeHandler {
    pub fn new(config: TagConfig) -> Result<Self, FaceletError> {
        Ok(Self {
            src: config.required_attribute("src")?.clone(),
            next: config.next,
        })
    }

    pub fn src(&self) -> &TagAttribute {
        &self.src
    }

    fn resolve_src(&self, ctx: &FaceletContext<'_>) -> Result<String, FaceletError> {
        let path = self.src.value(ctx)?;
        if ctx.config().is_development() && path == DEV_ERROR_INCLUDE_SENTINEL {
            tracing::debug!(src = %path, "serving diagnostic template");
            return Ok(DIAGNOSTIC_TEMPLATE_PATH.to_string());
        }
        Ok(path)
    }
}

impl FaceletHandler for IncludeHandler {
    fn apply(&self, ctx: &mut FaceletContext<'_>, parent: &mut Component) -> Result<(), FaceletError> {
        let path = self.resolve_src(ctx)?;
        if path.trim().is_empty() {
            tracing::trace!(src = %self.src.raw(), "empty include source; nothing to render");
            return Ok(());
        }

        ctx.with_scope(|ctx| {
            // Only the parameters matter; nested content is not rendered
            let mut scratch = Component::root();
            self.next.apply(ctx, &mut scratch)?;
            ctx.include_fragment(parent, &path)
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
