//! `ui:define`: named content supplied to a template slot

use std::any::Any;
use std::sync::Arc;

use crate::view::{Component, FaceletContext, FaceletError};

use super::{FaceletHandler, TagConfig};

/// Named block of content. Rendered only when a slot asks for it.
#[derive(Debug, Clone)]
pub struct DefineHandler {
    name: String,
    next: Arc<dyn FaceletHandler>,
}

impl DefineHandler {
    pub fn new(config: TagConfig) -> Result<Self, FaceletError> {
        config.required_attribute("name")?;
        let name = config.literal_attribute("name")?.unwrap_or_default();
        Ok(Self {
            name,
            next: config.next,
        })
    }

    /// Definition built in code
    pub fn with_body(name: impl Into<String>, body: Arc<dyn FaceletHandler>) -> Self {
        Self {
            name: name.into(),
            next: body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the definition's content into `parent`
    pub fn apply_definition(
        &self,
        ctx: &mut FaceletContext<'_>,
        parent: &mut Component,
    ) -> Result<(), FaceletError> {
        self.next.apply(ctx, parent)
    }
}

impl FaceletHandler for DefineHandler {
    /// Definitions produce nothing where they are declared
    fn apply(&self, _ctx: &mut FaceletContext<'_>, _parent: &mut Component) -> Result<(), FaceletError> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
