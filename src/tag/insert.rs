//! `ui:insert`: a slot in a template

use std::any::Any;
use std::sync::Arc;

use crate::template::{ClientMode, TemplateClient};
use crate::view::{Component, FaceletContext, FaceletError};

use super::{FaceletHandler, TagConfig};

/// Named (or unnamed) slot.
///
/// Content comes from the nearest template client that can supply it; the
/// tag's own body is the default when none can. An unnamed insert asks the
/// clients for their whole body, so it renders the caller's content when a
/// composition or decoration is active and its own body otherwise.
#[derive(Debug)]
pub struct InsertHandler {
    name: Option<String>,
    fallback: Arc<InsertFallback>,
}

impl InsertHandler {
    pub fn new(config: TagConfig) -> Result<Self, FaceletError> {
        let name = config.literal_attribute("name")?;
        Ok(Self {
            fallback: Arc::new(InsertFallback {
                name: name.clone(),
                body: config.next,
            }),
            name,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl FaceletHandler for InsertHandler {
    fn apply(&self, ctx: &mut FaceletContext<'_>, parent: &mut Component) -> Result<(), FaceletError> {
        let fallback: Arc<dyn TemplateClient> = self.fallback.clone();
        let name = self.name.as_deref();

        let found = ctx.with_template_client(fallback, ClientMode::Fallback, |ctx| {
            ctx.include_definition(parent, name)
        })?;
        if !found {
            tracing::trace!(slot = name.unwrap_or("<default>"), "no client content; rendering default");
            self.fallback.body.apply(ctx, parent)?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The insert's default content, offered to definitions that re-insert the same slot
#[derive(Debug)]
struct InsertFallback {
    name: Option<String>,
    body: Arc<dyn FaceletHandler>,
}

impl TemplateClient for InsertFallback {
    fn apply_client(
        &self,
        ctx: &mut FaceletContext<'_>,
        parent: &mut Component,
        name: Option<&str>,
    ) -> Result<bool, FaceletError> {
        if self.name.as_deref() != name {
            return Ok(false);
        }
        self.body.apply(ctx, parent)?;
        Ok(true)
    }
}
