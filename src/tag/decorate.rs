//! `ui:decorate`: wraps the tag's content in a template

use std::any::Any;
use std::sync::Arc;

use crate::template::{ClientMode, DefinitionClient, SlotRegistry, TemplateClient};
use crate::view::{Component, FaceletContext, FaceletError};

use super::param::collect_params;
use super::{FaceletHandler, ParamHandler, TagAttribute, TagConfig};

/// Decoration tag.
///
/// Its definitions are visible only to its own template: the client is pushed,
/// so slot lookups from the template never reach older clients. Parameters go
/// into a fresh variable scope that is dropped when the template is done.
///
/// The legacy variant also remembers the resolved template path of a dynamic
/// `template` between builds and marks the tag for full state when it changes.
#[derive(Debug)]
pub struct DecorateHandler {
    tag_id: String,
    template: TagAttribute,
    params: Option<Vec<ParamHandler>>,
    client: Arc<DefinitionClient>,
    legacy: bool,
}

impl DecorateHandler {
    pub fn new(config: TagConfig, legacy: bool) -> Result<Self, FaceletError> {
        let template = config.required_attribute("template")?.clone();
        Ok(Self {
            tag_id: config.tag_id,
            template,
            params: collect_params(&config.next),
            client: Arc::new(DefinitionClient::new(
                SlotRegistry::scan(&config.next),
                config.next,
            )),
            legacy,
        })
    }

    pub fn template(&self) -> &TagAttribute {
        &self.template
    }

    pub fn registry(&self) -> &SlotRegistry {
        self.client.registry()
    }

    pub fn is_legacy(&self) -> bool {
        self.legacy
    }

    fn include_template(
        &self,
        ctx: &mut FaceletContext<'_>,
        parent: &mut Component,
    ) -> Result<(), FaceletError> {
        let path = self.template.value(ctx)?;
        if self.legacy && !self.template.is_literal() {
            self.track_template_path(ctx, &path);
        }
        ctx.include_fragment(parent, &path)
    }

    /// Compare the resolved path with the one saved by the previous build
    fn track_template_path(&self, ctx: &mut FaceletContext<'_>, path: &str) {
        let key = ctx.generate_unique_id(&self.tag_id);
        let Some(state) = ctx.state_coordinator() else {
            return;
        };

        if state.is_postback() {
            if let Some(previous) = state.restore_marker(&key) {
                if previous != path {
                    tracing::debug!(
                        tag = %key,
                        from = %previous,
                        to = %path,
                        "decorate template changed; marking for full state"
                    );
                    state.mark_full_state(&key);
                }
            }
        }
        state.save_marker(&key, path);
    }
}

impl FaceletHandler for DecorateHandler {
    fn apply(&self, ctx: &mut FaceletContext<'_>, parent: &mut Component) -> Result<(), FaceletError> {
        let client: Arc<dyn TemplateClient> = self.client.clone();
        ctx.with_template_client(client, ClientMode::Push, |ctx| match &self.params {
            Some(params) => ctx.with_scope(|ctx| {
                for param in params {
                    param.apply(ctx, parent)?;
                }
                self.include_template(ctx, parent)
            }),
            None => self.include_template(ctx, parent),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
