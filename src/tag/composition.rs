//! `ui:composition`: fills a template with the tag's definitions

use std::any::Any;
use std::sync::Arc;

use crate::template::{ClientMode, DefinitionClient, SlotRegistry, TemplateClient};
use crate::view::{Component, FaceletContext, FaceletError, ParameterSet};

use super::param::collect_params;
use super::{FaceletHandler, ParamHandler, TagAttribute, TagConfig};

/// Composition tag.
///
/// Without a `template` attribute the tag is transparent and simply applies its
/// body. With one, it layers its definitions over any enclosing compositions,
/// publishes its parameters under a unique id, and includes the template.
#[derive(Debug)]
pub struct CompositionHandler {
    tag_id: String,
    template: Option<TagAttribute>,
    params: Option<Vec<ParamHandler>>,
    client: Arc<DefinitionClient>,
    next: Arc<dyn FaceletHandler>,
}

impl CompositionHandler {
    pub fn new(config: TagConfig) -> Result<Self, FaceletError> {
        let template = config.attribute("template").cloned();
        let (registry, params) = if template.is_some() {
            (SlotRegistry::scan(&config.next), collect_params(&config.next))
        } else {
            (SlotRegistry::absent(), None)
        };

        Ok(Self {
            tag_id: config.tag_id,
            template,
            params,
            client: Arc::new(DefinitionClient::new(registry, config.next.clone())),
            next: config.next,
        })
    }

    pub fn template(&self) -> Option<&TagAttribute> {
        self.template.as_ref()
    }

    pub fn registry(&self) -> &SlotRegistry {
        self.client.registry()
    }

    pub fn params(&self) -> &[ParamHandler] {
        self.params.as_deref().unwrap_or_default()
    }

    /// True when the tag has no template and only renders its body
    pub fn is_pass_through(&self) -> bool {
        self.template.is_none()
    }
}

impl FaceletHandler for CompositionHandler {
    fn apply(&self, ctx: &mut FaceletContext<'_>, parent: &mut Component) -> Result<(), FaceletError> {
        let Some(template) = &self.template else {
            return self.next.apply(ctx, parent);
        };

        let client: Arc<dyn TemplateClient> = self.client.clone();
        ctx.with_template_client(client, ClientMode::Extend, |ctx| {
            let path = template.value(ctx)?;
            match &self.params {
                Some(params) => {
                    let mut published = ParameterSet::new(ctx.generate_unique_id(&self.tag_id));
                    for param in params {
                        param.apply_to(ctx, &mut published)?;
                    }
                    ctx.with_parameters(published, |ctx| ctx.include_fragment(parent, &path))
                }
                None => ctx.include_fragment(parent, &path),
            }
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
