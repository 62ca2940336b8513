//! Handlers for plain markup: elements outside the `ui` namespace and text

use std::any::Any;
use std::sync::Arc;

use crate::el::ValueExpression;
use crate::view::{Component, FaceletContext, FaceletError};

use super::{FaceletHandler, TagAttribute, TagConfig};

/// Appends evaluated text to the parent
#[derive(Debug, Clone)]
pub struct TextHandler {
    text: ValueExpression,
}

impl TextHandler {
    pub fn new(text: ValueExpression) -> Self {
        Self { text }
    }

    /// Text with no expressions
    pub fn literal(text: &str) -> Self {
        Self::new(ValueExpression::literal(text))
    }
}

impl FaceletHandler for TextHandler {
    fn apply(&self, ctx: &mut FaceletContext<'_>, parent: &mut Component) -> Result<(), FaceletError> {
        let text = ctx.evaluate_string(&self.text)?;
        if !text.is_empty() {
            parent.push(Component::text(text));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Emits an output element and applies the tag's body inside it
#[derive(Debug)]
pub struct ElementHandler {
    name: String,
    attributes: Vec<TagAttribute>,
    next: Arc<dyn FaceletHandler>,
}

impl ElementHandler {
    pub fn new(config: TagConfig) -> Self {
        Self {
            name: config.tag.name.to_string(),
            attributes: config.tag.attributes,
            next: config.next,
        }
    }
}

impl FaceletHandler for ElementHandler {
    fn apply(&self, ctx: &mut FaceletContext<'_>, parent: &mut Component) -> Result<(), FaceletError> {
        let attributes = self
            .attributes
            .iter()
            .map(|attr| Ok((attr.name().to_string(), attr.value(ctx)?)))
            .collect::<Result<Vec<_>, FaceletError>>()?;
        let mut element = Component::element(self.name.clone(), attributes);
        self.next.apply(ctx, &mut element)?;
        parent.push(element);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
