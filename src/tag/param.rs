//! `ui:param`: binds a name to a deferred value

use std::any::Any;
use std::sync::Arc;

use serde_json::Value;

use crate::view::{Component, FaceletContext, FaceletError, ParameterSet, ValueBinding};

use super::{find_next_by_type, FaceletHandler, TagAttribute, TagConfig};

/// Name/value pair installed into whatever variable scope is active
#[derive(Debug, Clone)]
pub struct ParamHandler {
    tag: String,
    name: TagAttribute,
    value: TagAttribute,
}

impl ParamHandler {
    pub fn new(config: TagConfig) -> Result<Self, FaceletError> {
        Ok(Self {
            tag: config.tag.name.to_string(),
            name: config.required_attribute("name")?.clone(),
            value: config.required_attribute("value")?.clone(),
        })
    }

    /// Evaluate the parameter name
    pub fn name(&self, ctx: &FaceletContext<'_>) -> Result<String, FaceletError> {
        let name = self.name.value(ctx)?;
        if name.trim().is_empty() {
            return Err(FaceletError::InvalidAttribute {
                tag: self.tag.clone(),
                attribute: "name".to_string(),
                location: self.name.location().clone(),
                reason: format!("'{}' evaluated to an empty name", self.name.raw()),
            });
        }
        Ok(name)
    }

    /// The value as a late-bound producer tied to the current environment
    pub fn binding(&self, ctx: &FaceletContext<'_>) -> ValueBinding {
        if self.value.is_literal() {
            ValueBinding::Value(Value::String(self.value.raw().to_string()))
        } else {
            ValueBinding::deferred(self.value.expression().clone(), ctx.environment())
        }
    }

    /// Evaluate into `set` instead of the variable scope
    pub fn apply_to(&self, ctx: &FaceletContext<'_>, set: &mut ParameterSet) -> Result<(), FaceletError> {
        let name = self.name(ctx)?;
        set.set(name, self.binding(ctx));
        Ok(())
    }
}

impl FaceletHandler for ParamHandler {
    fn apply(&self, ctx: &mut FaceletContext<'_>, _parent: &mut Component) -> Result<(), FaceletError> {
        let name = self.name(ctx)?;
        let binding = self.binding(ctx);
        tracing::trace!(param = %name, "binding parameter in current scope");
        ctx.set_variable(name, binding);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `ui:param` children directly under `next`, or `None` when there are none
pub(crate) fn collect_params(next: &Arc<dyn FaceletHandler>) -> Option<Vec<ParamHandler>> {
    let params: Vec<ParamHandler> = find_next_by_type::<ParamHandler>(next)
        .into_iter()
        .cloned()
        .collect();
    (!params.is_empty()).then_some(params)
}
