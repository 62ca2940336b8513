//! Named-slot registry built from a tag's `ui:define` children

use std::collections::HashMap;
use std::sync::Arc;

use crate::tag::{find_next_by_type, DefineHandler, FaceletHandler};
use crate::view::{Component, FaceletContext, FaceletError};

use super::client::TemplateClient;

/// Slot name to definition, fixed once the owning handler is built
#[derive(Debug, Clone, Default)]
pub struct SlotRegistry {
    /// `None` when the tag declares no definitions at all
    definitions: Option<HashMap<String, Arc<DefineHandler>>>,
}

impl SlotRegistry {
    /// Registry with no definitions
    pub fn absent() -> Self {
        Self::default()
    }

    /// Collect the `ui:define` handlers directly under `next`.
    ///
    /// Nested tags are not searched. When two definitions share a name the
    /// later one wins.
    pub fn scan(next: &Arc<dyn FaceletHandler>) -> Self {
        let defines = find_next_by_type::<DefineHandler>(next);
        if defines.is_empty() {
            return Self::absent();
        }

        let mut definitions = HashMap::with_capacity(defines.len());
        for define in defines {
            let previous = definitions.insert(define.name().to_string(), Arc::new(define.clone()));
            if previous.is_some() {
                tracing::warn!(slot = define.name(), "duplicate ui:define; the last one wins");
            }
        }
        Self {
            definitions: Some(definitions),
        }
    }

    pub fn is_absent(&self) -> bool {
        self.definitions.is_none()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<DefineHandler>> {
        self.definitions.as_ref()?.get(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.as_ref().map_or(0, |d| d.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slot names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .definitions
            .iter()
            .flat_map(|d| d.keys().map(|k| k.as_str()))
            .collect();
        names.sort_unstable();
        names
    }
}

/// Client for composition and decoration tags: fills slots from the tag's
/// definitions and answers an unnamed request with the tag's whole body
#[derive(Debug)]
pub struct DefinitionClient {
    registry: SlotRegistry,
    body: Arc<dyn FaceletHandler>,
}

impl DefinitionClient {
    pub fn new(registry: SlotRegistry, body: Arc<dyn FaceletHandler>) -> Self {
        Self { registry, body }
    }

    pub fn registry(&self) -> &SlotRegistry {
        &self.registry
    }
}

impl TemplateClient for DefinitionClient {
    fn apply_client(
        &self,
        ctx: &mut FaceletContext<'_>,
        parent: &mut Component,
        name: Option<&str>,
    ) -> Result<bool, FaceletError> {
        match name {
            Some(name) => match self.registry.get(name) {
                Some(define) => {
                    define.apply_definition(ctx, parent)?;
                    Ok(true)
                }
                None => Ok(false),
            },
            None => {
                self.body.apply(ctx, parent)?;
                Ok(true)
            }
        }
    }
}
