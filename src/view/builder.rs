//! Compiles a parsed fragment into its handler tree
//!
//! Each element of the `ui` prefix becomes the matching tag handler; other
//! elements and text become output handlers. Every element gets a tag id of
//! the form `<fragment>:<n>`, where `n` counts elements in document order.

use std::sync::Arc;

use crate::el::ValueExpression;
use crate::parser::ast::{Document, Element, Node, Spanned};
use crate::tag::{
    CompositeHandler, CompositionHandler, DecorateHandler, DefineHandler, ElementHandler,
    FaceletHandler, IncludeHandler, InsertHandler, Location, ParamHandler, Tag, TagAttribute,
    TagConfig, TextHandler,
};

use super::config::ViewConfig;
use super::error::FaceletError;

/// Build the handler tree for `document`, parsed from `source` at `path`
pub fn compile(
    path: Arc<str>,
    source: &str,
    document: &Document,
    config: &ViewConfig,
) -> Result<Arc<dyn FaceletHandler>, FaceletError> {
    let mut builder = FragmentBuilder {
        path,
        source,
        config,
        next_id: 0,
    };

    if config.trim_outside_composition {
        if let Some(composition) = first_composition(&document.nodes) {
            tracing::trace!(fragment = %builder.path, "trimming content outside ui:composition");
            return builder.build_node(composition);
        }
    }
    builder.build_nodes(&document.nodes)
}

/// First `ui:composition`, depth first in document order
fn first_composition(nodes: &[Spanned<Node>]) -> Option<&Spanned<Node>> {
    nodes.iter().find_map(|node| match &node.node {
        Node::Element(element) if is_ui(element, "composition") => Some(node),
        Node::Element(element) => first_composition(&element.children),
        Node::Text(_) => None,
    })
}

fn is_ui(element: &Element, local: &str) -> bool {
    element.name.node.is_in("ui") && element.name.node.local.as_str() == local
}

struct FragmentBuilder<'s> {
    path: Arc<str>,
    source: &'s str,
    config: &'s ViewConfig,
    next_id: usize,
}

impl FragmentBuilder<'_> {
    /// A single node is used directly; siblings are wrapped in a composite
    fn build_nodes(&mut self, nodes: &[Spanned<Node>]) -> Result<Arc<dyn FaceletHandler>, FaceletError> {
        let mut handlers = nodes
            .iter()
            .map(|node| self.build_node(node))
            .collect::<Result<Vec<_>, _>>()?;

        if handlers.len() == 1 {
            if let Some(only) = handlers.pop() {
                return Ok(only);
            }
        }
        Ok(Arc::new(CompositeHandler::new(handlers)))
    }

    fn build_node(&mut self, node: &Spanned<Node>) -> Result<Arc<dyn FaceletHandler>, FaceletError> {
        match &node.node {
            Node::Text(text) => Ok(Arc::new(TextHandler::new(ValueExpression::parse(text)?))),
            Node::Element(element) => self.build_element(element, node),
        }
    }

    fn build_element(
        &mut self,
        element: &Element,
        node: &Spanned<Node>,
    ) -> Result<Arc<dyn FaceletHandler>, FaceletError> {
        let tag_id = format!("{}:{}", self.path, self.next_id);
        self.next_id += 1;

        let location = self.location(node.span.clone());
        let attributes = element
            .attributes
            .iter()
            .map(|attr| {
                TagAttribute::new(
                    attr.name.node.as_str(),
                    &attr.value.node,
                    self.location(attr.value.span.clone()),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let config = TagConfig {
            tag: Tag {
                name: element.name.node.clone(),
                location,
                attributes,
            },
            tag_id,
            next: self.build_nodes(&element.children)?,
        };

        if !element.name.node.is_in("ui") {
            return Ok(Arc::new(ElementHandler::new(config)));
        }

        let handler: Arc<dyn FaceletHandler> = match element.name.node.local.as_str() {
            "composition" => Arc::new(CompositionHandler::new(config)?),
            "decorate" => Arc::new(DecorateHandler::new(config, self.config.legacy_decorate)?),
            "define" => Arc::new(DefineHandler::new(config)?),
            "include" => Arc::new(IncludeHandler::new(config)?),
            "insert" => Arc::new(InsertHandler::new(config)?),
            "param" => Arc::new(ParamHandler::new(config)?),
            _ => {
                return Err(FaceletError::UnknownTag {
                    tag: config.tag.name.to_string(),
                    location: config.tag.location,
                })
            }
        };
        Ok(handler)
    }

    fn location(&self, span: crate::parser::ast::Span) -> Location {
        Location::from_span(self.path.clone(), self.source, span)
    }
}
