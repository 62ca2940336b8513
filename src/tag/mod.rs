//! Tag handlers
//!
//! Every node of a compiled fragment is a [`FaceletHandler`]. Tag handlers are
//! built once from a [`TagConfig`] and shared by all traversals; anything that
//! varies per traversal lives in the [`FaceletContext`].

mod composition;
mod decorate;
mod define;
mod include;
mod insert;
mod markup;
mod param;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::el::ValueExpression;
use crate::parser::ast::{QName, Span};
use crate::view::{Component, FaceletContext, FaceletError};

pub use composition::CompositionHandler;
pub use decorate::DecorateHandler;
pub use define::DefineHandler;
pub use include::{IncludeHandler, DEV_ERROR_INCLUDE_SENTINEL, DIAGNOSTIC_TEMPLATE_PATH};
pub use insert::InsertHandler;
pub use markup::{ElementHandler, TextHandler};
pub use param::ParamHandler;

/// A node of a compiled fragment
pub trait FaceletHandler: fmt::Debug + Send + Sync + 'static {
    /// Apply this node to `parent` within the current traversal
    fn apply(&self, ctx: &mut FaceletContext<'_>, parent: &mut Component) -> Result<(), FaceletError>;

    fn as_any(&self) -> &dyn Any;
}

/// Sequence of sibling handlers applied in order
#[derive(Debug, Default)]
pub struct CompositeHandler {
    children: Vec<Arc<dyn FaceletHandler>>,
}

impl CompositeHandler {
    pub fn new(children: Vec<Arc<dyn FaceletHandler>>) -> Self {
        Self { children }
    }

    pub fn children(&self) -> &[Arc<dyn FaceletHandler>] {
        &self.children
    }
}

impl FaceletHandler for CompositeHandler {
    fn apply(&self, ctx: &mut FaceletContext<'_>, parent: &mut Component) -> Result<(), FaceletError> {
        for child in &self.children {
            child.apply(ctx, parent)?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Handlers of type `T` that are `next` itself or its immediate children
pub fn find_next_by_type<T: FaceletHandler>(next: &Arc<dyn FaceletHandler>) -> Vec<&T> {
    if let Some(found) = next.as_any().downcast_ref::<T>() {
        return vec![found];
    }
    match next.as_any().downcast_ref::<CompositeHandler>() {
        Some(composite) => composite
            .children()
            .iter()
            .filter_map(|child| child.as_any().downcast_ref::<T>())
            .collect(),
        None => Vec::new(),
    }
}

/// Where a tag was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: Arc<str>,
    pub line: usize,
    pub column: usize,
    pub span: Span,
}

impl Location {
    /// Location of `span` within `source`, with 1-based line and column
    pub fn from_span(path: Arc<str>, source: &str, span: Span) -> Self {
        let before = &source[..span.start.min(source.len())];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rfind('\n')
            .map_or(before.chars().count(), |nl| before[nl + 1..].chars().count())
            + 1;
        Self {
            path,
            line,
            column,
            span,
        }
    }

    /// Placeholder for handlers built in code rather than from source
    pub fn unknown() -> Self {
        Self {
            path: Arc::from("<generated>"),
            line: 0,
            column: 0,
            span: 0..0,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path, self.line, self.column)
    }
}

/// An attribute value, parsed once and evaluated per traversal
#[derive(Debug, Clone)]
pub struct TagAttribute {
    name: String,
    expression: ValueExpression,
    location: Location,
}

impl TagAttribute {
    pub fn new(name: impl Into<String>, value: &str, location: Location) -> Result<Self, FaceletError> {
        Ok(Self {
            name: name.into(),
            expression: ValueExpression::parse(value)?,
            location,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when the value contains no expression
    pub fn is_literal(&self) -> bool {
        self.expression.is_literal()
    }

    /// The value as written
    pub fn raw(&self) -> &str {
        self.expression.source()
    }

    pub fn expression(&self) -> &ValueExpression {
        &self.expression
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Evaluate to text in the current traversal
    pub fn value(&self, ctx: &FaceletContext<'_>) -> Result<String, FaceletError> {
        Ok(ctx.evaluate_string(&self.expression)?)
    }
}

/// Name, attributes and location of a tag occurrence
#[derive(Debug, Clone)]
pub struct Tag {
    pub name: QName,
    pub location: Location,
    pub attributes: Vec<TagAttribute>,
}

impl Tag {
    pub fn attribute(&self, name: &str) -> Option<&TagAttribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }
}

/// Everything a tag handler receives when it is built
#[derive(Debug, Clone)]
pub struct TagConfig {
    pub tag: Tag,
    /// Stable id of this tag occurrence within its fragment
    pub tag_id: String,
    /// Handler for the tag's nested content
    pub next: Arc<dyn FaceletHandler>,
}

impl TagConfig {
    pub fn attribute(&self, name: &str) -> Option<&TagAttribute> {
        self.tag.attribute(name)
    }

    pub fn required_attribute(&self, name: &str) -> Result<&TagAttribute, FaceletError> {
        self.attribute(name)
            .ok_or_else(|| FaceletError::MissingAttribute {
                tag: self.tag.name.to_string(),
                attribute: name.to_string(),
                location: self.tag.location.clone(),
            })
    }

    /// Plain-text attribute value; expressions are rejected
    pub fn literal_attribute(&self, name: &str) -> Result<Option<String>, FaceletError> {
        match self.attribute(name) {
            None => Ok(None),
            Some(attr) if attr.is_literal() => Ok(Some(attr.raw().to_string())),
            Some(attr) => Err(FaceletError::NonLiteralAttribute {
                tag: self.tag.name.to_string(),
                attribute: name.to_string(),
                location: attr.location().clone(),
            }),
        }
    }
}
