//! Abstract Syntax Tree types for the view markup

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Valid identifier (alphanumeric, underscore and hyphen, starts with letter/_)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Element name with an optional namespace prefix (`ui:insert`, `div`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<Identifier>,
    pub local: Identifier,
}

impl QName {
    pub fn new(prefix: Option<&str>, local: &str) -> Self {
        Self {
            prefix: prefix.map(Identifier::new),
            local: Identifier::new(local),
        }
    }

    /// Whether this name belongs to the given namespace prefix
    pub fn is_in(&self, prefix: &str) -> bool {
        self.prefix.as_ref().is_some_and(|p| p.as_str() == prefix)
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// Root AST node - a complete view fragment
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub nodes: Vec<Spanned<Node>>,
}

/// A node in a fragment
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Tag with attributes and nested content
    Element(Element),
    /// Literal text, possibly containing `#{...}` expressions
    Text(String),
}

/// An element: `name [attr: "value", ...] { children }`
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: Spanned<QName>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Spanned<Node>>,
}

impl Element {
    /// Look up an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name.node.as_str() == name)
    }
}

/// `name: "value"` pair inside an attribute block
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: Spanned<Identifier>,
    pub value: Spanned<String>,
}
