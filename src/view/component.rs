//! Output tree produced by applying handlers

use std::fmt::Write;

/// What a [`Component`] node represents
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    /// Container for a whole view
    Root,
    /// Markup element with evaluated attributes
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    /// Text content
    Text(String),
}

/// Node in the built view; handlers append children to the node they are given
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub kind: ComponentKind,
    pub children: Vec<Component>,
}

impl Default for Component {
    fn default() -> Self {
        Self::root()
    }
}

impl Component {
    pub fn root() -> Self {
        Self {
            kind: ComponentKind::Root,
            children: Vec::new(),
        }
    }

    pub fn element(name: impl Into<String>, attributes: Vec<(String, String)>) -> Self {
        Self {
            kind: ComponentKind::Element {
                name: name.into(),
                attributes,
            },
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: ComponentKind::Text(text.into()),
            children: Vec::new(),
        }
    }

    /// Append a child
    pub fn push(&mut self, child: Component) {
        self.children.push(child);
    }

    /// Element name, if this is an element
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            ComponentKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Attribute value, if this is an element carrying it
    pub fn attribute(&self, key: &str) -> Option<&str> {
        match &self.kind {
            ComponentKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Concatenated text of this node and all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let ComponentKind::Text(text) = &self.kind {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Depth-first search for the first element with `name`
    pub fn find_element(&self, name: &str) -> Option<&Component> {
        if self.name() == Some(name) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_element(name))
    }

    /// Serialise as XML-like markup
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        match &self.kind {
            ComponentKind::Root => {
                for child in &self.children {
                    child.write_markup(out);
                }
            }
            ComponentKind::Text(text) => out.push_str(&escape(text, false)),
            ComponentKind::Element { name, attributes } => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attributes {
                    let _ = write!(out, " {}=\"{}\"", key, escape(value, true));
                }
                if self.children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for child in &self.children {
                    child.write_markup(out);
                }
                let _ = write!(out, "</{}>", name);
            }
        }
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
