/*
 * markup/node.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Markup node tree.
//!
//! The same node types describe both a parsed template and the concrete tree
//! a render produces. Every node remembers the span of the template source it
//! came from, so diagnostics raised while rendering a clone still point at the
//! original markup.

use blockkit_diagnostics::SourceSpan;

/// Elements that never have children or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is raw text rather than markup.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

pub fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

/// A node in a markup tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(Text),
    Comment(Comment),
}

/// An element with attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Tag name as written in the source.
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    /// Written as `<name/>` in the source.
    pub self_closing: bool,
    pub span: SourceSpan,
}

/// An attribute; `value` is `None` for valueless attributes like `disabled`.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
    pub span: SourceSpan,
}

/// Text content (entities already decoded).
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub content: String,
    pub span: SourceSpan,
}

/// A markup comment, kept so it survives a render unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    pub span: SourceSpan,
}

impl Node {
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(Text {
            content: content.into(),
            span: SourceSpan::default(),
        })
    }

    pub fn span(&self) -> SourceSpan {
        match self {
            Node::Element(e) => e.span,
            Node::Text(t) => t.span,
            Node::Comment(c) => c.span,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(t) => Some(&t.content),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(t) => t.content.clone(),
            Node::Element(e) => e.children.iter().map(Node::text_content).collect(),
            Node::Comment(_) => String::new(),
        }
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: false,
            span: SourceSpan::default(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Attribute value; valueless attributes read as `""`.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attribute(name)
            .map(|a| a.value.as_deref().unwrap_or_default())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = Some(value.into());
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute {
                name,
                value,
                span: SourceSpan::default(),
            }),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<Attribute> {
        let position = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(position))
    }

    pub fn is_void(&self) -> bool {
        is_void_element(&self.name)
    }

    /// Child elements, skipping text and comments.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }
}
