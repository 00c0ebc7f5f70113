/*
 * markup/mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Markup node tree, lenient parser and serializer.

mod node;
mod parser;
mod serialize;

pub use node::{
    Attribute, Comment, Element, Node, RAW_TEXT_ELEMENTS, Text, VOID_ELEMENTS,
    is_raw_text_element, is_void_element,
};
pub use parser::{MAX_NESTING_DEPTH, MarkupIssue, ParsedMarkup, parse_markup};
pub use serialize::{serialize_node, serialize_nodes};
