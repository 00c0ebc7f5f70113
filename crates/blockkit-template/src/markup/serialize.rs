/*
 * markup/serialize.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Write a node tree back out as markup text.

use super::node::{Element, Node, is_raw_text_element};
use quick_xml::escape::partial_escape;

/// Serialize a sequence of nodes.
pub fn serialize_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, false, &mut out);
    }
    out
}

/// Serialize a single node.
pub fn serialize_node(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, false, &mut out);
    out
}

fn write_node(node: &Node, raw_text: bool, out: &mut String) {
    match node {
        Node::Element(element) => write_element(element, out),
        Node::Text(text) if raw_text => out.push_str(&text.content),
        Node::Text(text) => out.push_str(&partial_escape(text.content.as_str())),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(&comment.text);
            out.push_str("-->");
        }
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for attr in &element.attributes {
        out.push(' ');
        out.push_str(&attr.name);
        if let Some(value) = &attr.value {
            out.push_str("=\"");
            out.push_str(&partial_escape(value.as_str()).replace('"', "&quot;"));
            out.push('"');
        }
    }

    if element.is_void() {
        out.push('>');
        return;
    }
    if element.self_closing && element.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    let raw_text = is_raw_text_element(&element.name);
    for child in &element.children {
        write_node(child, raw_text, out);
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_markup;
    use pretty_assertions::assert_eq;

    fn roundtrip(source: &str) -> String {
        serialize_nodes(&parse_markup(source).unwrap().nodes)
    }

    #[test]
    fn test_well_formed_markup_is_preserved() {
        let source = r#"<div class="card"><h2>Title</h2><!-- c --><p>Body<br>more</p><x-icon/></div>"#;
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_text_and_attributes_are_escaped() {
        let el = Element::new("p")
            .with_attribute("title", "say \"hi\" & <go>")
            .with_child(Node::text("a < b & c"));
        assert_eq!(
            serialize_node(&Node::Element(el)),
            r#"<p title="say &quot;hi&quot; &amp; &lt;go&gt;">a &lt; b &amp; c</p>"#
        );
    }

    #[test]
    fn test_raw_text_elements_not_escaped() {
        assert_eq!(
            roundtrip("<style>a > b { color: red }</style>"),
            "<style>a > b { color: red }</style>"
        );
    }

    #[test]
    fn test_repairs_show_in_output() {
        assert_eq!(roundtrip("<ul><li>one</ul>"), "<ul><li>one</li></ul>");
        assert_eq!(roundtrip("<input disabled>"), "<input disabled>");
    }
}
