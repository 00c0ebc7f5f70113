/*
 * markup/parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Lenient markup parser.
//!
//! Template markup is HTML as people actually write it, so the parser repairs
//! instead of rejecting: void elements need no closing tag, attribute values
//! may be quoted, unquoted or missing, stray closing tags are dropped and
//! anything still open at the end of input is closed there. Each repair is
//! recorded as a [`MarkupIssue`] so callers can surface it as a diagnostic or,
//! in strict mode, refuse the template.
//!
//! The only hard failure is nesting deeper than [`MAX_NESTING_DEPTH`].

use super::node::{Attribute, Comment, Element, Node, Text, is_raw_text_element, is_void_element};
use crate::error::{TemplateError, TemplateResult};
use blockkit_diagnostics::SourceSpan;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use std::borrow::Cow;

/// Deepest element nesting the parser accepts.
pub const MAX_NESTING_DEPTH: usize = 512;

/// A repair the parser made to malformed markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupIssue {
    pub message: String,
    pub span: SourceSpan,
}

/// Result of parsing a template's markup.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMarkup {
    pub nodes: Vec<Node>,
    pub issues: Vec<MarkupIssue>,
}

/// Parse markup into a node tree, repairing what can be repaired.
pub fn parse_markup(source: &str) -> TemplateResult<ParsedMarkup> {
    MarkupParser::new(source).parse()
}

/// Internal parser state.
struct MarkupParser<'a> {
    source: &'a str,

    /// Byte offset of the next unread character.
    pos: usize,

    /// Elements opened but not yet closed.
    stack: Vec<BuildNode>,

    /// Completed top-level nodes.
    roots: Vec<Node>,

    issues: Vec<MarkupIssue>,
}

/// An element being constructed during parsing.
struct BuildNode {
    name: String,
    attributes: Vec<Attribute>,

    /// Byte offset of the `<` that opened this element.
    start_offset: usize,

    children: Vec<Node>,
}

/// What the start-tag scanner found.
struct StartTag {
    name: String,
    attributes: Vec<Attribute>,
    self_closing: bool,
}

impl<'a> MarkupParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            stack: Vec::new(),
            roots: Vec::new(),
            issues: Vec::new(),
        }
    }

    fn parse(mut self) -> TemplateResult<ParsedMarkup> {
        while self.pos < self.source.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                self.parse_comment();
            } else if self.is_tag_open(self.pos) {
                if rest.starts_with("</") {
                    self.parse_end_tag();
                } else if rest.starts_with("<!") || rest.starts_with("<?") {
                    self.skip_declaration();
                } else {
                    self.parse_start_tag()?;
                }
            } else {
                self.parse_text();
            }
        }

        while let Some(node) = self.stack.last() {
            let span = SourceSpan::new(node.start_offset, node.start_offset + node.name.len() + 1);
            let message = format!("<{}> is never closed", node.name);
            self.issue(message, span);
            self.close_top(self.source.len());
        }

        Ok(ParsedMarkup {
            nodes: self.roots,
            issues: self.issues,
        })
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(offset).copied()
    }

    /// `<` followed by a name, `/name`, `!` or `?`.
    fn is_tag_open(&self, at: usize) -> bool {
        if self.peek_byte(at) != Some(b'<') {
            return false;
        }
        match self.peek_byte(at + 1) {
            Some(b'/') => self
                .peek_byte(at + 2)
                .is_some_and(|b| b.is_ascii_alphabetic()),
            Some(b'!') | Some(b'?') => true,
            Some(b) => b.is_ascii_alphabetic(),
            None => false,
        }
    }

    fn issue(&mut self, message: impl Into<String>, span: SourceSpan) {
        self.issues.push(MarkupIssue {
            message: message.into(),
            span,
        });
    }

    fn push_node(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn close_top(&mut self, end_offset: usize) {
        let Some(node) = self.stack.pop() else {
            return;
        };
        let element = Element {
            name: node.name,
            attributes: node.attributes,
            children: node.children,
            self_closing: false,
            span: SourceSpan::new(node.start_offset, end_offset),
        };
        self.push_node(Node::Element(element));
    }

    fn parse_text(&mut self) {
        let start = self.pos;
        // The first character is never a tag opener, or we would not be here.
        let mut end = start + self.rest().chars().next().map_or(1, char::len_utf8);
        while end < self.source.len() {
            match self.source[end..].find('<') {
                Some(i) => {
                    end += i;
                    if self.is_tag_open(end) {
                        break;
                    }
                    end += 1;
                }
                None => end = self.source.len(),
            }
        }
        let raw = &self.source[start..end];
        self.pos = end;
        self.push_node(Node::Text(Text {
            content: decode_entities(raw).into_owned(),
            span: SourceSpan::new(start, end),
        }));
    }

    fn parse_comment(&mut self) {
        let start = self.pos;
        let body_start = start + 4;
        let (text, end) = match self.source[body_start..].find("-->") {
            Some(i) => (&self.source[body_start..body_start + i], body_start + i + 3),
            None => {
                self.issue("Comment is never closed", SourceSpan::new(start, body_start));
                (&self.source[body_start..], self.source.len())
            }
        };
        self.pos = end;
        self.push_node(Node::Comment(Comment {
            text: text.to_string(),
            span: SourceSpan::new(start, end),
        }));
    }

    /// `<!DOCTYPE ...>` and `<?...?>` carry nothing a template needs.
    fn skip_declaration(&mut self) {
        self.pos = match self.rest().find('>') {
            Some(i) => self.pos + i + 1,
            None => self.source.len(),
        };
    }

    fn read_name(&mut self) -> &'a str {
        let start = self.pos;
        let len = self
            .rest()
            .find(|c: char| !(c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')))
            .unwrap_or(self.rest().len());
        self.pos += len;
        &self.source[start..start + len]
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.source.len() - trimmed.len();
    }

    fn parse_start_tag(&mut self) -> TemplateResult<()> {
        let start = self.pos;
        self.pos += 1;
        let tag = self.scan_start_tag(start);
        let end = self.pos;

        if is_void_element(&tag.name) || tag.self_closing {
            self.push_node(Node::Element(Element {
                name: tag.name,
                attributes: tag.attributes,
                children: Vec::new(),
                self_closing: tag.self_closing,
                span: SourceSpan::new(start, end),
            }));
            return Ok(());
        }

        if is_raw_text_element(&tag.name) {
            let children = self.read_raw_text(&tag.name, start);
            self.push_node(Node::Element(Element {
                name: tag.name,
                attributes: tag.attributes,
                children,
                self_closing: false,
                span: SourceSpan::new(start, self.pos),
            }));
            return Ok(());
        }

        if self.stack.len() >= MAX_NESTING_DEPTH {
            return Err(TemplateError::NestingTooDeep {
                max_depth: MAX_NESTING_DEPTH,
                span: SourceSpan::new(start, end),
            });
        }

        self.stack.push(BuildNode {
            name: tag.name,
            attributes: tag.attributes,
            start_offset: start,
            children: Vec::new(),
        });
        Ok(())
    }

    /// Scan a start tag's name and attributes, leaving `pos` after its `>`.
    fn scan_start_tag(&mut self, start: usize) -> StartTag {
        let name = self.read_name().to_string();
        let mut attributes: Vec<Attribute> = Vec::new();

        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                self.issue(
                    format!("<{name}> tag is never finished"),
                    SourceSpan::new(start, self.pos),
                );
                return StartTag {
                    name,
                    attributes,
                    self_closing: false,
                };
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                return StartTag {
                    name,
                    attributes,
                    self_closing: true,
                };
            }
            if rest.starts_with('>') {
                self.pos += 1;
                return StartTag {
                    name,
                    attributes,
                    self_closing: false,
                };
            }

            let attr_start = self.pos;
            let name_len = rest
                .find(|c: char| c.is_whitespace() || matches!(c, '=' | '>' | '/' | '"' | '\''))
                .unwrap_or(rest.len());
            if name_len == 0 {
                let skipped = rest.chars().next().map_or(1, char::len_utf8);
                self.issue(
                    format!("Unexpected `{}` in <{name}> tag", &rest[..skipped]),
                    SourceSpan::new(attr_start, attr_start + skipped),
                );
                self.pos += skipped;
                continue;
            }
            let attr_name = rest[..name_len].to_string();
            self.pos += name_len;

            let value = self.read_attribute_value(&name);
            let span = SourceSpan::new(attr_start, self.pos);
            if attributes.iter().any(|a| a.name == attr_name) {
                self.issue(
                    format!("Duplicate attribute `{attr_name}` on <{name}>; the first one wins"),
                    span,
                );
                continue;
            }
            attributes.push(Attribute {
                name: attr_name,
                value,
                span,
            });
        }
    }

    fn read_attribute_value(&mut self, tag_name: &str) -> Option<String> {
        let before = self.pos;
        self.skip_whitespace();
        if !self.rest().starts_with('=') {
            self.pos = before;
            return None;
        }
        self.pos += 1;
        self.skip_whitespace();

        let rest = self.rest();
        match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &rest[1..];
                match body.find(quote) {
                    Some(i) => {
                        self.pos += i + 2;
                        Some(decode_entities(&body[..i]).into_owned())
                    }
                    None => {
                        self.issue(
                            format!("Attribute value in <{tag_name}> is never closed"),
                            SourceSpan::new(before, self.source.len()),
                        );
                        self.pos = self.source.len();
                        Some(decode_entities(body).into_owned())
                    }
                }
            }
            _ => {
                let len = rest
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                self.pos += len;
                Some(decode_entities(&rest[..len]).into_owned())
            }
        }
    }

    /// Read `script`/`style` content verbatim up to the matching close tag.
    fn read_raw_text(&mut self, name: &str, start: usize) -> Vec<Node> {
        let content_start = self.pos;
        let closing = format!("</{}", name.to_ascii_lowercase());
        let lowered = self.rest().to_ascii_lowercase();

        let (content_end, after) = match lowered.find(&closing) {
            Some(i) => {
                let close_at = content_start + i;
                let after = match self.source[close_at..].find('>') {
                    Some(j) => close_at + j + 1,
                    None => self.source.len(),
                };
                (close_at, after)
            }
            None => {
                self.issue(
                    format!("<{name}> is never closed"),
                    SourceSpan::new(start, content_start),
                );
                (self.source.len(), self.source.len())
            }
        };

        self.pos = after;
        if content_end == content_start {
            return Vec::new();
        }
        vec![Node::Text(Text {
            content: self.source[content_start..content_end].to_string(),
            span: SourceSpan::new(content_start, content_end),
        })]
    }

    fn parse_end_tag(&mut self) {
        let start = self.pos;
        self.pos += 2;
        let name = self.read_name().to_string();
        match self.rest().find('>') {
            Some(i) => self.pos += i + 1,
            None => {
                self.issue(
                    format!("</{name}> tag is never finished"),
                    SourceSpan::new(start, self.source.len()),
                );
                self.pos = self.source.len();
            }
        }
        let end = self.pos;

        let Some(open_index) = self
            .stack
            .iter()
            .rposition(|node| node.name.eq_ignore_ascii_case(&name))
        else {
            self.issue(
                format!("Closing tag </{name}> has no matching open element and was ignored"),
                SourceSpan::new(start, end),
            );
            return;
        };

        while self.stack.len() > open_index + 1 {
            if let Some(node) = self.stack.last() {
                let message = format!("<{}> is closed implicitly by </{name}>", node.name);
                self.issue(message, SourceSpan::new(start, end));
            }
            self.close_top(start);
        }
        self.close_top(end);
    }
}

/// Decode character references one at a time, keeping unknown ones verbatim.
fn decode_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let entity_len = tail[1..].find(';').filter(|&len| {
            len > 0
                && len <= 32
                && tail[1..1 + len]
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '#')
        });
        match entity_len {
            Some(len) => {
                let entity = &tail[..len + 2];
                match unescape_with(entity, resolve_html5_entity) {
                    Ok(decoded) => out.push_str(&decoded),
                    Err(_) => out.push_str(entity),
                }
                rest = &tail[len + 2..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_ok(source: &str) -> ParsedMarkup {
        parse_markup(source).unwrap()
    }

    fn root_element(parsed: &ParsedMarkup) -> &Element {
        parsed.nodes[0].as_element().unwrap()
    }

    #[test]
    fn test_nested_elements_and_text() {
        let parsed = parse_ok("<ul><li>a</li><li>b</li></ul>");
        assert!(parsed.issues.is_empty());
        let ul = root_element(&parsed);
        assert_eq!(ul.name, "ul");
        assert_eq!(ul.children.len(), 2);
        assert_eq!(ul.span, SourceSpan::new(0, 29));
        assert_eq!(ul.children[1].text_content(), "b");
    }

    #[test]
    fn test_attribute_forms() {
        let parsed = parse_ok(r#"<input type=checkbox checked value='a "b"' data-x="1">"#);
        let input = root_element(&parsed);
        assert!(input.children.is_empty());
        assert_eq!(input.get_attribute("type"), Some("checkbox"));
        assert_eq!(input.attribute("checked").unwrap().value, None);
        assert_eq!(input.get_attribute("value"), Some(r#"a "b""#));
        assert_eq!(input.get_attribute("data-x"), Some("1"));
    }

    #[test]
    fn test_void_elements_need_no_close() {
        let parsed = parse_ok("<p>a<br>b<img src=x.png></p>");
        assert!(parsed.issues.is_empty());
        let p = root_element(&parsed);
        assert_eq!(p.children.len(), 4);
        assert_eq!(p.children[1].as_element().unwrap().name, "br");
    }

    #[test]
    fn test_self_closing() {
        let parsed = parse_ok("<div><my-widget/></div>");
        let div = root_element(&parsed);
        let widget = div.children[0].as_element().unwrap();
        assert!(widget.self_closing);
    }

    #[test]
    fn test_entities() {
        let parsed = parse_ok("<p title=\"a &amp; b\">&lt;x&gt; &nbsp;&#65; &bogus; & done</p>");
        let p = root_element(&parsed);
        assert_eq!(p.get_attribute("title"), Some("a & b"));
        assert_eq!(p.children[0].as_text(), Some("<x> \u{a0}A &bogus; & done"));
    }

    #[test]
    fn test_comments_preserved() {
        let parsed = parse_ok("<div><!-- note --></div>");
        let div = root_element(&parsed);
        assert!(matches!(&div.children[0], Node::Comment(c) if c.text == " note "));
    }

    #[test]
    fn test_script_is_raw_text() {
        let parsed = parse_ok("<script>if (a < b && c) { x(\"</p>\") }</script><p>ok</p>");
        let script = root_element(&parsed);
        assert_eq!(
            script.children[0].as_text(),
            Some("if (a < b && c) { x(\"</p>\") }")
        );
        assert_eq!(parsed.nodes.len(), 2);
    }

    #[test]
    fn test_stray_close_tag_is_ignored() {
        let parsed = parse_ok("<div>a</span>b</div>");
        assert_eq!(parsed.issues.len(), 1);
        assert!(parsed.issues[0].message.contains("</span>"));
        assert_eq!(root_element(&parsed).children.len(), 2);
    }

    #[test]
    fn test_unclosed_elements_closed_at_end() {
        let parsed = parse_ok("<div><p>text");
        assert_eq!(parsed.issues.len(), 2);
        let div = root_element(&parsed);
        assert_eq!(div.children[0].as_element().unwrap().name, "p");
        assert_eq!(div.span.end, 13);
    }

    #[test]
    fn test_implicit_close_by_outer_end_tag() {
        let parsed = parse_ok("<div><p>text</div>after");
        assert_eq!(parsed.issues.len(), 1);
        assert_eq!(parsed.nodes.len(), 2);
        assert_eq!(parsed.nodes[1].as_text(), Some("after"));
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        let parsed = parse_ok("<p>1 < 2</p>");
        assert!(parsed.issues.is_empty());
        assert_eq!(root_element(&parsed).children[0].as_text(), Some("1 < 2"));
    }

    #[test]
    fn test_nesting_limit() {
        let source = "<div>".repeat(MAX_NESTING_DEPTH + 1);
        let err = parse_markup(&source).unwrap_err();
        assert!(matches!(err, TemplateError::NestingTooDeep { .. }));
    }

    #[test]
    fn test_doctype_skipped() {
        let parsed = parse_ok("<!DOCTYPE html><p>x</p>");
        assert_eq!(parsed.nodes.len(), 1);
    }
}
