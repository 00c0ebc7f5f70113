/*
 * interpreter.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Directive pipeline.
//!
//! A compiled [`Template`] is never modified. Each render walks it and builds
//! a fresh output tree, resolving directives per element in a fixed order:
//!
//! 1. `render-for` expands the element into one clone per collection entry;
//! 2. `render-if` drops the (possibly cloned) element when its condition fails;
//! 3. `[[ ... ]]` interpolation fills attribute values and text.
//!
//! Nothing that goes wrong during a render aborts it. Problems are reported
//! as diagnostics on the [`Rendered`] result and the affected piece renders as
//! empty (or, for a malformed `render-for`, once without iteration).

use crate::context::RenderContext;
use crate::directive::{Condition, FOR_ATTRIBUTE, ForDirective, IF_ATTRIBUTE};
use crate::error::{TemplateError, TemplateResult};
use crate::eval_context::{EvalContext, RenderOptions};
use crate::expr::eval_str;
use crate::markup::{
    Attribute, Element, MarkupIssue, Node, Text, is_raw_text_element, parse_markup,
    serialize_nodes,
};
use crate::path::PropertyPath;
use crate::value::Value;
use blockkit_diagnostics::catalog::get_error_info;
use blockkit_diagnostics::{DiagnosticMessage, SourceSpan};

const OPEN: &str = "[[";
const CLOSE: &str = "]]";

/// A parsed template, ready to render any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
    nodes: Vec<Node>,
    issues: Vec<MarkupIssue>,
}

/// Output of a render.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub nodes: Vec<Node>,
    pub diagnostics: Vec<DiagnosticMessage>,
}

impl Rendered {
    pub fn to_markup(&self) -> String {
        serialize_nodes(&self.nodes)
    }

    /// Check if any errors were reported (warnings don't count).
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(DiagnosticMessage::is_error)
    }
}

impl Template {
    /// Parse template markup, repairing malformed markup where possible.
    ///
    /// Repairs are reported as `B-1-1` diagnostics on every render.
    pub fn compile(source: &str) -> TemplateResult<Self> {
        let parsed = parse_markup(source)?;
        Ok(Self {
            source: source.to_string(),
            nodes: parsed.nodes,
            issues: parsed.issues,
        })
    }

    /// Parse template markup, refusing anything the parser had to repair.
    pub fn compile_strict(source: &str) -> TemplateResult<Self> {
        let template = Self::compile(source)?;
        if let Some(issue) = template.issues.first() {
            return Err(TemplateError::MarkupSyntax {
                message: issue.message.clone(),
                span: issue.span,
            });
        }
        Ok(template)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Repairs made while parsing.
    pub fn issues(&self) -> &[MarkupIssue] {
        &self.issues
    }

    pub fn render(&self, context: &RenderContext) -> Rendered {
        self.render_with(context, RenderOptions::default())
    }

    pub fn render_with(&self, context: &RenderContext, options: RenderOptions) -> Rendered {
        let mut eval = EvalContext::new(options);
        for issue in &self.issues {
            eval.warn_or_error_with_code(
                "B-1-1",
                "Malformed Markup",
                issue.message.clone(),
                issue.span,
            );
        }

        let mut nodes = Vec::new();
        render_nodes(&self.nodes, context, &mut eval, &mut nodes);

        let diagnostics = eval.into_diagnostics();
        tracing::debug!(
            nodes = nodes.len(),
            diagnostics = diagnostics.len(),
            "rendered template"
        );
        Rendered { nodes, diagnostics }
    }
}

/// Compile and render in one step.
///
/// ```
/// use blockkit_template::{RenderContext, render_markup};
///
/// let ctx = RenderContext::from_json(serde_json::json!({"name": "Ada"}));
/// let rendered = render_markup("<p>Hello [[ name ]]</p>", &ctx).unwrap();
/// assert_eq!(rendered.to_markup(), "<p>Hello Ada</p>");
/// ```
pub fn render_markup(source: &str, context: &RenderContext) -> TemplateResult<Rendered> {
    Ok(Template::compile(source)?.render(context))
}

fn render_nodes(nodes: &[Node], ctx: &RenderContext, eval: &mut EvalContext, out: &mut Vec<Node>) {
    for node in nodes {
        match node {
            Node::Element(element) => render_element(element, ctx, eval, out),
            Node::Text(text) => interpolate_text(text, ctx, eval, out),
            Node::Comment(_) => out.push(node.clone()),
        }
    }
}

fn render_element(
    element: &Element,
    ctx: &RenderContext,
    eval: &mut EvalContext,
    out: &mut Vec<Node>,
) {
    let Some(attr) = element.attribute(FOR_ATTRIBUTE) else {
        render_single(element, ctx, eval, out);
        return;
    };

    let expression = attr.value.as_deref().unwrap_or_default();
    match ForDirective::parse(expression) {
        Ok(directive) => iterate(element, &directive, ctx, eval, out),
        Err(err) => {
            eval.error_with_code(
                "B-2-1",
                "Malformed render-for Expression",
                err.to_string(),
                attr.span,
            );
            render_single(element, ctx, eval, out);
        }
    }
}

/// Expand one clone per collection entry.
fn iterate(
    element: &Element,
    directive: &ForDirective,
    ctx: &RenderContext,
    eval: &mut EvalContext,
    out: &mut Vec<Node>,
) {
    let collection = ctx.resolve(&directive.collection);
    if !collection.is_truthy() {
        return;
    }

    let mut entries: Vec<(Value, Value)> = match collection {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| (Value::Number(i as f64), item))
            .collect(),
        Value::Object(map) => map
            .into_iter()
            .map(|(key, item)| (Value::String(key), item))
            .collect(),
        scalar => vec![(Value::Number(0.0), scalar)],
    };

    let limit = eval.options.max_iterations;
    if entries.len() > limit {
        eval.warn_or_error_with_code(
            "B-2-4",
            "Iteration Limit Reached",
            format!(
                "`{}` has {} entries; only the first {limit} were rendered",
                directive.collection,
                entries.len()
            ),
            element.span,
        );
        entries.truncate(limit);
    }

    let parent = ctx.to_value();
    for (position, (key, item)) in entries.into_iter().enumerate() {
        let mut scope = ctx.child();
        scope.insert(directive.item.clone(), item);
        if let Some(index_name) = &directive.index {
            scope.insert(index_name.clone(), key.clone());
        }
        scope.insert("$key", format!("{}-{position}", key.to_js_string()));
        scope.insert("$index", position as f64);
        scope.insert("$parent", parent.clone());
        render_single(element, &scope, eval, out);
    }
}

/// Apply `render-if` and interpolation to one element.
fn render_single(
    element: &Element,
    ctx: &RenderContext,
    eval: &mut EvalContext,
    out: &mut Vec<Node>,
) {
    if let Some(attr) = element.attribute(IF_ATTRIBUTE) {
        let expression = attr.value.as_deref().unwrap_or_default();
        match Condition::parse(expression) {
            Ok(condition) => {
                if !condition.evaluate(ctx) {
                    return;
                }
            }
            Err(err) => {
                eval.error_with_code(
                    "B-2-2",
                    "Malformed render-if Condition",
                    err.to_string(),
                    attr.span,
                );
                return;
            }
        }
    }

    let attributes = element
        .attributes
        .iter()
        .filter(|attr| attr.name != FOR_ATTRIBUTE && attr.name != IF_ATTRIBUTE)
        .map(|attr| Attribute {
            name: attr.name.clone(),
            value: attr
                .value
                .as_deref()
                .map(|value| interpolate_attribute(value, attr.span, ctx, eval)),
            span: attr.span,
        })
        .collect();

    let mut children = Vec::new();
    if is_raw_text_element(&element.name) {
        children.extend(element.children.iter().cloned());
    } else {
        render_nodes(&element.children, ctx, eval, &mut children);
    }

    out.push(Node::Element(Element {
        name: element.name.clone(),
        attributes,
        children,
        self_closing: element.self_closing,
        span: element.span,
    }));
}

/// Location of `content[start..end]` in the template source.
///
/// Entity decoding can make text shorter than its source; offsets inside such
/// text are not recoverable, so the whole node is reported instead.
fn inner_span(outer: SourceSpan, content: &str, start: usize, end: usize) -> SourceSpan {
    if outer.len() == content.len() {
        SourceSpan::new(outer.start + start, outer.start + end)
    } else {
        outer
    }
}

fn report_unterminated(eval: &mut EvalContext, location: SourceSpan) {
    eval.warn_or_error_with_code(
        "B-2-3",
        "Unterminated Interpolation",
        format!("`{OPEN}` is never closed with `{CLOSE}`"),
        location,
    );
}

fn interpolate_text(text: &Text, ctx: &RenderContext, eval: &mut EvalContext, out: &mut Vec<Node>) {
    let content = text.content.as_str();
    if !content.contains(OPEN) {
        out.push(Node::Text(text.clone()));
        return;
    }

    let mut buffer = String::new();
    let mut rest = content;

    while let Some(open) = rest.find(OPEN) {
        let base = content.len() - rest.len();
        buffer.push_str(&rest[..open]);
        let after = &rest[open + OPEN.len()..];
        let Some(close) = after.find(CLOSE) else {
            report_unterminated(eval, inner_span(text.span, content, base + open, content.len()));
            buffer.push_str(&rest[open..]);
            rest = "";
            break;
        };

        let expr_end = base + open + OPEN.len() + close + CLOSE.len();
        let location = inner_span(text.span, content, base + open, expr_end);
        let source = after[..close].trim();
        match eval_str(source, ctx) {
            Ok(Value::Markup(nodes)) => {
                flush_text(&mut buffer, text.span, out);
                out.extend(nodes);
            }
            Ok(value) => buffer.push_str(&value.to_interpolated_string()),
            Err(err) => {
                let code = err.code();
                let title = get_error_info(code).map_or("Evaluation Error", |info| info.title.as_str());
                eval.warn_or_error_with_code(
                    code,
                    title,
                    format!("In `{source}`: {err}"),
                    location,
                );
            }
        }
        rest = &after[close + CLOSE.len()..];
    }

    buffer.push_str(rest);
    flush_text(&mut buffer, text.span, out);
}

fn flush_text(buffer: &mut String, span: SourceSpan, out: &mut Vec<Node>) {
    if !buffer.is_empty() {
        out.push(Node::Text(Text {
            content: std::mem::take(buffer),
            span,
        }));
    }
}

/// Attribute values support property paths only, never full expressions.
fn interpolate_attribute(
    value: &str,
    location: SourceSpan,
    ctx: &RenderContext,
    eval: &mut EvalContext,
) -> String {
    if !value.contains(OPEN) {
        return value.to_string();
    }

    let mut result = String::new();
    let mut rest = value;
    while let Some(open) = rest.find(OPEN) {
        result.push_str(&rest[..open]);
        let after = &rest[open + OPEN.len()..];
        let Some(close) = after.find(CLOSE) else {
            report_unterminated(eval, location);
            result.push_str(&rest[open..]);
            return result;
        };

        let source = after[..close].trim();
        match PropertyPath::parse(source) {
            Ok(path) => result.push_str(&ctx.resolve(&path).to_interpolated_string()),
            Err(err) => eval.warn_or_error_with_code(
                "B-3-3",
                "Expression Syntax Error",
                format!("Attribute interpolation accepts property paths only: {err}"),
                location,
            ),
        }
        rest = &after[close + CLOSE.len()..];
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockkit_diagnostics::DiagnosticKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render(source: &str, context: serde_json::Value) -> Rendered {
        render_markup(source, &RenderContext::from_json(context)).unwrap()
    }

    fn codes(rendered: &Rendered) -> Vec<&str> {
        rendered
            .diagnostics
            .iter()
            .filter_map(|d| d.code.as_deref())
            .collect()
    }

    #[test]
    fn test_plain_markup_passes_through() {
        let rendered = render("<p class=\"x\">hi</p>", json!({}));
        assert_eq!(rendered.to_markup(), "<p class=\"x\">hi</p>");
        assert!(rendered.diagnostics.is_empty());
    }

    #[test]
    fn test_for_binds_item_and_loop_variables() {
        let rendered = render(
            r#"<i render-for="x in xs">[[ $index ]]/[[ $key ]]/[[ x ]]</i>"#,
            json!({"xs": ["a", "b"]}),
        );
        assert_eq!(rendered.to_markup(), "<i>0/0-0/a</i><i>1/1-1/b</i>");
    }

    #[test]
    fn test_for_over_object_binds_keys() {
        let rendered = render(
            r#"<dt render-for="(v, k) in props">[[k]]=[[v]]</dt>"#,
            json!({"props": {"w": 1, "h": 2}}),
        );
        assert_eq!(rendered.to_markup(), "<dt>w=1</dt><dt>h=2</dt>");
    }

    #[test]
    fn test_for_parent_sees_outer_scope() {
        let rendered = render(
            r#"<b render-for="x in xs">[[ $parent.title ]]</b>"#,
            json!({"title": "T", "xs": [1]}),
        );
        assert_eq!(rendered.to_markup(), "<b>T</b>");
    }

    #[test]
    fn test_for_missing_collection_removes_node() {
        let rendered = render(r#"<ul><li render-for="x in nope">x</li></ul>"#, json!({}));
        assert_eq!(rendered.to_markup(), "<ul></ul>");
        assert!(rendered.diagnostics.is_empty());
    }

    #[test]
    fn test_for_scalar_iterates_once() {
        let rendered = render(r#"<b render-for="x in one">[[x]]</b>"#, json!({"one": "solo"}));
        assert_eq!(rendered.to_markup(), "<b>solo</b>");
    }

    #[test]
    fn test_malformed_for_renders_once() {
        let rendered = render(
            r#"<b render-for="bogus">[[ name ]]</b><i>ok</i>"#,
            json!({"name": "n"}),
        );
        assert_eq!(rendered.to_markup(), "<b>n</b><i>ok</i>");
        assert_eq!(codes(&rendered), vec!["B-2-1"]);
        assert!(rendered.has_errors());
    }

    #[test]
    fn test_iteration_cap() {
        let template = Template::compile(r#"<b render-for="x in xs">[[x]]</b>"#).unwrap();
        let ctx = RenderContext::from_json(json!({"xs": [1, 2, 3, 4]}));
        let rendered = template.render_with(&ctx, RenderOptions::default().with_max_iterations(2));
        assert_eq!(rendered.to_markup(), "<b>1</b><b>2</b>");
        assert_eq!(codes(&rendered), vec!["B-2-4"]);
        assert_eq!(rendered.diagnostics[0].kind, DiagnosticKind::Warning);
    }

    #[test]
    fn test_if_forms() {
        let rendered = render(
            r#"<a render-if="on">1</a><b render-if="!on">2</b><c render-if="mode === 'x'">3</c>"#,
            json!({"on": true, "mode": "x"}),
        );
        assert_eq!(rendered.to_markup(), "<a>1</a><c>3</c>");
    }

    #[test]
    fn test_malformed_if_drops_node() {
        let rendered = render(r#"<a render-if="a && b">x</a><b>y</b>"#, json!({}));
        assert_eq!(rendered.to_markup(), "<b>y</b>");
        assert_eq!(codes(&rendered), vec!["B-2-2"]);
    }

    #[test]
    fn test_attribute_interpolation_uses_paths() {
        let rendered = render(
            r#"<a href="/u/[[ user.id ]]" title="[[ 1 + 1 ]]">x</a>"#,
            json!({"user": {"id": 7}}),
        );
        assert_eq!(rendered.to_markup(), r#"<a href="/u/7" title="">x</a>"#);
        assert_eq!(codes(&rendered), vec!["B-3-3"]);
    }

    #[test]
    fn test_expression_errors_become_warnings() {
        let rendered = render("<p>[[ missing ]]|[[ 1 + ]]|[[ n.x.y ]]</p><p>after</p>", json!({"n": {}}));
        assert_eq!(rendered.to_markup(), "<p>||</p><p>after</p>");
        assert_eq!(codes(&rendered), vec!["B-3-1", "B-3-3", "B-3-2"]);
        assert!(!rendered.has_errors());
    }

    #[test]
    fn test_strict_mode_promotes_warnings() {
        let template = Template::compile("<p>[[ missing ]]</p>").unwrap();
        let rendered = template.render_with(&RenderContext::new(), RenderOptions::strict());
        assert!(rendered.has_errors());
    }

    #[test]
    fn test_unterminated_interpolation_kept_verbatim() {
        let rendered = render("<p>a [[ b</p>", json!({"b": 1}));
        assert_eq!(rendered.to_markup(), "<p>a [[ b</p>");
        assert_eq!(codes(&rendered), vec!["B-2-3"]);
        assert_eq!(rendered.diagnostics[0].location, Some(SourceSpan::new(5, 9)));
    }

    #[test]
    fn test_markup_values_are_spliced() {
        let fragment = Template::compile("<em>hi</em>").unwrap();
        let ctx = RenderContext::new().with("frag", Value::Markup(fragment.nodes().to_vec()));
        let rendered = Template::compile("<p>[[ frag ]]!</p>").unwrap().render(&ctx);
        assert_eq!(rendered.to_markup(), "<p><em>hi</em>!</p>");
    }

    #[test]
    fn test_script_content_untouched() {
        let rendered = render("<script>let a = '[[ x ]]';</script>", json!({"x": 1}));
        assert_eq!(rendered.to_markup(), "<script>let a = '[[ x ]]';</script>");
    }

    #[test]
    fn test_markup_repairs_reported() {
        let rendered = render("<div><p>x</div>", json!({}));
        assert_eq!(rendered.to_markup(), "<div><p>x</p></div>");
        assert_eq!(codes(&rendered), vec!["B-1-1"]);
        assert!(Template::compile_strict("<div><p>x</div>").is_err());
        assert!(Template::compile_strict("<div><p>x</p></div>").is_ok());
    }

    #[test]
    fn test_template_is_reusable() {
        let template = Template::compile("<p>[[ n ]]</p>").unwrap();
        let one = template.render(&RenderContext::new().with("n", 1.0));
        let two = template.render(&RenderContext::new().with("n", 2.0));
        assert_eq!(one.to_markup(), "<p>1</p>");
        assert_eq!(two.to_markup(), "<p>2</p>");
    }
}
