/*
 * integration_tests.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * End-to-end rendering tests for blockkit-template using test fixtures.
 */

use blockkit_diagnostics::DiagnosticKind;
use blockkit_template::{RenderContext, RenderOptions, Template, Value, render_markup};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::Path;

/// Helper to load a template from fixtures
fn load_template(name: &str) -> Template {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("test-fixtures")
        .join(name);
    let source = std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Failed to read fixture: {}", name));
    Template::compile(&source).unwrap_or_else(|_| panic!("Failed to compile fixture: {}", name))
}

fn ctx(value: serde_json::Value) -> RenderContext {
    RenderContext::from_json(value)
}

#[test]
fn test_for_runs_before_if() {
    let rendered = render_markup(
        r#"<li render-for="i in items" render-if="i.show">[[i.show]]</li>"#,
        &ctx(json!({"items": [{"show": true}, {"show": false}]})),
    )
    .unwrap();

    assert_eq!(rendered.to_markup(), "<li>true</li>");
    assert_eq!(rendered.nodes.len(), 1);
    assert!(rendered.diagnostics.is_empty());
}

#[test]
fn test_item_and_index_binding() {
    let rendered = render_markup(
        r#"<div render-for="(p,i) in people">[[i]]:[[p.name]]</div>"#,
        &ctx(json!({"people": [{"name": "A"}, {"name": "B"}]})),
    )
    .unwrap();

    let texts: Vec<String> = rendered.nodes.iter().map(|n| n.text_content()).collect();
    assert_eq!(texts, vec!["0:A", "1:B"]);
}

#[test]
fn test_division_by_zero_is_infinity() {
    let rendered = render_markup("<span>[[ 1/0 ]]</span>", &RenderContext::new()).unwrap();
    assert_eq!(rendered.to_markup(), "<span>Infinity</span>");
    assert!(rendered.diagnostics.is_empty());
}

#[test]
fn test_unknown_name_renders_empty_and_siblings_survive() {
    let rendered = render_markup(
        "<p>[[ undefinedVar ]]</p><p>[[ ok ]]</p>",
        &ctx(json!({"ok": "fine"})),
    )
    .unwrap();

    assert_eq!(rendered.to_markup(), "<p></p><p>fine</p>");
    assert_eq!(rendered.diagnostics.len(), 1);
    let diagnostic = &rendered.diagnostics[0];
    assert_eq!(diagnostic.code.as_deref(), Some("B-3-1"));
    assert_eq!(diagnostic.kind, DiagnosticKind::Warning);
    assert!(diagnostic.problem.as_deref().unwrap().contains("undefinedVar"));
}

#[test]
fn test_no_directive_attributes_survive() {
    let template = load_template("nested.html");
    let rendered = template.render(&ctx(json!({
        "rows": [
            {"label": "r1", "cells": [{"value": 1}, {"value": 2, "hidden": true}]},
            {"label": "r2", "cells": [{"value": 3}]}
        ]
    })));

    let markup = rendered.to_markup();
    assert!(!markup.contains("render-for"));
    assert!(!markup.contains("render-if"));
    assert!(!markup.contains("[["));
    insta::assert_snapshot!(markup, @"<table><tr><td>r1:1</td></tr><tr><td>r2:3</td></tr></table>");
}

#[test]
fn test_card_fixture() {
    let template = load_template("card.html");
    let rendered = template.render(&ctx(json!({
        "title": "Hello",
        "subtitle": "",
        "tags": ["a", "b"]
    })));

    assert!(rendered.diagnostics.is_empty());
    insta::assert_snapshot!(
        rendered.to_markup(),
        @r#"<article class="card"><h2>Hello</h2><ul><li data-key="0-0">1. A</li><li data-key="1-1">2. B</li></ul></article>"#
    );
}

#[test]
fn test_card_fixture_with_subtitle_and_no_tags() {
    let template = load_template("card.html");
    let rendered = template.render(&ctx(json!({"title": "T", "subtitle": "S"})));

    insta::assert_snapshot!(
        rendered.to_markup(),
        @r#"<article class="card"><h2>T</h2><p>S</p><ul></ul></article>"#
    );
}

#[test]
fn test_interpolation_coercions() {
    let rendered = render_markup(
        "<p>[[ nothing ]]|[[ nil ]]|[[ list ]]|[[ 0.5 + 0.25 ]]|[[ 10 / 4 ]]|[[ 0/0 ]]</p>",
        &ctx(json!({"nil": null, "list": [1, "two", null], "nothing": null})),
    )
    .unwrap();
    assert_eq!(rendered.to_markup(), "<p>||1,two,|0.75|2.5|NaN</p>");
}

#[test]
fn test_object_interpolates_as_json() {
    let rendered = render_markup("<pre>[[ data ]]</pre>", &ctx(json!({"data": {"a": 1}}))).unwrap();
    assert_eq!(rendered.nodes[0].text_content(), "{\n  \"a\": 1\n}");
}

#[test]
fn test_rendering_is_deterministic() {
    let template = load_template("card.html");
    let context = ctx(json!({"title": "x", "tags": ["q"]}));
    assert_eq!(template.render(&context), template.render(&context));
}

#[test]
fn test_strict_render_reports_errors() {
    let template = Template::compile("<p>[[ nope ]]</p>").unwrap();
    let rendered = template.render_with(&RenderContext::new(), RenderOptions::strict());
    assert_eq!(rendered.to_markup(), "<p></p>");
    assert!(rendered.has_errors());
}

#[test]
fn test_diagnostic_text_points_at_source() {
    let source = "<p>[[ missing ]]</p>";
    let rendered = render_markup(source, &RenderContext::new()).unwrap();
    let file = blockkit_diagnostics::SourceFile::new("inline.html", source);
    let text = rendered.diagnostics[0].to_text(Some(&file));
    assert!(text.contains("B-3-1"));
    assert!(text.contains("inline.html"));
}

#[test]
fn test_host_values_in_context() {
    let mut context = RenderContext::new();
    context.insert("count", 2.0);
    context.insert("items", Value::Array(vec![Value::from("x"), Value::from("y")]));
    let rendered = render_markup(
        "<b>[[ count ]] of [[ items.length ]]: [[ items.join(' & ') ]]</b>",
        &context,
    )
    .unwrap();
    assert_eq!(rendered.to_markup(), "<b>2 of 2: x &amp; y</b>");
}
