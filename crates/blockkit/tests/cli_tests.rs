/*
 * cli_tests.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Tests running the blockkit binary.
 */

use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test-fixtures")
        .join(name)
}

/// Run blockkit in an empty directory so no stray blockkit.toml is picked up.
fn blockkit(args: &[&str]) -> Output {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    Command::new(env!("CARGO_BIN_EXE_blockkit"))
        .args(args)
        .current_dir(dir.path())
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute command")
}

fn path(name: &str) -> String {
    fixture(name).display().to_string()
}

#[test]
fn test_render_with_context() {
    let output = blockkit(&["render", &path("greeting.html"), "--context", &path("greeting.json")]);
    assert!(output.status.success(), "Expected command to succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with(
        "<section><h1>Hello, Ada!</h1><p>You have 2 items:</p><ul><li>1. tea</li><li>2. cake</li></ul></section>"
    ));
    assert!(output.stderr.is_empty());
}

#[test]
fn test_render_json_diagnostics() {
    let output = blockkit(&["render", &path("broken.html"), "--diagnostics", "json"]);
    assert!(output.status.success(), "Warnings should not fail the render");

    let stderr = String::from_utf8_lossy(&output.stderr);
    let json_lines: Vec<&str> = stderr.lines().filter(|line| line.starts_with('{')).collect();
    assert_eq!(json_lines.len(), 1);

    let json_value: serde_json::Value =
        serde_json::from_str(json_lines[0]).expect("Failed to parse JSON from stderr");
    assert_eq!(json_value["kind"], "warning");
    assert_eq!(json_value["code"], "B-3-1");
}

#[test]
fn test_render_strict_fails() {
    let output = blockkit(&["render", &path("broken.html"), "--strict"]);
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("<p></p>"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("B-3-1"));
    assert!(stderr.contains("broken.html"));
}

#[test]
fn test_block_with_registry_defaults() {
    let output = blockkit(&["block", &path("quote.json"), "--registry", &path("blocks.yaml")]);
    assert!(output.status.success(), "Expected command to succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim_end(),
        "<blockquote>Simple is better (Anonymous)</blockquote>"
    );
}

#[test]
fn test_block_breaking_field_rules_fails() {
    let output = blockkit(&[
        "block",
        &path("quote-missing-text.json"),
        "--registry",
        &path("blocks.yaml"),
    ]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("props.text"));
    assert!(stderr.contains("text is required"));
}

#[test]
fn test_registry_check() {
    let output = blockkit(&["registry", "check", &path("blocks.yaml")]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("quote: Quote (2 fields, render: html)"));

    let output = blockkit(&["registry", "check", &path("bad-registry.yaml")]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("badge.tone: select field has no options"));
}
