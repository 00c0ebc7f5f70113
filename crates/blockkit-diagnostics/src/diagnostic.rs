/*
 * diagnostic.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Core diagnostic message types.
//!
//! This module defines the structures for representing diagnostic messages
//! (errors, warnings, info) following tidyverse-style guidelines.

use serde::{Deserialize, Serialize};

use crate::span::SourceSpan;

/// The kind of diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// An error that prevents completion
    Error,
    /// A warning that doesn't prevent completion but indicates a problem
    Warning,
    /// Informational message
    Info,
    /// A note providing additional context
    Note,
}

impl DiagnosticKind {
    fn label(self) -> &'static str {
        match self {
            DiagnosticKind::Error => "Error",
            DiagnosticKind::Warning => "Warning",
            DiagnosticKind::Info => "Info",
            DiagnosticKind::Note => "Note",
        }
    }
}

/// How detail items should be presented (tidyverse x/i bullet style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailKind {
    /// Error detail (✖ bullet)
    Error,
    /// Info detail (i bullet)
    Info,
    /// Note detail (plain bullet)
    Note,
}

impl DetailKind {
    fn bullet(self) -> &'static str {
        match self {
            DetailKind::Error => "✖",
            DetailKind::Info => "ℹ",
            DetailKind::Note => "•",
        }
    }
}

/// A detail item in a diagnostic message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailItem {
    pub kind: DetailKind,
    pub content: String,
    /// Optional location this detail points at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceSpan>,
}

/// Named source text used to render a source snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// A diagnostic message following tidyverse-style structure.
///
/// 1. **Code**: optional error code (e.g., "B-2-1") for searchability
/// 2. **Title**: brief message
/// 3. **Kind**: error, warning, info, note
/// 4. **Problem**: what went wrong
/// 5. **Details**: specific information, bulleted
/// 6. **Hints**: optional guidance for fixing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    pub title: String,

    pub kind: DiagnosticKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<DetailItem>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,

    /// Where in the template source the issue occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceSpan>,
}

impl DiagnosticMessage {
    /// Create a new diagnostic message with just a title and kind.
    ///
    /// Consider using [`crate::DiagnosticMessageBuilder`] for anything richer.
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            code: None,
            title: title.into(),
            kind,
            problem: None,
            details: Vec::new(),
            hints: Vec::new(),
            location: None,
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Info, title)
    }

    /// Set the error code (`B-<subsystem>-<number>`).
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind == DiagnosticKind::Error
    }

    /// Render this diagnostic as text.
    ///
    /// With a [`SourceFile`] and a location, the output starts with an
    /// `ariadne` snippet; details without locations and hints follow it.
    /// Without one, everything is laid out tidyverse style:
    ///
    /// ```text
    /// Error [B-2-1]: title
    /// Problem statement here
    /// ✖ Error detail
    /// ℹ Info detail
    /// ? Hint
    /// ```
    pub fn to_text(&self, source: Option<&SourceFile>) -> String {
        let mut lines: Vec<String> = Vec::new();

        let snippet = match (source, self.location) {
            (Some(file), Some(location)) => self.render_ariadne_source_context(location, file),
            _ => None,
        };

        match snippet {
            Some(snippet) => {
                lines.push(snippet.trim_end().to_string());
                // ariadne already shows title, code, problem, and located details
                for detail in self.details.iter().filter(|d| d.location.is_none()) {
                    lines.push(format!("{} {}", detail.kind.bullet(), detail.content));
                }
            }
            None => {
                let mut header = match &self.code {
                    Some(code) => format!("{} [{}]: {}", self.kind.label(), code, self.title),
                    None => format!("{}: {}", self.kind.label(), self.title),
                };
                if let Some(location) = self.location {
                    header.push_str(&format!(" (at {}..{})", location.start, location.end));
                }
                lines.push(header);

                if let Some(problem) = &self.problem {
                    lines.push(problem.clone());
                }
                for detail in &self.details {
                    lines.push(format!("{} {}", detail.kind.bullet(), detail.content));
                }
            }
        }

        for hint in &self.hints {
            lines.push(format!("? {}", hint));
        }

        lines.join("\n")
    }

    /// Render this diagnostic message as a JSON value.
    ///
    /// ```
    /// use blockkit_diagnostics::DiagnosticMessage;
    ///
    /// let msg = DiagnosticMessage::error("Something went wrong");
    /// let json = msg.to_json();
    /// assert_eq!(json["kind"], "error");
    /// assert_eq!(json["title"], "Something went wrong");
    /// ```
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({
                "kind": "error",
                "title": self.title,
            })
        })
    }

    /// Render source context using ariadne (private helper for to_text).
    fn render_ariadne_source_context(
        &self,
        location: SourceSpan,
        file: &SourceFile,
    ) -> Option<String> {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let len = file.content.len();
        let clamp = |span: SourceSpan| span.start.min(len)..span.end.min(len);

        let (report_kind, main_color) = match self.kind {
            DiagnosticKind::Error => (ReportKind::Error, Color::Red),
            DiagnosticKind::Warning => (ReportKind::Warning, Color::Yellow),
            DiagnosticKind::Info => (ReportKind::Advice, Color::Cyan),
            DiagnosticKind::Note => (ReportKind::Advice, Color::Blue),
        };

        let main_span = clamp(location);
        let mut report = Report::build(report_kind, file.name.clone(), main_span.start);

        if let Some(code) = &self.code {
            report = report.with_message(format!("[{}] {}", code, self.title));
        } else {
            report = report.with_message(&self.title);
        }

        let main_message = self.problem.as_deref().unwrap_or(&self.title);
        report = report.with_label(
            Label::new((file.name.clone(), main_span))
                .with_message(main_message)
                .with_color(main_color),
        );

        for detail in &self.details {
            if let Some(detail_location) = detail.location {
                let color = match detail.kind {
                    DetailKind::Error => Color::Red,
                    DetailKind::Info => Color::Cyan,
                    DetailKind::Note => Color::Blue,
                };
                report = report.with_label(
                    Label::new((file.name.clone(), clamp(detail_location)))
                        .with_message(&detail.content)
                        .with_color(color),
                );
            }
        }

        let mut output = Vec::new();
        report
            .finish()
            .write(
                (file.name.clone(), Source::from(file.content.as_str())),
                &mut output,
            )
            .ok()?;

        String::from_utf8(output).ok()
    }
}
