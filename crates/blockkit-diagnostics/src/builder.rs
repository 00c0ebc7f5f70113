/*
 * builder.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Builder API for diagnostic messages.

use crate::diagnostic::{DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage};
use crate::span::SourceSpan;

/// Builder for [`DiagnosticMessage`].
///
/// ```
/// use blockkit_diagnostics::{DiagnosticKind, DiagnosticMessageBuilder};
///
/// let msg = DiagnosticMessageBuilder::error("Malformed render-for expression")
///     .with_code("B-2-1")
///     .problem("Expected `item in path` or `(item, index) in path`")
///     .add_detail("Found `items`")
///     .build();
///
/// assert_eq!(msg.kind, DiagnosticKind::Error);
/// assert_eq!(msg.details.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DiagnosticMessageBuilder {
    message: DiagnosticMessage,
}

impl DiagnosticMessageBuilder {
    fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            message: DiagnosticMessage::new(kind, title),
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

    pub fn note(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Note, title)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.message.code = Some(code.into());
        self
    }

    pub fn problem(mut self, problem: impl Into<String>) -> Self {
        self.message.problem = Some(problem.into());
        self
    }

    pub fn with_location(mut self, location: SourceSpan) -> Self {
        self.message.location = Some(location);
        self
    }

    fn push_detail(mut self, kind: DetailKind, content: String, location: Option<SourceSpan>) -> Self {
        self.message.details.push(DetailItem {
            kind,
            content,
            location,
        });
        self
    }

    /// Add an error detail (✖).
    pub fn add_detail(self, content: impl Into<String>) -> Self {
        self.push_detail(DetailKind::Error, content.into(), None)
    }

    /// Add an error detail pointing at its own location.
    pub fn add_detail_at(self, content: impl Into<String>, location: SourceSpan) -> Self {
        self.push_detail(DetailKind::Error, content.into(), Some(location))
    }

    /// Add an info detail (ℹ).
    pub fn add_info(self, content: impl Into<String>) -> Self {
        self.push_detail(DetailKind::Info, content.into(), None)
    }

    /// Add a note detail (•).
    pub fn add_note(self, content: impl Into<String>) -> Self {
        self.push_detail(DetailKind::Note, content.into(), None)
    }

    pub fn add_hint(mut self, hint: impl Into<String>) -> Self {
        self.message.hints.push(hint.into());
        self
    }

    pub fn build(self) -> DiagnosticMessage {
        self.message
    }
}
