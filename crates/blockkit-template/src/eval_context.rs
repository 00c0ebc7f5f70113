/*
 * eval_context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Evaluation state threaded through the directive pipeline.
//!
//! [`EvalContext`] carries the render options and collects diagnostics. The
//! variable bindings are passed separately because every loop iteration
//! renders against its own child scope.

use blockkit_diagnostics::{
    DiagnosticKind, DiagnosticMessage, DiagnosticMessageBuilder, SourceSpan,
};
use serde::{Deserialize, Serialize};

/// Default cap on the number of clones a single `render-for` may produce.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Options controlling a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderOptions {
    /// Report recoverable problems as errors instead of warnings.
    pub strict_mode: bool,

    /// Entries beyond this count are dropped from a `render-for` collection.
    pub max_iterations: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            strict_mode: false,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl RenderOptions {
    pub fn strict() -> Self {
        Self {
            strict_mode: true,
            ..Self::default()
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Collector for diagnostic messages produced during a render.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<DiagnosticMessage>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: DiagnosticMessage) {
        tracing::debug!(
            code = diagnostic.code.as_deref().unwrap_or(""),
            kind = ?diagnostic.kind,
            "{}",
            diagnostic.title
        );
        self.diagnostics.push(diagnostic);
    }

    /// Check if any errors were collected (warnings don't count).
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::Error)
    }

    pub fn diagnostics(&self) -> &[DiagnosticMessage] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Consume the collector and return the diagnostics, sorted by source location.
    ///
    /// The sort is stable, so diagnostics at the same offset keep the order
    /// they were raised in.
    pub fn into_diagnostics(mut self) -> Vec<DiagnosticMessage> {
        self.diagnostics
            .sort_by_key(|diag| diag.location.map_or(0, |loc| loc.start));
        self.diagnostics
    }
}

/// Context for one render.
#[derive(Debug, Default)]
pub struct EvalContext {
    pub options: RenderOptions,
    pub diagnostics: DiagnosticCollector,
}

impl EvalContext {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Report an error regardless of mode.
    pub fn error_with_code(
        &mut self,
        code: &str,
        title: impl Into<String>,
        problem: impl Into<String>,
        location: SourceSpan,
    ) {
        let diagnostic = DiagnosticMessageBuilder::error(title)
            .with_code(code)
            .problem(problem)
            .with_location(location)
            .build();
        self.diagnostics.add(diagnostic);
    }

    /// Report a warning, or an error in strict mode.
    pub fn warn_or_error_with_code(
        &mut self,
        code: &str,
        title: impl Into<String>,
        problem: impl Into<String>,
        location: SourceSpan,
    ) {
        let builder = if self.options.strict_mode {
            DiagnosticMessageBuilder::error(title)
        } else {
            DiagnosticMessageBuilder::warning(title)
        };
        let diagnostic = builder
            .with_code(code)
            .problem(problem)
            .with_location(location)
            .build();
        self.diagnostics.add(diagnostic);
    }

    pub fn add_diagnostic(&mut self, diagnostic: DiagnosticMessage) {
        self.diagnostics.add(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    pub fn into_diagnostics(self) -> Vec<DiagnosticMessage> {
        self.diagnostics.into_diagnostics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = RenderOptions::default();
        assert!(!options.strict_mode);
        assert_eq!(options.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert!(RenderOptions::strict().strict_mode);
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: RenderOptions = serde_json::from_str(r#"{"strict-mode": true}"#).unwrap();
        assert!(options.strict_mode);
        assert_eq!(options.max_iterations, DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn test_warn_or_error_respects_strict_mode() {
        let mut ctx = EvalContext::new(RenderOptions::default());
        ctx.warn_or_error_with_code("B-3-1", "Unknown Name", "x", SourceSpan::new(4, 5));
        assert!(!ctx.has_errors());

        let mut strict = EvalContext::new(RenderOptions::strict());
        strict.warn_or_error_with_code("B-3-1", "Unknown Name", "x", SourceSpan::new(4, 5));
        assert!(strict.has_errors());
    }

    #[test]
    fn test_diagnostics_sorted_by_location() {
        let mut ctx = EvalContext::default();
        ctx.error_with_code("B-2-1", "late", "", SourceSpan::new(20, 21));
        ctx.error_with_code("B-2-1", "early", "", SourceSpan::new(2, 3));
        let titles: Vec<String> = ctx
            .into_diagnostics()
            .into_iter()
            .map(|d| d.title)
            .collect();
        assert_eq!(titles, vec!["early", "late"]);
    }
}
