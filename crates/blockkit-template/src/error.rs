/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for template compilation and evaluation.
//!
//! Only [`TemplateError`] ever escapes the crate's public rendering API, and
//! only from compilation. Everything that goes wrong while rendering is
//! recovered locally and reported as a diagnostic.

use blockkit_diagnostics::SourceSpan;
use thiserror::Error;

/// Errors that can occur while compiling a template.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TemplateError {
    /// Markup that the lenient parser had to repair, reported by strict compilation.
    #[error("Markup syntax error at {}..{}: {message}", .span.start, .span.end)]
    MarkupSyntax { message: String, span: SourceSpan },

    /// Elements nested deeper than the parser allows.
    #[error("Elements nested deeper than {max_depth} levels at {}..{}", .span.start, .span.end)]
    NestingTooDeep { max_depth: usize, span: SourceSpan },
}

/// Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Failures while evaluating an interpolated expression.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExpressionError {
    /// The expression text could not be parsed.
    #[error("{message}")]
    Syntax { message: String, offset: usize },

    /// A name that is neither a context key nor a utility binding.
    #[error("`{name}` is not defined")]
    Reference { name: String },

    /// An operation applied to a value of the wrong type.
    #[error("{message}")]
    Type { message: String },
}

impl ExpressionError {
    pub(crate) fn syntax(message: impl Into<String>, offset: usize) -> Self {
        ExpressionError::Syntax {
            message: message.into(),
            offset,
        }
    }

    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        ExpressionError::Type {
            message: message.into(),
        }
    }

    /// Diagnostic code reported for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            ExpressionError::Reference { .. } => "B-3-1",
            ExpressionError::Type { .. } => "B-3-2",
            ExpressionError::Syntax { .. } => "B-3-3",
        }
    }
}

/// A property path that does not follow `name(.name|[index])*`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid property path `{path}`: {reason}")]
pub struct PathError {
    pub path: String,
    pub reason: String,
}

/// A `render-for` or `render-if` value that matches none of the supported forms.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("`{expression}` is not a valid render-for expression")]
    MalformedFor { expression: String },

    #[error("`{expression}` is not a valid render-if condition: {reason}")]
    MalformedCondition { expression: String, reason: String },
}
