/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Structured diagnostic messages for blockkit.
//!
//! Diagnostics follow a tidyverse-style layout:
//!
//! - [`DiagnosticMessage`]: code, title, kind, problem, details, hints and an
//!   optional [`SourceSpan`] into the template that produced it
//! - [`DiagnosticMessageBuilder`]: the recommended way to construct messages
//! - [`catalog`]: the error-code catalog (`B-<subsystem>-<number>`)
//!
//! Messages render either as text (with an `ariadne` source snippet when the
//! source is available) or as JSON for machine consumption.
//!
//! # Example
//!
//! ```
//! use blockkit_diagnostics::{DiagnosticMessageBuilder, SourceSpan};
//!
//! let msg = DiagnosticMessageBuilder::warning("Unknown name `title`")
//!     .with_code("B-3-1")
//!     .problem("`title` is not defined in the render context")
//!     .with_location(SourceSpan::new(5, 16))
//!     .add_hint("Did you mean to pass `title` as a block prop?")
//!     .build();
//!
//! assert!(msg.to_text(None).starts_with("Warning [B-3-1]"));
//! ```

pub mod builder;
pub mod catalog;
pub mod diagnostic;
pub mod span;

pub use builder::DiagnosticMessageBuilder;
pub use diagnostic::{DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage, SourceFile};
pub use span::SourceSpan;
