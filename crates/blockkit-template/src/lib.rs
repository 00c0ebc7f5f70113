/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Directive-based markup templates.
//!
//! A template is ordinary markup with three additions:
//!
//! - `render-for="item in path"` / `render-for="(item, index) in path"` repeats an
//!   element once per entry of a collection
//! - `render-if="path"`, `render-if="!path"`, `render-if="path === literal"`
//!   keeps or drops an element
//! - `[[ expression ]]` interpolates a value into text (full expressions) or
//!   into an attribute value (property paths only)
//!
//! Rendering never fails: problems are returned as diagnostics next to the
//! output tree.
//!
//! # Example
//!
//! ```
//! use blockkit_template::{RenderContext, Template};
//!
//! let template = Template::compile(
//!     r#"<ul><li render-for="(p, i) in people">[[ i ]]:[[ p.name ]]</li></ul>"#,
//! ).unwrap();
//! let ctx = RenderContext::from_json(serde_json::json!({
//!     "people": [{"name": "A"}, {"name": "B"}]
//! }));
//!
//! let rendered = template.render(&ctx);
//! assert_eq!(rendered.to_markup(), "<ul><li>0:A</li><li>1:B</li></ul>");
//! assert!(rendered.diagnostics.is_empty());
//! ```

pub mod context;
pub mod directive;
pub mod error;
pub mod eval_context;
pub mod expr;
pub mod interpreter;
pub mod markup;
pub mod path;
pub mod value;

pub use context::RenderContext;
pub use error::{DirectiveError, ExpressionError, PathError, TemplateError, TemplateResult};
pub use eval_context::{DEFAULT_MAX_ITERATIONS, RenderOptions};
pub use interpreter::{Rendered, Template, render_markup};
pub use markup::{Element, Node};
pub use path::PropertyPath;
pub use value::{ObjectMap, Value};
