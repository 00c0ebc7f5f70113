/*
 * expr/mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Sandboxed expression language used inside `[[ ... ]]`.
//!
//! Expressions are parsed into an [`Expr`] tree and walked by an evaluator;
//! nothing is ever compiled or executed as host code.
//!
//! ```
//! use blockkit_template::RenderContext;
//! use blockkit_template::expr::eval_str;
//! use blockkit_template::Value;
//!
//! let ctx = RenderContext::new().with("price", 9.5);
//! let value = eval_str("(price * 2).toFixed(2)", &ctx).unwrap();
//! assert_eq!(value, Value::string("19.00"));
//! ```

mod ast;
mod builtins;
mod evaluator;
mod lexer;
mod parser;

pub use ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
pub use evaluator::evaluate;
pub use parser::parse_expression;

use crate::context::RenderContext;
use crate::error::ExpressionError;
use crate::value::Value;

/// Parse and evaluate in one step.
pub fn eval_str(source: &str, context: &RenderContext) -> Result<Value, ExpressionError> {
    evaluate(&parse_expression(source)?, context)
}
