/*
 * expr/ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Syntax tree for interpolated expressions.

use crate::value::Value;

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `1`, `'text'`, `true`, `null`, `undefined`
    Literal(Value),

    /// `[a, b, c]`
    Array(Vec<Expr>),

    /// A context key or one of the utility namespaces.
    Ident(String),

    /// `object.property`
    Member {
        object: Box<Expr>,
        property: String,
    },

    /// `object[index]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },

    /// `callee(args...)`
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Short-circuiting operators; the right side is only evaluated when needed.
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `condition ? then_branch : else_branch`
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    Typeof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    StrictEq,
    StrictNotEq,
    LooseEq,
    LooseNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Nullish,
}

impl Expr {
    /// Short source-like description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Expr::Ident(name) => name.clone(),
            Expr::Member { object, property } => format!("{}.{property}", object.describe()),
            Expr::Index { object, .. } => format!("{}[...]", object.describe()),
            Expr::Call { callee, .. } => format!("{}(...)", callee.describe()),
            Expr::Literal(value) => value.to_js_string(),
            _ => "expression".to_string(),
        }
    }
}
