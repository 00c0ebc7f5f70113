/*
 * expr/parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Pratt parser for interpolated expressions.

use super::ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
use super::lexer::{Token, TokenKind, tokenize};
use crate::error::ExpressionError;
use crate::value::Value;

// Binding powers, lowest to highest.
const BP_CONDITIONAL: u8 = 2; // ? :
const BP_NULLISH: u8 = 3; // ??
const BP_OR: u8 = 4; // ||
const BP_AND: u8 = 6; // &&
const BP_EQUALITY: u8 = 8; // === !== == !=
const BP_COMPARISON: u8 = 10; // < > <= >=
const BP_ADDITIVE: u8 = 12; // + -
const BP_MULTIPLICATIVE: u8 = 14; // * / %
const BP_UNARY: u8 = 16; // ! - + typeof

/// Parse expression text into a syntax tree.
pub fn parse_expression(source: &str) -> Result<Expr, ExpressionError> {
    let tokens = tokenize(source)?;
    let mut parser = ExprParser { tokens, pos: 0 };
    if parser.peek() == &TokenKind::Eof {
        return Err(ExpressionError::syntax("Empty expression", 0));
    }
    let expr = parser.parse_expr(0)?;
    if parser.peek() != &TokenKind::Eof {
        return Err(parser.error("Unexpected token after expression"));
    }
    Ok(expr)
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    fn peek(&self) -> &TokenKind {
        // The token list always ends with Eof and the parser never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn offset(&self) -> usize {
        self.tokens[self.pos.min(self.tokens.len() - 1)].offset
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if kind != TokenKind::Eof {
            self.pos += 1;
        }
        kind
    }

    fn error(&self, message: &str) -> ExpressionError {
        let found = match self.peek() {
            TokenKind::Eof => "end of expression".to_string(),
            other => format!("{other:?}"),
        };
        ExpressionError::syntax(format!("{message} (found {found})"), self.offset())
    }

    fn expect(&mut self, expected: TokenKind, what: &str) -> Result<(), ExpressionError> {
        if self.peek() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&format!("Expected {what}")))
        }
    }

    fn parse_expr(&mut self, min_bp: u8) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_prefix()?;

        loop {
            let kind = self.peek().clone();
            let Some((l_bp, r_bp)) = infix_bp(&kind) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }

            if kind == TokenKind::Question {
                self.advance();
                let then_branch = self.parse_expr(0)?;
                self.expect(TokenKind::Colon, "`:` in conditional expression")?;
                let else_branch = self.parse_expr(BP_CONDITIONAL)?;
                left = Expr::Conditional {
                    condition: Box::new(left),
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                };
                continue;
            }

            self.advance();
            let right = Box::new(self.parse_expr(r_bp)?);
            let left_box = Box::new(left);

            left = match kind {
                TokenKind::AmpAmp => logical(LogicalOp::And, left_box, right),
                TokenKind::PipePipe => logical(LogicalOp::Or, left_box, right),
                TokenKind::QuestionQuestion => logical(LogicalOp::Nullish, left_box, right),
                other => {
                    let op = match other {
                        TokenKind::Plus => BinaryOp::Add,
                        TokenKind::Minus => BinaryOp::Sub,
                        TokenKind::Star => BinaryOp::Mul,
                        TokenKind::Slash => BinaryOp::Div,
                        TokenKind::Percent => BinaryOp::Rem,
                        TokenKind::EqEqEq => BinaryOp::StrictEq,
                        TokenKind::BangEqEq => BinaryOp::StrictNotEq,
                        TokenKind::EqEq => BinaryOp::LooseEq,
                        TokenKind::BangEq => BinaryOp::LooseNotEq,
                        TokenKind::Lt => BinaryOp::Lt,
                        TokenKind::LtEq => BinaryOp::LtEq,
                        TokenKind::Gt => BinaryOp::Gt,
                        TokenKind::GtEq => BinaryOp::GtEq,
                        _ => return Err(self.error("Unexpected infix operator")),
                    };
                    Expr::Binary {
                        op,
                        left: left_box,
                        right,
                    }
                }
            };
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ExpressionError> {
        let start = self.offset();
        let expr = match self.advance() {
            TokenKind::Number(n) => Expr::Literal(Value::Number(n)),
            TokenKind::Str(s) => Expr::Literal(Value::String(s)),
            TokenKind::Ident(name) => match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" => Expr::Literal(Value::Null),
                "undefined" => Expr::Literal(Value::Undefined),
                "typeof" => unary(UnaryOp::Typeof, self.parse_expr(BP_UNARY)?),
                _ => Expr::Ident(name),
            },
            TokenKind::Bang => unary(UnaryOp::Not, self.parse_expr(BP_UNARY)?),
            TokenKind::Minus => unary(UnaryOp::Neg, self.parse_expr(BP_UNARY)?),
            TokenKind::Plus => unary(UnaryOp::Plus, self.parse_expr(BP_UNARY)?),
            TokenKind::LParen => {
                let inner = self.parse_expr(0)?;
                self.expect(TokenKind::RParen, "`)`")?;
                inner
            }
            TokenKind::LBracket => Expr::Array(self.parse_list(TokenKind::RBracket, "`]`")?),
            TokenKind::Eof => {
                return Err(ExpressionError::syntax(
                    "Unexpected end of expression",
                    start,
                ));
            }
            other => {
                return Err(ExpressionError::syntax(
                    format!("Unexpected token {other:?}"),
                    start,
                ));
            }
        };
        self.parse_postfix(expr)
    }

    /// Member access, indexing and calls bind tighter than any operator.
    fn parse_postfix(&mut self, mut expr: Expr) -> Result<Expr, ExpressionError> {
        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.advance();
                    let TokenKind::Ident(property) = self.advance() else {
                        return Err(self.error("Expected property name after `.`"));
                    };
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr(0)?;
                    self.expect(TokenKind::RBracket, "`]`")?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_list(TokenKind::RParen, "`)`")?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Comma-separated expressions up to `close`; a trailing comma is allowed.
    fn parse_list(&mut self, close: TokenKind, what: &str) -> Result<Vec<Expr>, ExpressionError> {
        let mut items = Vec::new();
        loop {
            if self.peek() == &close {
                self.advance();
                return Ok(items);
            }
            items.push(self.parse_expr(0)?);
            if self.peek() == &TokenKind::Comma {
                self.advance();
            } else {
                self.expect(close, what)?;
                return Ok(items);
            }
        }
    }
}

fn unary(op: UnaryOp, operand: Expr) -> Expr {
    Expr::Unary {
        op,
        operand: Box::new(operand),
    }
}

fn logical(op: LogicalOp, left: Box<Expr>, right: Box<Expr>) -> Expr {
    Expr::Logical { op, left, right }
}

fn infix_bp(kind: &TokenKind) -> Option<(u8, u8)> {
    let bp = match kind {
        TokenKind::Question => BP_CONDITIONAL,
        TokenKind::QuestionQuestion => BP_NULLISH,
        TokenKind::PipePipe => BP_OR,
        TokenKind::AmpAmp => BP_AND,
        TokenKind::EqEqEq | TokenKind::BangEqEq | TokenKind::EqEq | TokenKind::BangEq => {
            BP_EQUALITY
        }
        TokenKind::Lt | TokenKind::LtEq | TokenKind::Gt | TokenKind::GtEq => BP_COMPARISON,
        TokenKind::Plus | TokenKind::Minus => BP_ADDITIVE,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => BP_MULTIPLICATIVE,
        _ => return None,
    };
    Some((bp, bp + 1))
}
