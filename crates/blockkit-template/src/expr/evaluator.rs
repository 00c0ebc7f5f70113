/*
 * expr/evaluator.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Tree-walking evaluator for interpolated expressions.
//!
//! The scope is exactly the render context's keys plus the `Math`, `JSON` and
//! `Date` namespaces. Context keys shadow the namespaces.

use super::ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
use super::builtins::{Builtin, Namespace, NamespaceMember, call_builtin, call_method, has_method};
use crate::context::RenderContext;
use crate::error::ExpressionError;
use crate::value::Value;
use std::cmp::Ordering;

/// Evaluate an expression against a render context.
pub fn evaluate(expr: &Expr, context: &RenderContext) -> Result<Value, ExpressionError> {
    Evaluator { context }.eval(expr)
}

/// Intermediate result: namespaces and callables are not first-class values.
enum Operand {
    Value(Value),
    Namespace(Namespace),
    Function(Builtin),
    Method { receiver: Value, name: String },
}

struct Evaluator<'a> {
    context: &'a RenderContext,
}

impl Evaluator<'_> {
    fn eval(&self, expr: &Expr) -> Result<Value, ExpressionError> {
        Ok(match self.eval_operand(expr)? {
            Operand::Value(value) => value,
            Operand::Namespace(ns) => Value::String(format!("[object {}]", ns.name())),
            Operand::Function(builtin) => {
                Value::String(format!("function {}() {{ [native code] }}", builtin.name))
            }
            Operand::Method { name, .. } => {
                Value::String(format!("function {name}() {{ [native code] }}"))
            }
        })
    }

    fn eval_operand(&self, expr: &Expr) -> Result<Operand, ExpressionError> {
        match expr {
            Expr::Literal(value) => Ok(Operand::Value(value.clone())),
            Expr::Array(items) => {
                let values = items
                    .iter()
                    .map(|item| self.eval(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Operand::Value(Value::Array(values)))
            }
            Expr::Ident(name) => self.lookup(name),
            Expr::Member { object, property } => {
                let target = self.eval_operand(object)?;
                self.member(target, property, object)
            }
            Expr::Index { object, index } => {
                let target = self.eval_operand(object)?;
                let key = self.eval(index)?;
                match target {
                    Operand::Namespace(_) => self.member(target, &key.to_js_string(), object),
                    _ => {
                        let target = self.operand_value(target);
                        if target.is_nullish() {
                            return Err(ExpressionError::type_error(format!(
                                "Cannot read properties of {} (reading '{}')",
                                target.to_js_string(),
                                key.to_js_string()
                            )));
                        }
                        Ok(Operand::Value(index_value(&target, &key)))
                    }
                }
            }
            Expr::Call { callee, args } => {
                let target = self.eval_operand(callee)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                let result = match target {
                    Operand::Function(builtin) => call_builtin(builtin, &args)?,
                    Operand::Method { receiver, name } => call_method(&receiver, &name, &args)?,
                    Operand::Value(_) | Operand::Namespace(_) => {
                        return Err(ExpressionError::type_error(format!(
                            "{} is not a function",
                            callee.describe()
                        )));
                    }
                };
                Ok(Operand::Value(result))
            }
            Expr::Unary { op, operand } => self.unary(*op, operand).map(Operand::Value),
            Expr::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(Operand::Value(binary(*op, &left, &right)))
            }
            Expr::Logical { op, left, right } => {
                let left = self.eval(left)?;
                let take_left = match op {
                    LogicalOp::And => !left.is_truthy(),
                    LogicalOp::Or => left.is_truthy(),
                    LogicalOp::Nullish => !left.is_nullish(),
                };
                if take_left {
                    Ok(Operand::Value(left))
                } else {
                    self.eval(right).map(Operand::Value)
                }
            }
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval(condition)?.is_truthy() {
                    self.eval_operand(then_branch)
                } else {
                    self.eval_operand(else_branch)
                }
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<Operand, ExpressionError> {
        if let Some(value) = self.context.get(name) {
            return Ok(Operand::Value(value.clone()));
        }
        Namespace::lookup(name)
            .map(Operand::Namespace)
            .ok_or_else(|| ExpressionError::Reference {
                name: name.to_string(),
            })
    }

    fn member(
        &self,
        target: Operand,
        property: &str,
        object: &Expr,
    ) -> Result<Operand, ExpressionError> {
        match target {
            Operand::Namespace(ns) => Ok(match ns.member(property) {
                Some(NamespaceMember::Constant(value)) => Operand::Value(value),
                Some(NamespaceMember::Function(builtin)) => Operand::Function(builtin),
                None => Operand::Value(Value::Undefined),
            }),
            other => {
                let value = self.operand_value(other);
                if value.is_nullish() {
                    return Err(ExpressionError::type_error(format!(
                        "Cannot read properties of {} (reading '{property}') in `{}`",
                        value.to_js_string(),
                        object.describe()
                    )));
                }
                if has_method(&value, property) {
                    return Ok(Operand::Method {
                        receiver: value,
                        name: property.to_string(),
                    });
                }
                Ok(Operand::Value(value.get_member(property)))
            }
        }
    }

    fn operand_value(&self, operand: Operand) -> Value {
        match operand {
            Operand::Value(value) => value,
            // Callables carry no properties of their own.
            _ => Value::Undefined,
        }
    }

    fn unary(&self, op: UnaryOp, operand: &Expr) -> Result<Value, ExpressionError> {
        if op == UnaryOp::Typeof {
            let name = match self.eval_operand(operand) {
                Ok(Operand::Value(value)) => value.type_name(),
                Ok(Operand::Namespace(_)) => "object",
                Ok(Operand::Function(_) | Operand::Method { .. }) => "function",
                Err(ExpressionError::Reference { .. }) if matches!(operand, Expr::Ident(_)) => {
                    "undefined"
                }
                Err(e) => return Err(e),
            };
            return Ok(Value::string(name));
        }

        let value = self.eval(operand)?;
        Ok(match op {
            UnaryOp::Not => Value::Bool(!value.is_truthy()),
            UnaryOp::Neg => Value::Number(-value.to_number()),
            UnaryOp::Plus => Value::Number(value.to_number()),
            UnaryOp::Typeof => Value::string(value.type_name()),
        })
    }
}

fn index_value(target: &Value, key: &Value) -> Value {
    match key {
        Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 => target.get_index(*n as usize),
        other => target.get_member(&other.to_js_string()),
    }
}

fn is_string_like(value: &Value) -> bool {
    matches!(
        value,
        Value::String(_) | Value::Array(_) | Value::Object(_) | Value::Markup(_)
    )
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Add => {
            if is_string_like(left) || is_string_like(right) {
                Value::String(left.to_js_string() + &right.to_js_string())
            } else {
                Value::Number(left.to_number() + right.to_number())
            }
        }
        BinaryOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Mul => Value::Number(left.to_number() * right.to_number()),
        BinaryOp::Div => Value::Number(left.to_number() / right.to_number()),
        BinaryOp::Rem => Value::Number(left.to_number() % right.to_number()),
        BinaryOp::StrictEq => Value::Bool(strict_equals(left, right)),
        BinaryOp::StrictNotEq => Value::Bool(!strict_equals(left, right)),
        BinaryOp::LooseEq => Value::Bool(loose_equals(left, right)),
        BinaryOp::LooseNotEq => Value::Bool(!loose_equals(left, right)),
        BinaryOp::Lt => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        BinaryOp::LtEq => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gt => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinaryOp::GtEq => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
    }
}

/// Same type and same value. Arrays and objects compare structurally since
/// values carry no identity.
fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a == b,
        _ => left == right,
    }
}

fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (a, b) if a.is_nullish() || b.is_nullish() => a.is_nullish() && b.is_nullish(),
        (Value::Number(_), Value::String(_))
        | (Value::String(_), Value::Number(_))
        | (Value::Bool(_), _)
        | (_, Value::Bool(_)) => left.to_number() == right.to_number(),
        _ => strict_equals(left, right),
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}
