//! Embedded expression interpreter.
//!
//! Condition and expression bodies are rendered to text first (variables are
//! substituted), then parsed and evaluated here. Bare identifiers resolve
//! against loop bindings only.
//!
//! `!` binds tighter than comparisons as in JavaScript; the `not` keyword
//! binds looser, as in Python.

mod lexer;
mod parser;

pub use lexer::Token;
pub use parser::{parse, prec, BinaryOp, BindingPower, Expr, UnaryOp};

use crate::error::RuntimeError;
use crate::scope::Locals;
use crate::value::Value;
use std::cmp::Ordering;

/// Parses and evaluates `text`.
pub fn evaluate(text: &str, locals: &Locals) -> Result<Value, RuntimeError> {
    parse(text)?.eval(locals)
}

impl Expr {
    /// Evaluates the expression against loop bindings.
    pub fn eval(&self, locals: &Locals) -> Result<Value, RuntimeError> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Name(name) => locals
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeError::UnknownName {
                    name: name.to_string(),
                }),
            Expr::List(items) => items
                .iter()
                .map(|item| item.eval(locals))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Expr::Unary(op, operand) => unary(*op, operand.eval(locals)?),
            Expr::Binary(BinaryOp::And, lhs, rhs) => {
                let left = lhs.eval(locals)?;
                if left.is_truthy() {
                    rhs.eval(locals)
                } else {
                    Ok(left)
                }
            }
            Expr::Binary(BinaryOp::Or, lhs, rhs) => {
                let left = lhs.eval(locals)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    rhs.eval(locals)
                }
            }
            Expr::Binary(op, lhs, rhs) => binary(*op, lhs.eval(locals)?, rhs.eval(locals)?),
            Expr::Field(target, field) => Ok(match target.eval(locals)? {
                Value::Map(mut entries) => entries.swap_remove(field.as_str()).unwrap_or_default(),
                _ => Value::Absent,
            }),
            Expr::Index(target, index) => {
                let target = target.eval(locals)?;
                let index = index.eval(locals)?;
                Ok(item(target, &index))
            }
        }
    }
}

fn item(target: Value, index: &Value) -> Value {
    match (target, index) {
        (Value::List(mut items), Value::Int(n)) => usize::try_from(*n)
            .ok()
            .filter(|&n| n < items.len())
            .map(|n| items.swap_remove(n))
            .unwrap_or_default(),
        (Value::Map(mut entries), Value::Str(key)) => {
            entries.swap_remove(key.as_str()).unwrap_or_default()
        }
        (Value::Map(mut entries), Value::Int(n)) => {
            entries.swap_remove(n.to_string().as_str()).unwrap_or_default()
        }
        (Value::Str(s), Value::Int(n)) => usize::try_from(*n)
            .ok()
            .and_then(|n| s.chars().nth(n))
            .map(|c| Value::Str(c.to_string()))
            .unwrap_or_default(),
        _ => Value::Absent,
    }
}

fn unary(op: UnaryOp, operand: Value) -> Result<Value, RuntimeError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        UnaryOp::Pos => match operand {
            Value::Bool(b) => Ok(Value::Int(i64::from(b))),
            Value::Int(_) | Value::Float(_) => Ok(operand),
            other => Err(operand_error("+", &other, None)),
        },
        UnaryOp::Neg => match operand {
            Value::Bool(b) => Ok(Value::Int(-i64::from(b))),
            Value::Int(n) => n
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| RuntimeError::type_error("integer overflow")),
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Err(operand_error("-", &other, None)),
        },
    }
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Or => Ok(if lhs.is_truthy() { lhs } else { rhs }),
        BinaryOp::And => Ok(if lhs.is_truthy() { rhs } else { lhs }),
        BinaryOp::Eq => Ok(Value::Bool(lhs.loose_eq(&rhs))),
        BinaryOp::Ne => Ok(Value::Bool(!lhs.loose_eq(&rhs))),
        BinaryOp::Lt => ordered(&lhs, &rhs, &[Ordering::Less]),
        BinaryOp::Le => ordered(&lhs, &rhs, &[Ordering::Less, Ordering::Equal]),
        BinaryOp::Gt => ordered(&lhs, &rhs, &[Ordering::Greater]),
        BinaryOp::Ge => ordered(&lhs, &rhs, &[Ordering::Greater, Ordering::Equal]),
        BinaryOp::Add => match (lhs, rhs) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
            (Value::List(mut a), Value::List(b)) => {
                a.extend(b);
                Ok(Value::List(a))
            }
            (lhs, rhs) => arithmetic(op, &lhs, &rhs),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            arithmetic(op, &lhs, &rhs)
        }
    }
}

fn ordered(lhs: &Value, rhs: &Value, expected: &[Ordering]) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(expected.contains(&lhs.compare(rhs)?)))
}

fn arithmetic(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, RuntimeError> {
    let overflow = || RuntimeError::type_error("integer overflow");
    let by_zero = || RuntimeError::type_error("division by zero");

    if let (Some(a), Some(b)) = (lhs.as_i64(), rhs.as_i64()) {
        return match op {
            BinaryOp::Add => a.checked_add(b).map(Value::Int).ok_or_else(overflow),
            BinaryOp::Sub => a.checked_sub(b).map(Value::Int).ok_or_else(overflow),
            BinaryOp::Mul => a.checked_mul(b).map(Value::Int).ok_or_else(overflow),
            BinaryOp::Div if b == 0 => Err(by_zero()),
            BinaryOp::Div if a.checked_rem(b) == Some(0) => {
                a.checked_div(b).map(Value::Int).ok_or_else(overflow)
            }
            BinaryOp::Div => Ok(Value::Float(a as f64 / b as f64)),
            BinaryOp::Rem if b == 0 => Err(by_zero()),
            BinaryOp::Rem => a
                .checked_rem_euclid(b)
                .map(|r| if r != 0 && b < 0 { r + b } else { r })
                .map(Value::Int)
                .ok_or_else(overflow),
            _ => Err(operand_error(op.as_str(), lhs, Some(rhs))),
        };
    }

    let (Some(a), Some(b)) = (lhs.as_f64(), rhs.as_f64()) else {
        return Err(operand_error(op.as_str(), lhs, Some(rhs)));
    };
    match op {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Sub => Ok(Value::Float(a - b)),
        BinaryOp::Mul => Ok(Value::Float(a * b)),
        BinaryOp::Div | BinaryOp::Rem if b == 0.0 => Err(by_zero()),
        BinaryOp::Div => Ok(Value::Float(a / b)),
        BinaryOp::Rem => Ok(Value::Float(a - b * (a / b).floor())),
        _ => Err(operand_error(op.as_str(), lhs, Some(rhs))),
    }
}

fn operand_error(op: &str, lhs: &Value, rhs: Option<&Value>) -> RuntimeError {
    match rhs {
        Some(rhs) => RuntimeError::type_error(format!(
            "unsupported operands for `{op}`: {} and {}",
            lhs.type_name(),
            rhs.type_name()
        )),
        None => RuntimeError::type_error(format!(
            "unsupported operand for unary `{op}`: {}",
            lhs.type_name()
        )),
    }
}
