//! Binary and unary operator semantics over runtime values.
//!
//! The `Pow` arm is reachable only through compound assignment (`^=`);
//! the parser never produces a standalone `^` binary expression.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{BinaryOperator, UnaryOperator};

use super::error::RuntimeError;
use super::value::Value;

pub(super) fn apply_unary(op: UnaryOperator, operand: &Value) -> Result<Value, RuntimeError> {
    match op {
        UnaryOperator::Not => Ok(Value::from_bool(!operand.is_truthy())),
        UnaryOperator::Neg => match operand {
            Value::Number(value) => Ok(Value::Number(-value)),
            other => Err(RuntimeError::NegateNonNumber {
                type_name: other.type_name(),
            }),
        },
    }
}

pub(super) fn apply_binary(
    op: BinaryOperator,
    left: &Value,
    right: &Value,
) -> Result<Value, RuntimeError> {
    use crate::ast::BinaryOperator::*;
    match op {
        Add | Sub | Mul | Div | Mod | Pow => apply_arithmetic(op, left, right),
        Eq | NotEq => apply_equality(op, left, right),
        Less | LessEq | Greater | GreaterEq => apply_comparison(op, left, right),
        // Logic never fails: both sides were already evaluated and any
        // value has a truthiness.
        And => Ok(Value::from_bool(left.is_truthy() && right.is_truthy())),
        Or => Ok(Value::from_bool(left.is_truthy() || right.is_truthy())),
    }
}

fn apply_arithmetic(
    op: BinaryOperator,
    left: &Value,
    right: &Value,
) -> Result<Value, RuntimeError> {
    if matches!(left, Value::Nil) || matches!(right, Value::Nil) {
        return Err(RuntimeError::NilOperand { op });
    }
    match op {
        BinaryOperator::Add => match (left, right) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
            (Value::Str(l), Value::Str(r)) => Ok(Value::Str(format!("{l}{r}"))),
            (Value::List(l), Value::List(r)) => {
                let mut items = l.borrow().clone();
                items.extend(r.borrow().iter().cloned());
                Ok(Value::list(items))
            }
            _ => Err(type_mismatch(op, left, right)),
        },
        BinaryOperator::Sub => match (left, right) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l - r)),
            // String subtraction strips a matching suffix, otherwise the
            // left side passes through unchanged.
            (Value::Str(l), Value::Str(r)) => Ok(Value::Str(
                l.strip_suffix(r.as_str()).unwrap_or(l).to_string(),
            )),
            _ => Err(type_mismatch(op, left, right)),
        },
        BinaryOperator::Mul => match (left, right) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l * r)),
            (Value::Str(text), Value::Number(count))
            | (Value::Number(count), Value::Str(text)) => repeat_string(text, *count),
            (Value::List(list), Value::Number(count))
            | (Value::Number(count), Value::List(list)) => repeat_list(list, *count),
            _ => Err(type_mismatch(op, left, right)),
        },
        BinaryOperator::Div => match (left, right) {
            (Value::Number(_), Value::Number(r)) if *r == 0.0 => {
                Err(RuntimeError::DivisionByZero)
            }
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l / r)),
            _ => Err(type_mismatch(op, left, right)),
        },
        BinaryOperator::Mod => match (left, right) {
            (Value::Number(_), Value::Number(r)) if *r == 0.0 => Err(RuntimeError::ModuloByZero),
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l % r)),
            _ => Err(type_mismatch(op, left, right)),
        },
        BinaryOperator::Pow => match (left, right) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l.powf(*r))),
            _ => Err(type_mismatch(op, left, right)),
        },
        _ => unreachable!("apply_arithmetic called with non-arithmetic operator"),
    }
}

fn apply_equality(op: BinaryOperator, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    let equal = match (left, right) {
        (Value::Nil, Value::Nil) => true,
        (Value::Nil, _) | (_, Value::Nil) => false,
        (Value::Number(l), Value::Number(r)) => l == r,
        (Value::Str(l), Value::Str(r)) => l == r,
        _ => {
            return Err(RuntimeError::CompareTypeMismatch {
                op,
                left: left.type_name(),
                right: right.type_name(),
            });
        }
    };
    Ok(Value::from_bool(if op == BinaryOperator::Eq {
        equal
    } else {
        !equal
    }))
}

fn apply_comparison(
    op: BinaryOperator,
    left: &Value,
    right: &Value,
) -> Result<Value, RuntimeError> {
    if matches!(left, Value::Nil) || matches!(right, Value::Nil) {
        return Err(RuntimeError::NilOperand { op });
    }
    let holds = match (left, right) {
        (Value::Number(l), Value::Number(r)) => ordered(op, l, r),
        (Value::Str(l), Value::Str(r)) => ordered(op, l, r),
        _ => return Err(type_mismatch(op, left, right)),
    };
    Ok(Value::from_bool(holds))
}

fn ordered<T: PartialOrd + ?Sized>(op: BinaryOperator, left: &T, right: &T) -> bool {
    match op {
        BinaryOperator::Less => left < right,
        BinaryOperator::LessEq => left <= right,
        BinaryOperator::Greater => left > right,
        BinaryOperator::GreaterEq => left >= right,
        _ => unreachable!("ordered called with non-comparison operator"),
    }
}

fn repeat_string(text: &str, count: f64) -> Result<Value, RuntimeError> {
    if count < 0.0 {
        return Err(RuntimeError::NegativeRepeatCount { kind: "string" });
    }
    Ok(Value::Str(text.repeat(count as usize)))
}

fn repeat_list(list: &Rc<RefCell<Vec<Value>>>, count: f64) -> Result<Value, RuntimeError> {
    if count < 0.0 {
        return Err(RuntimeError::NegativeRepeatCount { kind: "list" });
    }
    let items = list.borrow();
    let count = count as usize;
    let mut result = Vec::with_capacity(items.len().saturating_mul(count));
    for _ in 0..count {
        result.extend(items.iter().cloned());
    }
    Ok(Value::list(result))
}

fn type_mismatch(op: BinaryOperator, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::BinaryTypeMismatch {
        op,
        left: left.type_name(),
        right: right.type_name(),
    }
}
