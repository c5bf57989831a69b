//! Indexing and Python-style slicing for strings and lists.
//!
//! Both operate on characters for strings. Slice bounds truncate to
//! integers and clamp; a missing bound defaults to the whole sequence
//! in the direction of the step.

use crate::ast::Expression;

use super::error::RuntimeError;
use super::value::Value;
use super::Interpreter;

impl Interpreter {
    pub(super) fn eval_index(
        &mut self,
        target: &Expression,
        index: &Expression,
    ) -> Result<Value, RuntimeError> {
        let target = self.eval_expression(target)?;
        let index = self.eval_expression(index)?;
        let index = integer_index(&index)?;
        match &target {
            Value::Str(text) => {
                let chars: Vec<char> = text.chars().collect();
                let position = resolve_position(index, chars.len(), "String")?;
                Ok(Value::Str(chars[position].to_string()))
            }
            Value::List(list) => {
                let items = list.borrow();
                let position = resolve_position(index, items.len(), "List")?;
                Ok(items[position].clone())
            }
            other => Err(RuntimeError::IndexTargetUnsupported {
                type_name: other.type_name(),
            }),
        }
    }

    pub(super) fn eval_slice(
        &mut self,
        target: &Expression,
        start: Option<&Expression>,
        end: Option<&Expression>,
        step: Option<&Expression>,
    ) -> Result<Value, RuntimeError> {
        let target = self.eval_expression(target)?;
        let start = self.eval_slice_bound(start, "start index")?;
        let end = self.eval_slice_bound(end, "end index")?;
        let step = self.eval_slice_bound(step, "step")?.unwrap_or(1);
        if step == 0 {
            return Err(RuntimeError::SliceStepZero);
        }
        match &target {
            Value::Str(text) => {
                let chars: Vec<char> = text.chars().collect();
                let sliced: String = slice_positions(chars.len(), start, end, step)
                    .into_iter()
                    .map(|i| chars[i])
                    .collect();
                Ok(Value::Str(sliced))
            }
            Value::List(list) => {
                let items = list.borrow();
                let sliced: Vec<Value> = slice_positions(items.len(), start, end, step)
                    .into_iter()
                    .map(|i| items[i].clone())
                    .collect();
                Ok(Value::list(sliced))
            }
            other => Err(RuntimeError::SliceTargetUnsupported {
                type_name: other.type_name(),
            }),
        }
    }

    fn eval_slice_bound(
        &mut self,
        bound: Option<&Expression>,
        name: &'static str,
    ) -> Result<Option<i64>, RuntimeError> {
        let Some(expr) = bound else {
            return Ok(None);
        };
        match self.eval_expression(expr)? {
            // Slice bounds truncate rather than requiring exact integers.
            Value::Number(value) => Ok(Some(value as i64)),
            other => Err(RuntimeError::SliceBoundNotNumber {
                bound: name,
                type_name: other.type_name(),
            }),
        }
    }
}

/// Index validation shared with the mutating list built-ins: the value
/// must be an exact integer Number.
pub(super) fn integer_index(value: &Value) -> Result<i64, RuntimeError> {
    match value {
        Value::Number(raw) => {
            if raw.fract() != 0.0 {
                return Err(RuntimeError::IndexNotInteger { value: *raw });
            }
            Ok(*raw as i64)
        }
        other => Err(RuntimeError::IndexNotNumber {
            type_name: other.type_name(),
        }),
    }
}

fn resolve_position(index: i64, len: usize, kind: &'static str) -> Result<usize, RuntimeError> {
    let len_i = len as i64;
    let adjusted = if index < 0 { index + len_i } else { index };
    if adjusted < 0 || adjusted >= len_i {
        return Err(RuntimeError::IndexOutOfBounds {
            kind,
            index: adjusted,
            len,
        });
    }
    Ok(adjusted as usize)
}

/// Computes the visited positions for `start:end:step` over a sequence
/// of `len` elements, with Python normalization and clamping.
fn slice_positions(len: usize, start: Option<i64>, end: Option<i64>, step: i64) -> Vec<usize> {
    let len = len as i64;
    let clamp = |value: i64| {
        let value = if value < 0 { value + len } else { value };
        if step > 0 {
            value.clamp(0, len)
        } else {
            // For a negative step the walk may legitimately stop just
            // before position 0, hence the -1 floor.
            value.clamp(-1, len - 1)
        }
    };
    let start = match start {
        Some(value) => clamp(value),
        None if step > 0 => 0,
        None => len - 1,
    };
    let end = match end {
        Some(value) => clamp(value),
        None if step > 0 => len,
        None => -1,
    };

    let mut positions = Vec::new();
    let mut i = start;
    while (step > 0 && i < end) || (step < 0 && i > end) {
        positions.push(i as usize);
        i += step;
    }
    positions
}
