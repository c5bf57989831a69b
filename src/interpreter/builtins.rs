//! The built-in function table.
//!
//! Dispatch is syntactic: a call whose callee is an identifier naming a
//! built-in goes through here before any globals lookup, so built-ins
//! cannot be shadowed in call position. The mutating list built-ins
//! (`push`, `pop`, `insert`, `remove`, `sort`) additionally require
//! their list argument to be a bare identifier bound to a list.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::Expression;

use super::access::integer_index;
use super::error::RuntimeError;
use super::value::Value;
use super::Interpreter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Builtin {
    Print,
    Println,
    Read,
    Stacktrace,
    Len,
    Push,
    Pop,
    Insert,
    Remove,
    Sort,
    Range,
    Abs,
    Ceil,
    Floor,
    Round,
    Sqrt,
    Rnd,
    ParseNum,
    ToString,
    Lower,
    Upper,
    Split,
    Join,
    Replace,
}

impl Builtin {
    pub(super) fn name(self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::Println => "println",
            Self::Read => "read",
            Self::Stacktrace => "stacktrace",
            Self::Len => "len",
            Self::Push => "push",
            Self::Pop => "pop",
            Self::Insert => "insert",
            Self::Remove => "remove",
            Self::Sort => "sort",
            Self::Range => "range",
            Self::Abs => "abs",
            Self::Ceil => "ceil",
            Self::Floor => "floor",
            Self::Round => "round",
            Self::Sqrt => "sqrt",
            Self::Rnd => "rnd",
            Self::ParseNum => "parse_num",
            Self::ToString => "to_string",
            Self::Lower => "lower",
            Self::Upper => "upper",
            Self::Split => "split",
            Self::Join => "join",
            Self::Replace => "replace",
        }
    }

    pub(super) fn from_name(name: &str) -> Option<Self> {
        match name {
            "print" => Some(Self::Print),
            "println" => Some(Self::Println),
            "read" => Some(Self::Read),
            "stacktrace" => Some(Self::Stacktrace),
            "len" => Some(Self::Len),
            "push" => Some(Self::Push),
            "pop" => Some(Self::Pop),
            "insert" => Some(Self::Insert),
            "remove" => Some(Self::Remove),
            "sort" => Some(Self::Sort),
            "range" => Some(Self::Range),
            "abs" => Some(Self::Abs),
            "ceil" => Some(Self::Ceil),
            "floor" => Some(Self::Floor),
            "round" => Some(Self::Round),
            "sqrt" => Some(Self::Sqrt),
            "rnd" => Some(Self::Rnd),
            "parse_num" => Some(Self::ParseNum),
            "to_string" => Some(Self::ToString),
            "lower" => Some(Self::Lower),
            "upper" => Some(Self::Upper),
            "split" => Some(Self::Split),
            "join" => Some(Self::Join),
            "replace" => Some(Self::Replace),
            _ => None,
        }
    }
}

impl Interpreter {
    pub(super) fn call_builtin(
        &mut self,
        builtin: Builtin,
        args: &[Expression],
    ) -> Result<Value, RuntimeError> {
        match builtin {
            Builtin::Print => {
                for arg in args {
                    let value = self.eval_expression(arg)?;
                    self.output.push_str(&value.print_form());
                }
                Ok(Value::Nil)
            }
            Builtin::Println => {
                for arg in args {
                    let value = self.eval_expression(arg)?;
                    self.output.push_str(&value.print_form());
                }
                self.output.push('\n');
                Ok(Value::Nil)
            }
            Builtin::Read => {
                expect_arity(builtin, args, 0, "0 arguments")?;
                Ok(Value::Str(String::new()))
            }
            Builtin::Stacktrace => {
                expect_arity(builtin, args, 0, "0 arguments")?;
                Ok(Value::list(Vec::new()))
            }
            Builtin::Len => {
                expect_arity(builtin, args, 1, "exactly 1 argument")?;
                match self.eval_expression(&args[0])? {
                    Value::Str(text) => Ok(Value::Number(text.chars().count() as f64)),
                    Value::List(items) => Ok(Value::Number(items.borrow().len() as f64)),
                    _ => Err(RuntimeError::BuiltinArgument {
                        name: "len",
                        message: "argument must be a string or a list",
                    }),
                }
            }
            Builtin::Push => {
                expect_arity(builtin, args, 2, "2 arguments: list and value")?;
                let item = self.eval_expression(&args[1])?;
                let list = self.list_variable(builtin, &args[0])?;
                list.borrow_mut().push(item);
                Ok(Value::Nil)
            }
            Builtin::Pop => {
                expect_arity(builtin, args, 1, "1 argument: list")?;
                let list = self.list_variable(builtin, &args[0])?;
                let popped = list.borrow_mut().pop();
                popped.ok_or(RuntimeError::PopFromEmptyList)
            }
            Builtin::Insert => {
                expect_arity(builtin, args, 3, "3 arguments: list, index and value")?;
                let index = self.eval_expression(&args[1])?;
                let item = self.eval_expression(&args[2])?;
                let list = self.list_variable(builtin, &args[0])?;
                let index = integer_index(&index)?;
                let mut items = list.borrow_mut();
                // Insertion may target one past the last element.
                if index < 0 || index as usize > items.len() {
                    return Err(RuntimeError::MutationIndexOutOfBounds {
                        name: "insert",
                        index,
                        len: items.len(),
                    });
                }
                items.insert(index as usize, item);
                Ok(Value::Nil)
            }
            Builtin::Remove => {
                expect_arity(builtin, args, 2, "2 arguments: list and index")?;
                let index = self.eval_expression(&args[1])?;
                let list = self.list_variable(builtin, &args[0])?;
                let index = integer_index(&index)?;
                let mut items = list.borrow_mut();
                if index < 0 || index as usize >= items.len() {
                    return Err(RuntimeError::MutationIndexOutOfBounds {
                        name: "remove",
                        index,
                        len: items.len(),
                    });
                }
                Ok(items.remove(index as usize))
            }
            Builtin::Sort => {
                expect_arity(builtin, args, 1, "1 argument: list")?;
                let list = self.list_variable(builtin, &args[0])?;
                sort_list(&list)
            }
            Builtin::Range => self.builtin_range(args),
            Builtin::Abs => {
                expect_arity(builtin, args, 1, "1 argument")?;
                let value = self.eval_number_arg(builtin, &args[0])?;
                Ok(Value::Number(value.abs()))
            }
            Builtin::Ceil => {
                expect_arity(builtin, args, 1, "1 argument")?;
                let value = self.eval_number_arg(builtin, &args[0])?;
                Ok(Value::Number(value.ceil()))
            }
            Builtin::Floor => {
                expect_arity(builtin, args, 1, "1 argument")?;
                let value = self.eval_number_arg(builtin, &args[0])?;
                Ok(Value::Number(value.floor()))
            }
            Builtin::Round => {
                expect_arity(builtin, args, 1, "1 argument")?;
                let value = self.eval_number_arg(builtin, &args[0])?;
                Ok(Value::Number(value.round()))
            }
            Builtin::Sqrt => {
                expect_arity(builtin, args, 1, "1 argument")?;
                let value = self.eval_number_arg(builtin, &args[0])?;
                if value < 0.0 {
                    return Err(RuntimeError::SqrtOfNegative);
                }
                Ok(Value::Number(value.sqrt()))
            }
            Builtin::Rnd => {
                expect_arity(builtin, args, 0, "0 arguments")?;
                Ok(Value::Number(self.rng.next_unit()))
            }
            Builtin::ParseNum => {
                expect_arity(builtin, args, 1, "1 argument")?;
                let text = self.eval_string_arg(builtin, &args[0], "argument must be a string")?;
                match text.trim_start().parse::<f64>() {
                    Ok(value) => Ok(Value::Number(value)),
                    Err(_) => Ok(Value::Nil),
                }
            }
            Builtin::ToString => {
                expect_arity(builtin, args, 1, "1 argument")?;
                let value = self.eval_expression(&args[0])?;
                Ok(Value::Str(value.print_form()))
            }
            Builtin::Lower => {
                expect_arity(builtin, args, 1, "1 argument")?;
                let text = self.eval_string_arg(builtin, &args[0], "argument must be a string")?;
                Ok(Value::Str(text.to_ascii_lowercase()))
            }
            Builtin::Upper => {
                expect_arity(builtin, args, 1, "1 argument")?;
                let text = self.eval_string_arg(builtin, &args[0], "argument must be a string")?;
                Ok(Value::Str(text.to_ascii_uppercase()))
            }
            Builtin::Split => {
                expect_arity(builtin, args, 2, "2 arguments: string and delimiter")?;
                let text =
                    self.eval_string_arg(builtin, &args[0], "first argument must be a string")?;
                let delimiter =
                    self.eval_string_arg(builtin, &args[1], "delimiter must be a string")?;
                let parts: Vec<Value> = if delimiter.is_empty() {
                    text.chars().map(|c| Value::Str(c.to_string())).collect()
                } else {
                    text.split(delimiter.as_str())
                        .map(|part| Value::Str(part.to_string()))
                        .collect()
                };
                Ok(Value::list(parts))
            }
            Builtin::Join => {
                expect_arity(builtin, args, 2, "2 arguments: list and separator")?;
                let list = match self.eval_expression(&args[0])? {
                    Value::List(list) => list,
                    _ => {
                        return Err(RuntimeError::BuiltinArgument {
                            name: "join",
                            message: "first argument must be a list of strings",
                        });
                    }
                };
                let separator =
                    self.eval_string_arg(builtin, &args[1], "separator must be a string")?;
                let items = list.borrow();
                let mut parts = Vec::with_capacity(items.len());
                for item in items.iter() {
                    match item {
                        Value::Str(text) => parts.push(text.clone()),
                        other => {
                            return Err(RuntimeError::JoinNonStringElement {
                                type_name: other.type_name(),
                            });
                        }
                    }
                }
                Ok(Value::Str(parts.join(&separator)))
            }
            Builtin::Replace => {
                expect_arity(builtin, args, 3, "3 arguments: string, old substring and new substring")?;
                let text = self.eval_string_arg(builtin, &args[0], "arguments must be strings")?;
                let old = self.eval_string_arg(builtin, &args[1], "arguments must be strings")?;
                let new = self.eval_string_arg(builtin, &args[2], "arguments must be strings")?;
                if old.is_empty() {
                    return Err(RuntimeError::ReplaceEmptyPattern);
                }
                Ok(Value::Str(text.replace(&old, &new)))
            }
        }
    }

    fn builtin_range(&mut self, args: &[Expression]) -> Result<Value, RuntimeError> {
        let mut numbers = Vec::with_capacity(args.len());
        for arg in args {
            match self.eval_expression(arg)? {
                Value::Number(value) => numbers.push(value),
                _ => {
                    return Err(RuntimeError::BuiltinArgument {
                        name: "range",
                        message: "arguments must be numbers",
                    });
                }
            }
        }
        let (start, stop, step) = match numbers.as_slice() {
            [stop] => (0.0, *stop, 1.0),
            [start, stop] => (*start, *stop, 1.0),
            [start, stop, step] => (*start, *stop, *step),
            _ => {
                return Err(RuntimeError::BuiltinArity {
                    name: "range",
                    expected: "1, 2, or 3 arguments",
                });
            }
        };
        if step == 0.0 {
            return Err(RuntimeError::RangeStepZero);
        }
        let mut items = Vec::new();
        let mut current = start;
        if step > 0.0 {
            while current < stop {
                items.push(Value::Number(current));
                current += step;
            }
        } else {
            while current > stop {
                items.push(Value::Number(current));
                current += step;
            }
        }
        Ok(Value::list(items))
    }

    fn eval_number_arg(
        &mut self,
        builtin: Builtin,
        arg: &Expression,
    ) -> Result<f64, RuntimeError> {
        match self.eval_expression(arg)? {
            Value::Number(value) => Ok(value),
            _ => Err(RuntimeError::BuiltinArgument {
                name: builtin.name(),
                message: "argument must be a number",
            }),
        }
    }

    fn eval_string_arg(
        &mut self,
        builtin: Builtin,
        arg: &Expression,
        message: &'static str,
    ) -> Result<String, RuntimeError> {
        match self.eval_expression(arg)? {
            Value::Str(text) => Ok(text),
            _ => Err(RuntimeError::BuiltinArgument {
                name: builtin.name(),
                message,
            }),
        }
    }

    /// Resolves the named-list argument of a mutating built-in to the
    /// shared list handle it is bound to.
    fn list_variable(
        &mut self,
        builtin: Builtin,
        arg: &Expression,
    ) -> Result<Rc<RefCell<Vec<Value>>>, RuntimeError> {
        let Expression::Identifier(name) = arg else {
            return Err(RuntimeError::ListVariableExpected {
                name: builtin.name(),
            });
        };
        match self.globals.get(name) {
            Some(Value::List(list)) => Ok(Rc::clone(list)),
            _ => Err(RuntimeError::NotAList { name: name.clone() }),
        }
    }
}

fn expect_arity(
    builtin: Builtin,
    args: &[Expression],
    count: usize,
    expected: &'static str,
) -> Result<(), RuntimeError> {
    if args.len() != count {
        return Err(RuntimeError::BuiltinArity {
            name: builtin.name(),
            expected,
        });
    }
    Ok(())
}

fn sort_list(list: &Rc<RefCell<Vec<Value>>>) -> Result<Value, RuntimeError> {
    let mut items = list.borrow_mut();
    let sort_numbers = match items.first() {
        None => return Ok(Value::Nil),
        Some(Value::Number(_)) => true,
        Some(Value::Str(_)) => false,
        Some(other) => {
            return Err(RuntimeError::SortUnsupportedElement {
                type_name: other.type_name(),
            });
        }
    };
    if sort_numbers {
        if items.iter().any(|item| !matches!(item, Value::Number(_))) {
            return Err(RuntimeError::SortMixedTypes { expected: "numbers" });
        }
        items.sort_by(|a, b| match (a, b) {
            (Value::Number(l), Value::Number(r)) => {
                l.partial_cmp(r).unwrap_or(std::cmp::Ordering::Equal)
            }
            _ => std::cmp::Ordering::Equal,
        });
    } else {
        if items.iter().any(|item| !matches!(item, Value::Str(_))) {
            return Err(RuntimeError::SortMixedTypes { expected: "strings" });
        }
        items.sort_by(|a, b| match (a, b) {
            (Value::Str(l), Value::Str(r)) => l.cmp(r),
            _ => std::cmp::Ordering::Equal,
        });
    }
    Ok(Value::Nil)
}
