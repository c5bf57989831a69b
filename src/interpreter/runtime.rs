//! Statement execution and expression evaluation.
//!
//! Non-local control flow travels as an [`ExecResult`] threaded through
//! every statement: loops absorb `Break`/`Continue`, function calls
//! absorb `Return`, and anything escaping past its construct is either
//! ignored (top-level `return`) or a runtime error.

use std::rc::Rc;

use crate::ast::{BinaryOperator, Expression, Statement};

use super::builtins::Builtin;
use super::error::RuntimeError;
use super::ops;
use super::value::{Function, Value};
use super::Interpreter;

/// Control-flow marker produced by executing a statement.
pub(super) enum ExecResult {
    Normal,
    Break,
    Continue,
    Return(Value),
}

impl Interpreter {
    pub(super) fn exec_block(
        &mut self,
        statements: &[Statement],
    ) -> Result<ExecResult, RuntimeError> {
        for statement in statements {
            match self.exec_statement(statement)? {
                ExecResult::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(ExecResult::Normal)
    }

    fn exec_statement(&mut self, statement: &Statement) -> Result<ExecResult, RuntimeError> {
        match statement {
            Statement::Expr(expr) => {
                self.eval_expression(expr)?;
                Ok(ExecResult::Normal)
            }
            Statement::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expression(expr)?,
                    None => Value::Nil,
                };
                Ok(ExecResult::Return(value))
            }
            Statement::Break => Ok(ExecResult::Break),
            Statement::Continue => Ok(ExecResult::Continue),
            Statement::If {
                condition,
                then_block,
                else_ifs,
                else_block,
            } => {
                if self.eval_expression(condition)?.is_truthy() {
                    return self.exec_block(then_block);
                }
                for (condition, block) in else_ifs {
                    if self.eval_expression(condition)?.is_truthy() {
                        return self.exec_block(block);
                    }
                }
                match else_block {
                    Some(block) => self.exec_block(block),
                    None => Ok(ExecResult::Normal),
                }
            }
            Statement::While { condition, body } => {
                while self.eval_expression(condition)?.is_truthy() {
                    match self.exec_block(body)? {
                        ExecResult::Normal | ExecResult::Continue => {}
                        ExecResult::Break => break,
                        result @ ExecResult::Return(_) => return Ok(result),
                    }
                }
                Ok(ExecResult::Normal)
            }
            Statement::For {
                variable,
                iterable,
                body,
            } => self.exec_for(variable, iterable, body),
        }
    }

    fn exec_for(
        &mut self,
        variable: &str,
        iterable: &Expression,
        body: &[Statement],
    ) -> Result<ExecResult, RuntimeError> {
        let iterable = self.eval_expression(iterable)?;
        // Iterate a snapshot of the elements so the body may freely
        // mutate a shared list without invalidating the walk.
        let items: Vec<Value> = match &iterable {
            Value::List(list) => list.borrow().clone(),
            Value::Str(text) => text.chars().map(|c| Value::Str(c.to_string())).collect(),
            other => {
                return Err(RuntimeError::ForIterableUnsupported {
                    type_name: other.type_name(),
                });
            }
        };
        for item in items {
            self.globals.insert(variable.to_string(), item);
            match self.exec_block(body)? {
                ExecResult::Normal | ExecResult::Continue => {}
                ExecResult::Break => break,
                result @ ExecResult::Return(_) => return Ok(result),
            }
        }
        Ok(ExecResult::Normal)
    }

    pub(super) fn eval_expression(&mut self, expr: &Expression) -> Result<Value, RuntimeError> {
        match expr {
            Expression::Number(value) => Ok(Value::Number(*value)),
            Expression::Str(value) => Ok(Value::Str(value.clone())),
            Expression::Nil => Ok(Value::Nil),
            Expression::List(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expression(element)?);
                }
                Ok(Value::list(values))
            }
            Expression::Identifier(name) => {
                if Builtin::from_name(name).is_some() {
                    return Err(RuntimeError::BuiltinWithoutCall { name: name.clone() });
                }
                self.globals
                    .get(name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UndefinedVariable { name: name.clone() })
            }
            Expression::FunctionDef { params, body } => Ok(Value::Function(Rc::new(Function {
                params: params.clone(),
                body: body.clone(),
            }))),
            Expression::Unary { op, operand } => {
                let operand = self.eval_expression(operand)?;
                ops::apply_unary(*op, &operand)
            }
            Expression::Binary { op, left, right } => {
                // Both operands always evaluate; `and`/`or` do not
                // short-circuit in this language.
                let left = self.eval_expression(left)?;
                let right = self.eval_expression(right)?;
                ops::apply_binary(*op, &left, &right)
            }
            Expression::Assign { name, op, value } => self.eval_assignment(name, *op, value),
            Expression::Index { target, index } => self.eval_index(target, index),
            Expression::Slice {
                target,
                start,
                end,
                step,
            } => self.eval_slice(target, start.as_deref(), end.as_deref(), step.as_deref()),
            Expression::Call { callee, args } => self.eval_call(callee, args),
        }
    }

    fn eval_assignment(
        &mut self,
        name: &str,
        op: Option<BinaryOperator>,
        value: &Expression,
    ) -> Result<Value, RuntimeError> {
        let value = self.eval_expression(value)?;
        let result = match op {
            None => value,
            Some(op) => {
                let current = self.globals.get(name).cloned().ok_or_else(|| {
                    RuntimeError::CompoundAssignUndefined {
                        name: name.to_string(),
                    }
                })?;
                ops::apply_binary(op, &current, &value)?
            }
        };
        self.globals.insert(name.to_string(), result.clone());
        Ok(result)
    }

    fn eval_call(
        &mut self,
        callee: &Expression,
        args: &[Expression],
    ) -> Result<Value, RuntimeError> {
        if let Expression::Identifier(name) = callee
            && let Some(builtin) = Builtin::from_name(name)
        {
            return self.call_builtin(builtin, args);
        }

        let callee_value = self.eval_expression(callee)?;
        let function = match &callee_value {
            Value::Function(function) => Rc::clone(function),
            other => {
                return Err(RuntimeError::NotCallable {
                    type_name: other.type_name(),
                    callee: describe_callee(callee),
                });
            }
        };
        if args.len() != function.params.len() {
            return Err(RuntimeError::ArityMismatch {
                expected: function.params.len(),
                found: args.len(),
            });
        }

        // Snapshot before argument evaluation: scalar writes made while
        // evaluating arguments roll back together with the call's own.
        let saved = self.globals.clone();
        let result = self.call_function(&function, args);
        self.globals = saved;
        result
    }

    fn call_function(
        &mut self,
        function: &Function,
        args: &[Expression],
    ) -> Result<Value, RuntimeError> {
        let mut arguments = Vec::with_capacity(args.len());
        for arg in args {
            arguments.push(self.eval_expression(arg)?);
        }
        for (param, value) in function.params.iter().zip(arguments) {
            self.globals.insert(param.clone(), value);
        }
        match self.exec_block(&function.body)? {
            ExecResult::Normal => Ok(Value::Nil),
            ExecResult::Return(value) => Ok(value),
            ExecResult::Break => Err(RuntimeError::BreakOutsideLoop),
            ExecResult::Continue => Err(RuntimeError::ContinueOutsideLoop),
        }
    }
}

fn describe_callee(callee: &Expression) -> String {
    match callee {
        Expression::Identifier(name) => name.clone(),
        _ => "expression".to_string(),
    }
}
