use thiserror::Error;

use crate::ast::BinaryOperator;

/// Typed errors produced while executing a program. Evaluation halts at
/// the first error; the language has no construct to catch one.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },
    #[error("Undefined variable '{name}' in compound assignment")]
    CompoundAssignUndefined { name: String },
    #[error("Built-in function '{name}' must be called with parentheses")]
    BuiltinWithoutCall { name: String },

    #[error("Operator '{op}' cannot be applied to types {left} and {right}")]
    BinaryTypeMismatch {
        op: BinaryOperator,
        left: &'static str,
        right: &'static str,
    },
    #[error("Operator '{op}' cannot be applied if an operand is Nil")]
    NilOperand { op: BinaryOperator },
    #[error("Operator '{op}' cannot compare types {left} and {right}")]
    CompareTypeMismatch {
        op: BinaryOperator,
        left: &'static str,
        right: &'static str,
    },
    #[error("Operand for unary '-' must be a number, got {type_name}")]
    NegateNonNumber { type_name: &'static str },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Modulo by zero")]
    ModuloByZero,
    #[error("Cannot multiply a {kind} by a negative number")]
    NegativeRepeatCount { kind: &'static str },

    #[error("Attempted to call a non-function value (type {type_name}) derived from {callee}")]
    NotCallable {
        type_name: &'static str,
        callee: String,
    },
    #[error("Wrong number of arguments for function: expected {expected}, got {found}")]
    ArityMismatch { expected: usize, found: usize },
    #[error("{name}() expects {expected}")]
    BuiltinArity {
        name: &'static str,
        expected: &'static str,
    },
    #[error("{name}() {message}")]
    BuiltinArgument {
        name: &'static str,
        message: &'static str,
    },

    #[error("{name}() expects a list stored in a variable as its first argument")]
    ListVariableExpected { name: &'static str },
    #[error("Variable '{name}' is not a list")]
    NotAList { name: String },
    #[error("Cannot pop from an empty list")]
    PopFromEmptyList,
    #[error("Index out of bounds for {name}(): {index}, size {len}")]
    MutationIndexOutOfBounds {
        name: &'static str,
        index: i64,
        len: usize,
    },

    #[error("Index must be a number, got {type_name}")]
    IndexNotNumber { type_name: &'static str },
    #[error("Index must be an integer, got {value}")]
    IndexNotInteger { value: f64 },
    #[error("{kind} index out of bounds: {index}, size {len}")]
    IndexOutOfBounds {
        kind: &'static str,
        index: i64,
        len: usize,
    },
    #[error("Cannot index a value of type {type_name}")]
    IndexTargetUnsupported { type_name: &'static str },
    #[error("Slice {bound} must be a number, got {type_name}")]
    SliceBoundNotNumber {
        bound: &'static str,
        type_name: &'static str,
    },
    #[error("Slice step cannot be zero")]
    SliceStepZero,
    #[error("Slice operation can only be applied to strings or lists, got {type_name}")]
    SliceTargetUnsupported { type_name: &'static str },

    #[error("For loop can only iterate over lists or strings, got {type_name}")]
    ForIterableUnsupported { type_name: &'static str },
    #[error("range() step argument cannot be zero")]
    RangeStepZero,
    #[error("sqrt() argument cannot be negative")]
    SqrtOfNegative,
    #[error("replace() old substring cannot be empty")]
    ReplaceEmptyPattern,
    #[error("join() expects a list of strings, found {type_name}")]
    JoinNonStringElement { type_name: &'static str },
    #[error("sort() can only sort lists of numbers or lists of strings, first element is {type_name}")]
    SortUnsupportedElement { type_name: &'static str },
    #[error("Cannot sort a list with mixed types (expected {expected})")]
    SortMixedTypes { expected: &'static str },

    #[error("'break' used outside of a loop")]
    BreakOutsideLoop,
    #[error("'continue' used outside of a loop")]
    ContinueOutsideLoop,
}
