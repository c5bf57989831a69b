//! Tree-walking evaluator.
//!
//! Executes a parsed [`Program`] against a single globals map,
//! accumulating everything the program prints in an output buffer.
//! Function calls snapshot the globals and restore them on exit, so
//! scalar bindings are call-transparent while lists and functions stay
//! shared by handle.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ast::Program;

mod access;
mod builtins;
mod error;
mod ops;
mod runtime;
mod value;

pub use error::RuntimeError;
pub use value::{Function, Value};

use runtime::ExecResult;

pub struct Interpreter {
    globals: HashMap<String, Value>,
    output: String,
    rng: Rng,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            globals: HashMap::new(),
            output: String::new(),
            rng: Rng::from_clock(),
        }
    }

    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        match self.exec_block(&program.statements)? {
            // A top-level `return` simply ends the program.
            ExecResult::Normal | ExecResult::Return(_) => Ok(()),
            ExecResult::Break => Err(RuntimeError::BreakOutsideLoop),
            ExecResult::Continue => Err(RuntimeError::ContinueOutsideLoop),
        }
    }

    /// Everything the program has printed so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn into_output(self) -> String {
        self.output
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// splitmix64, seeded once from the wall clock. Backs the `rnd`
/// built-in; statistical quality well beyond what a scripting-language
/// `rnd` promises.
struct Rng {
    state: u64,
}

impl Rng {
    fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or(0x9E37_79B9_7F4A_7C15);
        Self { state: seed }
    }

    /// Uniform double in [0, 1).
    fn next_unit(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }
}
