//! `itmoscript` library crate.
//!
//! High-level layout:
//! - frontend: `lexer` + `parser` produce the AST (`parser::ast`)
//! - `interpreter`: tree-walking evaluator over the AST
//!
//! [`interpret`] composes the three stages over a source string and an
//! output sink, translating any stage failure into a diagnostic line.

use std::io::Write;

pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod token;

pub use interpreter::{Interpreter, RuntimeError};
pub use lexer::LexError;
pub use parser::{ParseError, ast};

/// Runs a complete source program, writing everything it prints (and,
/// on failure, a diagnostic) to `output`. Returns `false` exactly when
/// a lex, parse or runtime error occurred.
pub fn interpret<W: Write>(source: &str, output: &mut W) -> bool {
    let mut interpreter = Interpreter::new();
    let result = run_pipeline(source, &mut interpreter);
    // Output produced before a failure still reaches the sink; sink
    // write errors are swallowed like an ostream's failbit.
    let _ = output.write_all(interpreter.output().as_bytes());
    match result {
        Ok(()) => true,
        Err(error) => {
            let _ = writeln!(output, "Runtime error ({}): {error}", diagnostic_kind(&error));
            false
        }
    }
}

fn run_pipeline(source: &str, interpreter: &mut Interpreter) -> anyhow::Result<()> {
    let tokens = lexer::tokenize(source)?;
    let program = parser::parse_tokens(tokens)?;
    interpreter.run(&program)?;
    Ok(())
}

/// Errors from the language pipeline's own taxonomy are "specific";
/// anything foreign that leaks through is "generic".
fn diagnostic_kind(error: &anyhow::Error) -> &'static str {
    if error.is::<LexError>() || error.is::<ParseError>() || error.is::<RuntimeError>() {
        "specific"
    } else {
        "generic"
    }
}
