use std::io::Write;

use diagnostics::Diagnostics;

use crate::{Interpreter, RuntimeError};

#[derive(thiserror::Error, Debug)]
pub enum InterpretError {
    #[error("{0}")]
    CompileError(Diagnostics),
    #[error("{}", .0.diagnostic())]
    RuntimeError(#[from] RuntimeError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Scans and parses all of `source`, then evaluates each expression in turn and writes its value
/// to `output`, one per line.
///
/// Nothing is evaluated if there were syntax errors. A runtime error stops at the failing
/// expression, the values before it have already been written.
pub fn run_source(source: &str, output: &mut impl Write) -> Result<(), InterpretError> {
    let (tokens, mut diagnostics) = scanner::scan(source);
    let (exprs, parse_diagnostics) = parser::parse_sequence(tokens);
    diagnostics.append(parse_diagnostics);

    if !diagnostics.is_empty() {
        return Err(InterpretError::CompileError(diagnostics));
    }

    let interpreter = Interpreter::new();
    for expr in &exprs {
        let value = interpreter.evaluate(expr)?;
        writeln!(output, "{value}")?;
    }

    Ok(())
}
