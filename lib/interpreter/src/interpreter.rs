use diagnostics::{At, Diagnostic, Line, Locate};
use parser::{BinaryOp, Expr, UnaryOp};
use scanner::Token;

pub use parser::Value;

mod run;
pub use run::{run_source, InterpretError};

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum RuntimeErrorType {
    #[error("Operand must be a number.")]
    OperandMustBeNumber,
    #[error("Operands must be two numbers or two strings.")]
    OperandsMustBeNumbersOrStrings,
    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers,
}

/// A type error raised while evaluating, located at the operator that caused it.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{error}")]
pub struct RuntimeError {
    pub error: RuntimeErrorType,
    pub line: Line,
    pub at: At,
}

impl RuntimeError {
    fn new(error: RuntimeErrorType, token: &Token) -> Self {
        Self { error, line: token.line, at: token.at() }
    }

    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic::located(self, self)
    }
}

impl Locate for RuntimeError {
    fn line(&self) -> Line {
        self.line
    }

    fn at(&self) -> At {
        self.at.clone()
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

pub fn evaluate(expr: &Expr) -> Result<Value> {
    Interpreter::new().evaluate(expr)
}

/// Tree-walking evaluator. It holds no state, evaluating the same tree twice gives the same result.
#[derive(Debug, Default, Clone, Copy)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, expr: &Expr) -> Result<Value> {
        let value = match expr {
            Expr::Literal(value) => return Ok(value.clone()),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, token, operand } => {
                let operand = self.evaluate(operand)?;
                match (operator, operand) {
                    (UnaryOp::Negate, Value::Number(n)) => Ok((-n).into()),
                    (UnaryOp::Negate, _) => {
                        Err(RuntimeError::new(RuntimeErrorType::OperandMustBeNumber, token))
                    }
                    (UnaryOp::Not, v) => Ok((!v.is_truthy()).into()),
                }
            }

            Expr::Binary { left, operator, token, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(*operator, token, left, right)
            }
        };

        if let Ok(value) = &value {
            log::trace!("{expr} => {value}");
        }
        value
    }
}

fn binary(operator: BinaryOp, token: &Token, left: Value, right: Value) -> Result<Value> {
    use BinaryOp::*;
    use Value::{Number, Str};

    match (operator, &left, &right) {
        (Add, Number(l), Number(r)) => Ok((l + r).into()),
        (Add, Str(l), Str(r)) => Ok(format!("{l}{r}").into()),
        (Add, _, _) => {
            Err(RuntimeError::new(RuntimeErrorType::OperandsMustBeNumbersOrStrings, token))
        }

        (Subtract, Number(l), Number(r)) => Ok((l - r).into()),
        (Multiply, Number(l), Number(r)) => Ok((l * r).into()),
        // IEEE semantics, x / 0 is inf or NaN
        (Divide, Number(l), Number(r)) => Ok((l / r).into()),

        (Greater, Number(l), Number(r)) => Ok((l > r).into()),
        (GreaterEqual, Number(l), Number(r)) => Ok((l >= r).into()),
        (Less, Number(l), Number(r)) => Ok((l < r).into()),
        (LessEqual, Number(l), Number(r)) => Ok((l <= r).into()),

        (Subtract | Multiply | Divide | Greater | GreaterEqual | Less | LessEqual, _, _) => {
            Err(RuntimeError::new(RuntimeErrorType::OperandsMustBeNumbers, token))
        }

        (Equal, _, _) => Ok(left.is_equal(&right).into()),
        (NotEqual, _, _) => Ok((!left.is_equal(&right)).into()),
    }
}
