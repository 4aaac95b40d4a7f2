use std::fmt::{self, Display, Formatter};

use scanner::Token;

use crate::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

/// An expression tree. Every node owns its children, and operator nodes keep the token they were
/// parsed from so that runtime errors can point back into the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    Literal(Value),
    Unary { operator: UnaryOp, token: Token<'a>, operand: Box<Expr<'a>> },
    Binary { left: Box<Expr<'a>>, operator: BinaryOp, token: Token<'a>, right: Box<Expr<'a>> },
    Grouping(Box<Expr<'a>>),
}

impl<'a> Expr<'a> {
    pub fn unary(operator: UnaryOp, token: Token<'a>, operand: Expr<'a>) -> Self {
        Expr::Unary { operator, token, operand: Box::new(operand) }
    }

    pub fn binary(left: Expr<'a>, operator: BinaryOp, token: Token<'a>, right: Expr<'a>) -> Self {
        Expr::Binary { left: Box::new(left), operator, token, right: Box::new(right) }
    }

    pub fn grouping(inner: Expr<'a>) -> Self {
        Expr::Grouping(Box::new(inner))
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
        })
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
        })
    }
}

/// Prints the tree in prefix form, e.g. `(* (group (+ 1.0 2.0)) 3.0)`.
impl Display for Expr<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(Value::Str(s)) => write!(f, "\"{}\"", s),
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::Unary { operator, operand, .. } => write!(f, "({} {})", operator, operand),
            Expr::Binary { left, operator, right, .. } => {
                write!(f, "({} {} {})", operator, left, right)
            }
            Expr::Grouping(inner) => write!(f, "(group {})", inner),
        }
    }
}
