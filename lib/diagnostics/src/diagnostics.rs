use std::fmt::{self, Display, Formatter};

use derive_more::Deref;
use itertools::Itertools;

pub use cursor::Line;

/// Where on its line a diagnostic points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum At {
    Nowhere,
    End,
    Lexeme(String),
}

impl Display for At {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            At::Nowhere => Ok(()),
            At::End => write!(f, " at end"),
            At::Lexeme(lexeme) => write!(f, " at '{lexeme}'"),
        }
    }
}

/// Anything a diagnostic can be attached to, e.g. a token or a runtime error.
pub trait Locate {
    fn line(&self) -> Line;
    fn at(&self) -> At;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error{at}: {message}")]
pub struct Diagnostic {
    pub line: Line,
    pub at: At,
    pub message: String,
}

impl Diagnostic {
    pub fn located(located: &impl Locate, message: impl ToString) -> Self {
        Self { line: located.line(), at: located.at(), message: message.to_string() }
    }
}

/// Collects the diagnostics of one scan/parse/evaluate invocation, in the order they were reported.
#[derive(thiserror::Error, Debug, Default, Clone, PartialEq, Deref)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Display for Diagnostics {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, line: Line, at: At, message: impl ToString) {
        self.push(Diagnostic { line, at, message: message.to_string() });
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        log::debug!("{diagnostic}");
        self.0.push(diagnostic);
    }

    /// Reports an error that is only tied to a line, e.g. a bad character in the scanner.
    pub fn error(&mut self, line: Line, message: impl ToString) {
        self.report(line, At::Nowhere, message)
    }

    pub fn error_at(&mut self, located: &impl Locate, message: impl ToString) {
        self.push(Diagnostic::located(located, message))
    }

    pub fn runtime_error<E: Locate + Display>(&mut self, error: &E) {
        self.error_at(error, error)
    }

    pub fn append(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self(vec![diagnostic])
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
