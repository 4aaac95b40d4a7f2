use std::fmt::Display;

use cursor::Line;
use diagnostics::{At, Locate};

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub data: TokenData<'a>,
    pub lexeme: &'a str,
    pub line: Line,
}

impl<'a> Token<'a> {
    pub fn new(data: TokenData<'a>, lexeme: &'a str, line: Line) -> Token<'a> {
        Self { data, lexeme, line }
    }

    pub fn eof(line: Line) -> Token<'a> {
        Self::new(TokenData::Eof, "", line)
    }

    pub fn ty(&self) -> TokenType {
        (&self.data).into()
    }

    pub fn lexeme(&self) -> &'a str {
        self.lexeme
    }

    pub fn line(&self) -> Line {
        self.line
    }
}

impl Locate for Token<'_> {
    fn line(&self) -> Line {
        self.line
    }

    fn at(&self) -> At {
        match self.data {
            TokenData::Eof => At::End,
            _ => At::Lexeme(self.lexeme.to_string()),
        }
    }
}

/// Token dump form: `TYPE lexeme literal`
impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ty: &str = self.data.as_ref();
        match self.data {
            TokenData::Str(s) => write!(f, "{ty} {} {s}", self.lexeme),
            TokenData::Number(n) => write!(f, "{ty} {} {n:?}", self.lexeme),
            _ => write!(f, "{ty} {} null", self.lexeme),
        }
    }
}

#[derive(Debug, Clone, PartialEq, strum::AsRefStr, strum::EnumDiscriminants)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[strum_discriminants(name(TokenType), derive(Hash))]
pub enum TokenData<'a> {
    // Single-character tokens.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens.
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals.
    Identifier,
    #[strum(serialize = "STRING")]
    Str(&'a str),
    Number(f64),

    // Keywords.
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,
    Eof,
}

impl TokenData<'_> {
    pub fn keyword(lexeme: &str) -> Option<Self> {
        use TokenData::*;
        Some(match lexeme {
            "and" => And,
            "class" => Class,
            "else" => Else,
            "false" => False,
            "fun" => Fun,
            "for" => For,
            "if" => If,
            "nil" => Nil,
            "or" => Or,
            "print" => Print,
            "return" => Return,
            "super" => Super,
            "this" => This,
            "true" => True,
            "var" => Var,
            "while" => While,
            _ => return None,
        })
    }
}
