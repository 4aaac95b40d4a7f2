use cursor::Cursor;
use diagnostics::Diagnostics;

pub mod token;
pub use token::{Token, TokenData, TokenType};
use TokenData::*;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum ScanErrorType {
    #[error("Unexpected character.")]
    UnexpectedCharacter,
    #[error("Unterminated string.")]
    UnterminatedString,
    #[error("Invalid number literal.")]
    InvalidNumber,
}

/// Scans `source` in one pass. The returned tokens always end with exactly one [`TokenData::Eof`],
/// even if errors were reported along the way.
pub fn scan(source: &str) -> (Vec<Token<'_>>, Diagnostics) {
    Scanner::new(source).scan_tokens()
}

pub struct Scanner<'a> {
    start: Cursor<'a>,
    current: Cursor<'a>,
    tokens: Vec<Token<'a>>,
    diagnostics: Diagnostics,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            start: source.into(),
            current: source.into(),
            tokens: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    fn add_token(&mut self, data: TokenData<'a>) {
        let token = Token::new(data, self.start.slice_until(&self.current), self.current.line());
        log::trace!("{token}");
        self.tokens.push(token);
    }

    fn error(&mut self, error: ScanErrorType) {
        self.diagnostics.error(self.current.line(), error);
    }

    pub fn scan_tokens(mut self) -> (Vec<Token<'a>>, Diagnostics) {
        loop {
            self.start = self.current.clone();
            let Some(c) = self.current.next() else {
                break;
            };

            match c {
                '(' => self.add_token(LeftParen),
                ')' => self.add_token(RightParen),
                '{' => self.add_token(LeftBrace),
                '}' => self.add_token(RightBrace),
                ',' => self.add_token(Comma),
                '.' => self.add_token(Dot),
                '-' => self.add_token(Minus),
                '+' => self.add_token(Plus),
                ';' => self.add_token(Semicolon),
                '*' => self.add_token(Star),

                '!' => {
                    let data = if self.current.next_if_eq('=') { BangEqual } else { Bang };
                    self.add_token(data)
                }
                '=' => {
                    let data = if self.current.next_if_eq('=') { EqualEqual } else { Equal };
                    self.add_token(data)
                }
                '<' => {
                    let data = if self.current.next_if_eq('=') { LessEqual } else { Less };
                    self.add_token(data)
                }
                '>' => {
                    let data = if self.current.next_if_eq('=') { GreaterEqual } else { Greater };
                    self.add_token(data)
                }

                '/' => {
                    if self.current.next_if_eq('/') {
                        // Comment, the newline itself is consumed by the next iteration
                        self.current.advance_while(|c| c != '\n');
                    } else {
                        self.add_token(Slash)
                    }
                }

                '"' => self.string(),

                d if d.is_ascii_digit() => self.number(),

                c if is_alpha(c) => self.identifier(),

                // The cursor counts lines by itself
                ' ' | '\r' | '\t' | '\n' => (),

                _ => self.error(ScanErrorType::UnexpectedCharacter),
            }
        }

        self.tokens.push(Token::eof(self.current.line()));
        (self.tokens, self.diagnostics)
    }

    fn string(&mut self) {
        self.current.advance_while(|c| c != '"');

        if !self.current.next_if_eq('"') {
            self.error(ScanErrorType::UnterminatedString);
            return;
        }

        let lexeme = self.start.slice_until(&self.current);
        self.add_token(Str(&lexeme[1..lexeme.len() - 1]));
    }

    fn number(&mut self) {
        self.current.advance_while(|c| c.is_ascii_digit());

        // A trailing '.' without digits is left for the next token
        if self.current.peek() == Some('.')
            && self.current.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.current.next();
            self.current.advance_while(|c| c.is_ascii_digit());
        }

        // Literals too large for an f64 would otherwise silently become infinity
        match self.start.slice_until(&self.current).parse::<f64>() {
            Ok(n) if n.is_finite() => self.add_token(Number(n)),
            _ => self.error(ScanErrorType::InvalidNumber),
        }
    }

    fn identifier(&mut self) {
        self.current.advance_while(|c| is_alpha(c) || c.is_ascii_digit());

        let lexeme = self.start.slice_until(&self.current);
        self.add_token(TokenData::keyword(lexeme).unwrap_or(Identifier));
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}
