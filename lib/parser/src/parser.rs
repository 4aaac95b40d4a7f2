mod expr;
mod value;

pub use expr::{BinaryOp, Expr, UnaryOp};
pub use value::Value;

use diagnostics::{At, Diagnostics, Line, Locate};
use scanner::{Token, TokenData, TokenType};

use TokenType::*;

/// Parses a single expression that has to span all of `tokens`.
pub fn parse(tokens: Vec<Token<'_>>) -> (Option<Expr<'_>>, Diagnostics) {
    Parser::new(tokens).parse()
}

/// Parses `;`-separated expressions, recovering after each syntax error.
pub fn parse_sequence(tokens: Vec<Token<'_>>) -> (Vec<Expr<'_>>, Diagnostics) {
    Parser::new(tokens).parse_sequence()
}

#[derive(thiserror::Error, Debug)]
#[error("{error}")]
pub struct ParseError<'a> {
    error: ParseErrorType,
    token: Token<'a>,
}

impl<'a> ParseError<'a> {
    fn new(error: ParseErrorType, token: Token<'a>) -> Self {
        Self { error, token }
    }
}

impl Locate for ParseError<'_> {
    fn line(&self) -> Line {
        self.token.line
    }

    fn at(&self) -> At {
        self.token.at()
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum ParseErrorType {
    #[error("Expect expression.")]
    ExpectedExpression,
    #[error("Expect ')' after expression.")]
    ExpectedRightParen,
    #[error("Expect end of expression.")]
    ExpectedEnd,
    #[error("Expect ';' after expression.")]
    ExpectedSemicolon,
    #[error("Expression is nested too deeply.")]
    TooMuchNesting,
}

/// Bounds the height of a parsed tree, and with it the recursion depth of the parser and of
/// everything that walks the tree afterwards.
pub const MAX_DEPTH: usize = 128;

type Result<'a, T> = std::result::Result<T, ParseError<'a>>;

#[derive(Debug)]
pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    current: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(mut tokens: Vec<Token<'a>>) -> Self {
        // Lookups at the current position rely on the trailing Eof
        if tokens.last().map(Token::ty) != Some(Eof) {
            let line = tokens.last().map_or(Line(1), |t| t.line);
            tokens.push(Token::eof(line));
        }
        Self { tokens, current: 0, depth: 0 }
    }

    pub fn parse(mut self) -> (Option<Expr<'a>>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();

        match self.single_expression() {
            Ok(expr) => {
                log::trace!("parsed {expr}");
                (Some(expr), diagnostics)
            }
            Err(e) => {
                diagnostics.error_at(&e, &e);
                (None, diagnostics)
            }
        }
    }

    pub fn parse_sequence(mut self) -> (Vec<Expr<'a>>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let mut exprs = Vec::new();

        while !self.is_at_end() {
            self.depth = 0;
            match self.sequence_item() {
                Ok(expr) => {
                    log::trace!("parsed {expr}");
                    exprs.push(expr)
                }
                Err(e) => {
                    diagnostics.error_at(&e, &e);
                    self.synchronize();
                }
            }
        }

        (exprs, diagnostics)
    }

    fn sequence_item(&mut self) -> Result<'a, Expr<'a>> {
        // The last item doesn't need a terminating ';'
        let expr = self.expression()?;
        if !self.is_at_end() {
            self.consume_or_error(Semicolon, ParseErrorType::ExpectedSemicolon)?;
        }
        Ok(expr)
    }

    fn single_expression(&mut self) -> Result<'a, Expr<'a>> {
        let expr = self.expression()?;
        self.consume_or_error(Eof, ParseErrorType::ExpectedEnd)?;
        Ok(expr)
    }

    fn expression(&mut self) -> Result<'a, Expr<'a>> {
        self.equality()
    }

    fn equality(&mut self) -> Result<'a, Expr<'a>> {
        let depth = self.depth;
        let mut expr = self.comparison()?;

        loop {
            let operator = match self.peek().ty() {
                BangEqual => BinaryOp::NotEqual,
                EqualEqual => BinaryOp::Equal,
                _ => break,
            };
            // Every operator in a chain adds a level to the left spine
            self.enter()?;
            let token = self.advance();
            let right = self.comparison()?;
            expr = Expr::binary(expr, operator, token, right);
        }
        self.depth = depth;
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<'a, Expr<'a>> {
        let depth = self.depth;
        let mut expr = self.term()?;

        loop {
            let operator = match self.peek().ty() {
                Greater => BinaryOp::Greater,
                GreaterEqual => BinaryOp::GreaterEqual,
                Less => BinaryOp::Less,
                LessEqual => BinaryOp::LessEqual,
                _ => break,
            };
            self.enter()?;
            let token = self.advance();
            let right = self.term()?;
            expr = Expr::binary(expr, operator, token, right);
        }
        self.depth = depth;
        Ok(expr)
    }

    fn term(&mut self) -> Result<'a, Expr<'a>> {
        let depth = self.depth;
        let mut expr = self.factor()?;

        loop {
            let operator = match self.peek().ty() {
                Plus => BinaryOp::Add,
                Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.enter()?;
            let token = self.advance();
            let right = self.factor()?;
            expr = Expr::binary(expr, operator, token, right);
        }
        self.depth = depth;
        Ok(expr)
    }

    fn factor(&mut self) -> Result<'a, Expr<'a>> {
        let depth = self.depth;
        let mut expr = self.unary()?;

        loop {
            let operator = match self.peek().ty() {
                Star => BinaryOp::Multiply,
                Slash => BinaryOp::Divide,
                _ => break,
            };
            self.enter()?;
            let token = self.advance();
            let right = self.unary()?;
            expr = Expr::binary(expr, operator, token, right);
        }
        self.depth = depth;
        Ok(expr)
    }

    fn unary(&mut self) -> Result<'a, Expr<'a>> {
        let operator = match self.peek().ty() {
            Bang => UnaryOp::Not,
            Minus => UnaryOp::Negate,
            _ => return self.primary(),
        };
        self.enter()?;
        let token = self.advance();
        let operand = self.unary()?;
        self.depth -= 1;
        Ok(Expr::unary(operator, token, operand))
    }

    fn primary(&mut self) -> Result<'a, Expr<'a>> {
        let value = match self.peek().data.clone() {
            TokenData::False => Value::Bool(false),
            TokenData::True => Value::Bool(true),
            TokenData::Nil => Value::Nil,
            TokenData::Number(n) => Value::Number(n),
            TokenData::Str(s) => Value::Str(s.to_string()),
            TokenData::LeftParen => {
                self.enter()?;
                self.advance();
                let expr = self.expression()?;
                self.consume_or_error(RightParen, ParseErrorType::ExpectedRightParen)?;
                self.depth -= 1;
                return Ok(Expr::grouping(expr));
            }
            // The offending token is left in place for synchronize()
            _ => return Err(ParseError::new(ParseErrorType::ExpectedExpression, self.peek().clone())),
        };
        self.advance();
        Ok(Expr::Literal(value))
    }

    /// Discards tokens until the start of the next statement: just after a `;`, or in front of a
    /// keyword that begins a statement.
    fn synchronize(&mut self) {
        loop {
            if self.advance().ty() == Semicolon || self.is_at_end() {
                return;
            }
            if let Class | Fun | Var | For | If | While | Print | Return = self.peek().ty() {
                return;
            }
        }
    }
}

// Helpers
impl<'a> Parser<'a> {
    /// Goes one level deeper, failing at the current token once [`MAX_DEPTH`] is reached.
    fn enter(&mut self) -> Result<'a, ()> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::new(ParseErrorType::TooMuchNesting, self.peek().clone()));
        }
        self.depth += 1;
        Ok(())
    }

    fn consume(&mut self, ty: TokenType) -> std::result::Result<Token<'a>, Token<'a>> {
        if self.peek().ty() == ty {
            Ok(self.advance())
        } else {
            Err(self.peek().clone())
        }
    }

    fn consume_or_error(&mut self, ty: TokenType, error_type: ParseErrorType) -> Result<'a, Token<'a>> {
        self.consume(ty).map_err(|token| ParseError::new(error_type, token))
    }

    fn peek(&self) -> &Token<'a> {
        &self.tokens[self.current]
    }

    /// Never moves past the trailing Eof.
    fn advance(&mut self) -> Token<'a> {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        self.peek().ty() == Eof
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use pretty_assertions::assert_eq;
    use scanner::scan;

    use super::*;

    fn print(source: &str) -> String {
        let (tokens, scan_errors) = scan(source);
        assert!(scan_errors.is_empty(), "{scan_errors}");
        let (expr, diagnostics) = parse(tokens);
        assert!(diagnostics.is_empty(), "{diagnostics}");
        expr.unwrap().to_string()
    }

    fn errors(source: &str) -> String {
        let (tokens, _) = scan(source);
        let (expr, diagnostics) = parse(tokens);
        assert!(expr.is_none());
        diagnostics.to_string()
    }

    #[test]
    fn precedence() {
        assert_eq!(print("1 + 2 * 3"), "(+ 1.0 (* 2.0 3.0))");
        assert_eq!(print("1 * 2 + 3"), "(+ (* 1.0 2.0) 3.0)");
        assert_eq!(print("1 < 2 == 3 >= 4"), "(== (< 1.0 2.0) (>= 3.0 4.0))");
        assert_eq!(print("-1 + 2 / -3"), "(+ (- 1.0) (/ 2.0 (- 3.0)))");
        assert_eq!(print("1 + 2 != 3 - 4 > 5"), "(!= (+ 1.0 2.0) (> (- 3.0 4.0) 5.0))");
    }

    #[test]
    fn associativity() {
        assert_eq!(print("8 - 3 - 2"), "(- (- 8.0 3.0) 2.0)");
        assert_eq!(print("8 / 4 / 2"), "(/ (/ 8.0 4.0) 2.0)");
        assert_eq!(print("1 == 2 == 3"), "(== (== 1.0 2.0) 3.0)");
        assert_eq!(print("!!true"), "(! (! true))");
        assert_eq!(print("--1"), "(- (- 1.0))");
    }

    #[test]
    fn grouping_and_literals() {
        assert_eq!(print("(1 + 2) * 3"), "(* (group (+ 1.0 2.0)) 3.0)");
        assert_eq!(print("((nil))"), "(group (group nil))");
        assert_eq!(print("\"a\" + \"b\""), "(+ \"a\" \"b\")");
        assert_eq!(print("true != false"), "(!= true false)");
        assert_eq!(print("2.5"), "2.5");
    }

    #[test]
    fn operator_tokens_are_kept() {
        let (tokens, _) = scan("1 +\n2");
        let (expr, _) = parse(tokens);
        match expr {
            Some(Expr::Binary { operator, token, .. }) => {
                assert_eq!(operator, BinaryOp::Add);
                assert_eq!((token.lexeme, token.line), ("+", Line(1)));
            }
            other => panic!("Expected binary expression, got {other:?}"),
        }
    }

    #[test]
    fn missing_right_paren() {
        assert_eq!(errors("(1 + 2"), "[line 1] Error at end: Expect ')' after expression.");
        assert_eq!(errors("(1 2)"), "[line 1] Error at '2': Expect ')' after expression.");
    }

    #[test]
    fn expected_expression() {
        assert_eq!(errors(")"), "[line 1] Error at ')': Expect expression.");
        assert_eq!(errors("1 +\n"), "[line 2] Error at end: Expect expression.");
        assert_eq!(errors(""), "[line 1] Error at end: Expect expression.");
        assert_eq!(errors("foo"), "[line 1] Error at 'foo': Expect expression.");
    }

    #[test]
    fn trailing_tokens() {
        assert_eq!(errors("1 2"), "[line 1] Error at '2': Expect end of expression.");
        assert_eq!(errors("1;"), "[line 1] Error at ';': Expect end of expression.");
    }

    #[test]
    fn tokens_without_eof() {
        let (expr, diagnostics) = parse(vec![Token::new(TokenData::Number(1.0), "1", Line(3))]);
        assert!(diagnostics.is_empty());
        assert_eq!(expr.unwrap().to_string(), "1.0");

        let (expr, diagnostics) = parse(Vec::new());
        assert!(expr.is_none());
        assert_eq!(diagnostics.to_string(), "[line 1] Error at end: Expect expression.");
    }

    #[test]
    fn deep_nesting_is_reported() {
        let source = format!("{}1{}", "(".repeat(300), ")".repeat(300));
        assert_eq!(errors(&source), "[line 1] Error at '(': Expression is nested too deeply.");

        let source = format!("{}1", "-".repeat(3000));
        assert_eq!(errors(&source), "[line 1] Error at '-': Expression is nested too deeply.");

        let source = vec!["1"; MAX_DEPTH + 2].join(" + ");
        assert_eq!(errors(&source), "[line 1] Error at '+': Expression is nested too deeply.");
    }

    #[test]
    fn nesting_up_to_the_limit() {
        let parens = MAX_DEPTH / 2;
        let negations = MAX_DEPTH - parens;
        let source = format!("{}{}1{}", "(".repeat(parens), "-".repeat(negations), ")".repeat(parens));
        assert_eq!(print(&source).matches("(group").count(), parens);
        assert_eq!(print(&source).matches("(-").count(), negations);

        let source = vec!["1"; MAX_DEPTH + 1].join(" * ");
        assert_eq!(print(&format!("{source} == 1")).matches('*').count(), MAX_DEPTH);
    }

    #[test]
    fn nesting_budget_resets_between_items() {
        let item = format!("{}1{}", "(".repeat(MAX_DEPTH - 1), ")".repeat(MAX_DEPTH - 1));
        let source = format!("{}1; {item}; {item}", "(".repeat(MAX_DEPTH + 1));
        let (tokens, _) = scan(&source);
        let (exprs, diagnostics) = parse_sequence(tokens);
        assert_eq!(exprs.len(), 2);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn sequence() {
        let (tokens, _) = scan("1 + 2; !nil;\n\"last\"");
        let (exprs, diagnostics) = parse_sequence(tokens);
        assert!(diagnostics.is_empty());
        assert_eq!(
            exprs.iter().map(|e| e.to_string()).collect_vec(),
            vec!["(+ 1.0 2.0)", "(! nil)", "\"last\""]
        );
    }

    #[test]
    fn synchronize_after_errors() {
        let (tokens, _) = scan("1 + ; 2;\n(3; 4");
        let (exprs, diagnostics) = parse_sequence(tokens);
        assert_eq!(exprs.iter().map(|e| e.to_string()).collect_vec(), vec!["2.0", "4.0"]);
        assert_eq!(
            diagnostics.to_string(),
            "[line 1] Error at ';': Expect expression.\n\
             [line 2] Error at ';': Expect ')' after expression."
        );
    }

    #[test]
    fn synchronize_stops_at_statement_keywords() {
        let (tokens, _) = scan("(1 2 print; 5");
        let (exprs, diagnostics) = parse_sequence(tokens);
        assert_eq!(exprs.iter().map(|e| e.to_string()).collect_vec(), vec!["5.0"]);
        assert_eq!(
            diagnostics.to_string(),
            "[line 1] Error at '2': Expect ')' after expression.\n\
             [line 1] Error at 'print': Expect expression."
        );
    }

    #[test]
    fn missing_semicolon_in_sequence() {
        let (tokens, _) = scan("1 2; 3");
        let (exprs, diagnostics) = parse_sequence(tokens);
        assert_eq!(exprs.iter().map(|e| e.to_string()).collect_vec(), vec!["3.0"]);
        assert_eq!(diagnostics.to_string(), "[line 1] Error at '2': Expect ';' after expression.");
    }
}
