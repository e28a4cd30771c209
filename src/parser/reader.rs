use crate::error::{Error, Result};
use crate::lexer::{SExprScanner, Token, TokenKind};
use crate::runtime::Value;

/// Deepest nesting of lists, arrays and quotes the reader accepts
pub const MAX_READ_DEPTH: usize = 256;

/// Reader turning tokens into expressions
pub struct SExprReader {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
}

impl SExprReader {
    /// Creates a new reader over scanned tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        SExprReader {
            tokens,
            current: 0,
            depth: 0,
        }
    }

    /// Reads every top-level expression
    pub fn read_all(&mut self) -> Result<Vec<Value>> {
        let mut exprs = Vec::new();
        while !self.is_at_end() {
            exprs.push(self.read_expression()?);
        }
        Ok(exprs)
    }

    /// Reads one expression
    ///
    /// Fails instead of recursing past [`MAX_READ_DEPTH`] levels.
    pub fn read_expression(&mut self) -> Result<Value> {
        if self.depth >= MAX_READ_DEPTH {
            let token = self.peek();
            return Err(Error::ParseError(format!(
                "Nesting deeper than {} levels at line {}, column {}",
                MAX_READ_DEPTH, token.line, token.column
            )));
        }
        self.depth += 1;
        let result = self.read_datum();
        self.depth -= 1;
        result
    }

    fn read_datum(&mut self) -> Result<Value> {
        let token = self.advance();
        match token.kind {
            TokenKind::LeftParen => self.read_sequence(TokenKind::RightParen, |items| {
                if items.is_empty() {
                    Value::Null
                } else {
                    Value::Call(items.into())
                }
            }),
            TokenKind::LeftBracket => {
                self.read_sequence(TokenKind::RightBracket, |items| Value::Array(items.into()))
            }
            TokenKind::Quote => {
                let quoted = self.read_expression()?;
                Ok(Value::call(Value::symbol("quote"), vec![quoted]))
            }
            TokenKind::Integer(n) => Ok(Value::Int(n)),
            TokenKind::Float(f) => Ok(Value::Float(f)),
            TokenKind::String(s) => Ok(Value::String(s)),
            TokenKind::True => Ok(Value::Bool(true)),
            TokenKind::False => Ok(Value::Bool(false)),
            TokenKind::Null => Ok(Value::Null),
            TokenKind::Symbol(name) => Ok(Value::symbol(name)),
            TokenKind::Eof => Err(Error::UnexpectedEof),
            TokenKind::RightParen | TokenKind::RightBracket => Err(Error::SyntaxError {
                line: token.line,
                col: token.column,
                message: format!(
                    "Unexpected `{}`\n\nHelp: There is no opening delimiter for it.",
                    token.lexeme
                ),
            }),
        }
    }

    fn read_sequence<F>(&mut self, close: TokenKind, build: F) -> Result<Value>
    where
        F: FnOnce(Vec<Value>) -> Value,
    {
        let mut items = Vec::new();
        loop {
            if self.is_at_end() {
                return Err(Error::UnexpectedEof);
            }
            if self.peek().kind == close {
                self.advance();
                return Ok(build(items));
            }
            items.push(self.read_expression()?);
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
            return self.tokens[self.current - 1].clone();
        }
        self.peek().clone()
    }
}

/// Reads all expressions in `source`
pub fn read_all(source: &str) -> Result<Vec<Value>> {
    let mut scanner = SExprScanner::new(source);
    let tokens = scanner.scan_tokens()?;
    SExprReader::new(tokens).read_all()
}

/// Reads exactly one expression from `source`
pub fn read(source: &str) -> Result<Value> {
    let mut exprs = read_all(source)?;
    match exprs.len() {
        1 => Ok(exprs.remove(0)),
        0 => Err(Error::UnexpectedEof),
        n => Err(Error::ParseError(format!(
            "Expected one expression, found {}",
            n
        ))),
    }
}
