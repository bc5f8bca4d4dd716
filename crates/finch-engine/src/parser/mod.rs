//! Lexer and parser for the Finch scripting language.
//!
//! # Example
//!
//! ```ignore
//! use finch_engine::parser::parse;
//!
//! let module = parse("var x = 1 + 2").unwrap();
//! assert_eq!(module.statements.len(), 1);
//! ```

pub mod ast;
mod expr;
mod guards;
pub mod lexer;
mod stmt;
pub mod token;

use std::mem::discriminant;

pub use ast::Module;
pub use lexer::{LexError, LexErrorKind, Lexer};
pub use token::{Span, Token};

use crate::vm::error::CompileError;

/// Parse error with the line it occurred on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("[line {line}] Error at {location}: {message}")]
pub struct ParseError {
    /// What was expected
    pub message: String,
    /// 1-based line
    pub line: u32,
    /// Description of the offending token
    pub location: String,
}

/// Lex and parse a complete module.
pub fn parse(source: &str) -> Result<Module, Vec<CompileError>> {
    let tokens = Lexer::new(source).tokenize().map_err(|errors| {
        errors
            .into_iter()
            .map(|e| CompileError::new(e.span.line, e.message()))
            .collect::<Vec<_>>()
    })?;
    let mut parser = Parser::new(tokens);
    stmt::parse_module(&mut parser)
        .map_err(|e| vec![CompileError::new(e.line, format!("Error at {}: {}", e.location, e.message))])
}

// ============================================================================
// Parser
// ============================================================================

/// Recursive-descent parser over a token vector.
pub struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    pub(crate) depth: usize,
}

impl Parser {
    /// Create a parser. `tokens` must end with [`Token::Eof`].
    pub fn new(tokens: Vec<(Token, Span)>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Current token.
    pub(crate) fn current(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map(|(t, _)| t)
            .unwrap_or(&Token::Eof)
    }

    /// Span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, s)| *s)
            .unwrap_or_default()
    }

    /// Line of the current token.
    pub(crate) fn line(&self) -> u32 {
        self.current_span().line
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    /// Consume the current token and return it.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// True if the current token has the same kind as `token`.
    pub(crate) fn check(&self, token: &Token) -> bool {
        discriminant(self.current()) == discriminant(token)
    }

    /// Consume the current token if it has the kind of `token`.
    pub(crate) fn matches(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind or fail with `message`.
    pub(crate) fn expect(&mut self, token: &Token, message: &str) -> Result<Span, ParseError> {
        if self.check(token) {
            let span = self.current_span();
            self.advance();
            Ok(span)
        } else {
            Err(self.error(message))
        }
    }

    /// Consume a name or fail with `message`.
    pub(crate) fn expect_name(&mut self, message: &str) -> Result<String, ParseError> {
        match self.current().clone() {
            Token::Name(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.error(message)),
        }
    }

    /// Skip any newline tokens.
    pub(crate) fn skip_newlines(&mut self) {
        while matches!(self.current(), Token::Newline) {
            self.pos += 1;
        }
    }

    /// The first token at or after the current one that is not a newline.
    pub(crate) fn peek_past_newlines(&self) -> &Token {
        self.tokens[self.pos..]
            .iter()
            .map(|(t, _)| t)
            .find(|t| !matches!(t, Token::Newline))
            .unwrap_or(&Token::Eof)
    }

    /// A statement must be followed by a newline, a closing brace or the end
    /// of input. Newlines are consumed; the brace is left in place.
    pub(crate) fn expect_line_end(&mut self) -> Result<(), ParseError> {
        match self.current() {
            Token::Newline => {
                self.skip_newlines();
                Ok(())
            }
            Token::RightBrace | Token::Eof => Ok(()),
            _ => Err(self.error("Expect newline after statement.")),
        }
    }

    /// Error located at the current token.
    pub(crate) fn error(&self, message: &str) -> ParseError {
        ParseError {
            message: message.to_string(),
            line: self.line(),
            location: self.current().to_string(),
        }
    }

    /// Run `f` one nesting level deeper, failing past the depth limit.
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Parser) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.depth += 1;
        if self.depth > guards::MAX_PARSE_DEPTH {
            self.depth -= 1;
            return Err(self.error(&format!(
                "Maximum nesting depth ({}) exceeded.",
                guards::MAX_PARSE_DEPTH
            )));
        }
        let result = f(self);
        self.depth -= 1;
        result
    }
}
