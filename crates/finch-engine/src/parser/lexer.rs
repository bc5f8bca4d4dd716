//! Lexer for the Finch scripting language.
//!
//! Tokenizing is done by logos; this module adds the hand-written callbacks
//! for numbers, strings and block comments, and attaches line/column
//! information to every token.

use logos::Logos;

use super::token::{Span, Token};

/// Kind of lexical error.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LexErrorKind {
    /// A character that starts no token
    #[default]
    UnexpectedCharacter,
    /// String literal without a closing quote
    UnterminatedString,
    /// Unknown escape sequence in a string
    InvalidEscape(String),
    /// Malformed number literal
    InvalidNumber,
}

/// A lexical error with its location.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    /// What went wrong
    pub kind: LexErrorKind,
    /// Where
    pub span: Span,
    /// Offending source text
    pub text: String,
}

impl LexError {
    /// Human readable message.
    pub fn message(&self) -> String {
        match &self.kind {
            LexErrorKind::UnexpectedCharacter => format!("Invalid character '{}'.", self.text),
            LexErrorKind::UnterminatedString => "Unterminated string.".to_string(),
            LexErrorKind::InvalidEscape(esc) => format!("Invalid escape sequence '\\{}'.", esc),
            LexErrorKind::InvalidNumber => format!("Invalid number literal '{}'.", self.text),
        }
    }
}

// ============================================================================
// Callbacks
// ============================================================================

pub(crate) fn lex_block_comment(lex: &mut logos::Lexer<'_, Token>) -> logos::Skip {
    // "/*" already consumed
    let remainder = lex.remainder();
    if let Some(end) = remainder.find("*/") {
        lex.bump(end + 2);
    } else {
        lex.bump(remainder.len());
    }
    logos::Skip
}

pub(crate) fn lex_number(lex: &mut logos::Lexer<'_, Token>) -> Result<f64, LexErrorKind> {
    let rest = lex.remainder().as_bytes();

    if lex.slice() == "0" && matches!(rest.first(), Some(b'x' | b'X')) {
        let digits = rest[1..].iter().take_while(|b| b.is_ascii_hexdigit()).count();
        if digits == 0 {
            lex.bump(1);
            return Err(LexErrorKind::InvalidNumber);
        }
        lex.bump(1 + digits);
        return u64::from_str_radix(&lex.slice()[2..], 16)
            .map(|n| n as f64)
            .map_err(|_| LexErrorKind::InvalidNumber);
    }

    let mut len = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    // A '.' only belongs to the number when a digit follows; `1..2` and
    // `3.abs` stay method calls and ranges.
    if rest.get(len) == Some(&b'.') && rest.get(len + 1).is_some_and(u8::is_ascii_digit) {
        len += 1;
        len += rest[len..].iter().take_while(|b| b.is_ascii_digit()).count();
    }
    if matches!(rest.get(len), Some(b'e' | b'E')) {
        let mut exp = len + 1;
        if matches!(rest.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let digits = rest[exp..].iter().take_while(|b| b.is_ascii_digit()).count();
        if digits > 0 {
            len = exp + digits;
        }
    }
    lex.bump(len);
    lex.slice()
        .parse::<f64>()
        .map_err(|_| LexErrorKind::InvalidNumber)
}

pub(crate) fn lex_string(lex: &mut logos::Lexer<'_, Token>) -> Result<String, LexErrorKind> {
    // Opening quote already consumed
    let remainder = lex.remainder();
    let mut value = String::new();
    let mut error = None;
    let mut chars = remainder.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => {
                lex.bump(i + 1);
                return match error {
                    Some(e) => Err(e),
                    None => Ok(value),
                };
            }
            '\\' => {
                let Some((_, esc)) = chars.next() else { break };
                match esc {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '0' => value.push('\0'),
                    '"' => value.push('"'),
                    '\\' => value.push('\\'),
                    '%' => value.push('%'),
                    'a' => value.push('\u{07}'),
                    'b' => value.push('\u{08}'),
                    'f' => value.push('\u{0c}'),
                    'v' => value.push('\u{0b}'),
                    'e' => value.push('\u{1b}'),
                    'u' => {
                        let hex: String = chars.by_ref().take(4).map(|(_, h)| h).collect();
                        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                            Some(ch) if hex.len() == 4 => value.push(ch),
                            _ => {
                                error.get_or_insert(LexErrorKind::InvalidEscape(format!("u{}", hex)));
                            }
                        }
                    }
                    other => {
                        error.get_or_insert(LexErrorKind::InvalidEscape(other.to_string()));
                    }
                }
            }
            other => value.push(other),
        }
    }

    lex.bump(remainder.len());
    Err(LexErrorKind::UnterminatedString)
}

// ============================================================================
// Lexer
// ============================================================================

/// Finch lexer.
///
/// Produces the full token stream up front, terminated by [`Token::Eof`].
pub struct Lexer<'a> {
    source: &'a str,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `source`.
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Tokenize the whole source.
    pub fn tokenize(self) -> Result<Vec<(Token, Span)>, Vec<LexError>> {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();
        let mut lines = LineTracker::new(self.source);
        let mut lex = Token::lexer(self.source);

        while let Some(result) = lex.next() {
            let range = lex.span();
            let (line, column) = lines.locate(range.start);
            let span = Span::new(range.start, range.end, line, column);
            match result {
                Ok(token) => tokens.push((token, span)),
                Err(kind) => errors.push(LexError {
                    kind,
                    span,
                    text: lex.slice().to_string(),
                }),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let end = self.source.len();
        let (line, column) = lines.locate(end);
        tokens.push((Token::Eof, Span::new(end, end, line, column)));
        Ok(tokens)
    }
}

/// Incremental byte offset → line/column conversion. Offsets must be
/// queried in non-decreasing order.
struct LineTracker<'a> {
    source: &'a str,
    offset: usize,
    line: u32,
    line_start: usize,
}

impl<'a> LineTracker<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            line_start: 0,
        }
    }

    fn locate(&mut self, offset: usize) -> (u32, u32) {
        let offset = offset.min(self.source.len());
        if offset > self.offset {
            for (i, b) in self.source.as_bytes()[self.offset..offset].iter().enumerate() {
                if *b == b'\n' {
                    self.line += 1;
                    self.line_start = self.offset + i + 1;
                }
            }
            self.offset = offset;
        }
        let column = self.source[self.line_start..offset].chars().count() as u32 + 1;
        (self.line, column)
    }
}
