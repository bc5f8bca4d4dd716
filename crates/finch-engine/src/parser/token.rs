//! Token definitions for the Finch scripting language.

use std::fmt;

use logos::Logos;

use super::lexer::{lex_block_comment, lex_number, lex_string, LexErrorKind};

/// A token in Finch source.
///
/// Newlines are significant: they terminate statements, so the lexer emits
/// them as [`Token::Newline`] and the parser decides where they may be
/// skipped.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    #[token("/*", lex_block_comment)]
    BlockComment,

    #[token("\n")]
    Newline,

    // Keywords
    #[token("break")]
    Break,
    #[token("class")]
    Class,
    #[token("construct")]
    Construct,
    #[token("continue")]
    Continue,
    #[token("else")]
    Else,
    #[token("false")]
    False,
    #[token("for")]
    For,
    #[token("foreign")]
    Foreign,
    #[token("if")]
    If,
    #[token("import")]
    Import,
    #[token("in")]
    In,
    #[token("is")]
    Is,
    #[token("null")]
    Null,
    #[token("return")]
    Return,
    #[token("static")]
    Static,
    #[token("super")]
    Super,
    #[token("this")]
    This,
    #[token("true")]
    True,
    #[token("var")]
    Var,
    #[token("while")]
    While,

    // Literals and names
    #[regex(r"[A-Za-z][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Name(String),

    /// `_field` or `__staticField`; the parser tells them apart by prefix
    #[regex(r"_[A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Field(String),

    #[regex(r"[0-9]", lex_number)]
    Number(f64),

    #[token("\"", lex_string)]
    Str(String),

    // Punctuation
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,
    #[token("...")]
    DotDotDot,
    #[token(",")]
    Comma,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    BangEqual,
    #[token("=")]
    Equal,
    #[token("!")]
    Bang,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("?")]
    Question,

    /// End of input, appended by the lexer
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::BlockComment => "comment",
            Token::Newline => "newline",
            Token::Break => "'break'",
            Token::Class => "'class'",
            Token::Construct => "'construct'",
            Token::Continue => "'continue'",
            Token::Else => "'else'",
            Token::False => "'false'",
            Token::For => "'for'",
            Token::Foreign => "'foreign'",
            Token::If => "'if'",
            Token::Import => "'import'",
            Token::In => "'in'",
            Token::Is => "'is'",
            Token::Null => "'null'",
            Token::Return => "'return'",
            Token::Static => "'static'",
            Token::Super => "'super'",
            Token::This => "'this'",
            Token::True => "'true'",
            Token::Var => "'var'",
            Token::While => "'while'",
            Token::Name(name) => return write!(f, "name '{}'", name),
            Token::Field(name) => return write!(f, "field '{}'", name),
            Token::Number(n) => return write!(f, "number {}", n),
            Token::Str(_) => "string",
            Token::LeftParen => "'('",
            Token::RightParen => "')'",
            Token::LeftBracket => "'['",
            Token::RightBracket => "']'",
            Token::LeftBrace => "'{'",
            Token::RightBrace => "'}'",
            Token::Colon => "':'",
            Token::Dot => "'.'",
            Token::DotDot => "'..'",
            Token::DotDotDot => "'...'",
            Token::Comma => "','",
            Token::Plus => "'+'",
            Token::Minus => "'-'",
            Token::Star => "'*'",
            Token::Slash => "'/'",
            Token::Percent => "'%'",
            Token::Less => "'<'",
            Token::Greater => "'>'",
            Token::LessEqual => "'<='",
            Token::GreaterEqual => "'>='",
            Token::EqualEqual => "'=='",
            Token::BangEqual => "'!='",
            Token::Equal => "'='",
            Token::Bang => "'!'",
            Token::AmpAmp => "'&&'",
            Token::PipePipe => "'||'",
            Token::Question => "'?'",
            Token::Eof => "end of file",
        };
        f.write_str(text)
    }
}

/// Source location of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    /// 1-based line
    pub line: u32,
    /// 1-based column
    pub column: u32,
}

impl Span {
    /// Create a span.
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}
