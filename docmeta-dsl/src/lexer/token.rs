//! Lexer token types

use std::fmt;

/// Token kinds of the annotation grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Identifier(String),
    String(String),
    Integer(i64),
    Float(f64),

    // Keywords (case-insensitive)
    True,
    False,
    Null,

    // Punctuation
    At,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Equals,
    Colon,
    NamespaceSeparator,

    Eof,
}

impl TokenKind {
    /// Tokens that may form a segment of a type name.
    pub fn is_class_identifier(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier(_) | TokenKind::True | TokenKind::False | TokenKind::Null
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(_) => write!(f, "identifier"),
            TokenKind::String(_) => write!(f, "string"),
            TokenKind::Integer(_) => write!(f, "integer"),
            TokenKind::Float(_) => write!(f, "float"),
            TokenKind::True => write!(f, "true"),
            TokenKind::False => write!(f, "false"),
            TokenKind::Null => write!(f, "null"),
            TokenKind::At => write!(f, "'@'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Equals => write!(f, "'='"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::NamespaceSeparator => write!(f, "'\\'"),
            TokenKind::Eof => write!(f, "end of string"),
        }
    }
}

/// Source location span. Offsets are bytes into the tokenized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }
}

/// A token with its kind and source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Text as it appears in diagnostics: string contents without quotes,
    /// everything else verbatim.
    pub fn text<'s>(&'s self, source: &'s str) -> &'s str {
        match &self.kind {
            TokenKind::String(value) => value,
            _ => source.get(self.span.start..self.span.end).unwrap_or(""),
        }
    }

    /// True when `next` starts exactly where this token ends.
    pub fn is_adjacent_to(&self, next: &Token) -> bool {
        self.span.end == next.span.start
    }
}
