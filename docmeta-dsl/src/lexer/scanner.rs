//! Lexer implementation

use super::token::*;
use std::iter::Peekable;
use std::str::CharIndices;

/// Lexer for annotation text.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
            pos: 0,
        }
    }

    /// Tokenize the entire source. The last token is always `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        tokens
    }

    /// Get the next token, skipping characters that start no token.
    fn next_token(&mut self) -> Token {
        loop {
            self.skip_separators();

            let start_pos = self.pos;
            let start_line = self.line;
            let start_col = self.column;

            let kind = match self.peek_char() {
                None => Some(TokenKind::Eof),
                Some(c) => self.scan(c),
            };

            if let Some(kind) = kind {
                return Token {
                    kind,
                    span: Span {
                        start: start_pos,
                        end: self.pos,
                        line: start_line,
                        column: start_col,
                    },
                };
            }
        }
    }

    /// Scan one token starting at `c`. `None` means the character was skipped.
    fn scan(&mut self, c: char) -> Option<TokenKind> {
        let single = match c {
            '@' => Some(TokenKind::At),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            ',' => Some(TokenKind::Comma),
            '=' => Some(TokenKind::Equals),
            ':' => Some(TokenKind::Colon),
            _ => None,
        };
        if let Some(kind) = single {
            self.advance();
            return Some(kind);
        }

        match c {
            '"' => match self.scan_string() {
                Some(kind) => Some(kind),
                None => {
                    // Unterminated string: drop the quote and keep going
                    self.advance();
                    None
                }
            },
            c if c.is_ascii_digit() => Some(self.scan_number()),
            '+' | '-' if self.peek_next_char().is_some_and(|n| n.is_ascii_digit()) => {
                Some(self.scan_number())
            }
            c if c.is_alphabetic() || c == '_' || c == '\\' => Some(self.scan_identifier()),
            _ => {
                self.advance();
                None
            }
        }
    }

    /// Scan an identifier, keyword or lone namespace separator.
    ///
    /// Identifiers may contain `:` and `\` but never end with either, so
    /// `Foo::BAR` is one token while `Foo::` is `Foo` followed by two colons.
    fn scan_identifier(&mut self) -> TokenKind {
        let source = self.source;
        let start = self.pos;
        let rest = &source[start..];

        let mut end = start;
        for (i, c) in rest.char_indices() {
            let allowed = if i == 0 {
                c.is_alphabetic() || c == '_' || c == '\\'
            } else {
                c.is_alphanumeric() || c == '_' || c == ':' || c == '\\'
            };
            if !allowed {
                break;
            }
            end = start + i + c.len_utf8();
        }

        let ident = source[start..end].trim_end_matches(|c: char| c == ':' || c == '\\');
        if ident.is_empty() {
            self.advance();
            return TokenKind::NamespaceSeparator;
        }
        self.advance_to(start + ident.len());

        if ident.eq_ignore_ascii_case("true") {
            TokenKind::True
        } else if ident.eq_ignore_ascii_case("false") {
            TokenKind::False
        } else if ident.eq_ignore_ascii_case("null") {
            TokenKind::Null
        } else {
            TokenKind::Identifier(ident.to_string())
        }
    }

    /// Scan a double-quoted string. A doubled quote `""` is an escaped quote.
    /// Returns `None` without consuming anything when the string is unterminated.
    fn scan_string(&mut self) -> Option<TokenKind> {
        let source = self.source;
        let bytes = source.as_bytes();
        let mut value = String::new();
        let mut i = self.pos + 1;

        loop {
            let quote = i + source[i..].find('"')?;
            value.push_str(&source[i..quote]);

            if bytes.get(quote + 1) == Some(&b'"') {
                value.push('"');
                i = quote + 2;
            } else {
                self.advance_to(quote + 1);
                return Some(TokenKind::String(value));
            }
        }
    }

    /// Scan `[+-]?digits(.digits)?([eE][+-]?digits)?`.
    ///
    /// A fraction or exponent makes a float; integers that do not fit
    /// in an `i64` become floats as well.
    fn scan_number(&mut self) -> TokenKind {
        let source = self.source;
        let bytes = source.as_bytes();
        let start = self.pos;
        let mut end = start;

        if matches!(bytes.get(end), Some(b'+') | Some(b'-')) {
            end += 1;
        }
        end = skip_digits(bytes, end);

        let mut is_float = false;
        if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
            end = skip_digits(bytes, end + 1);
            is_float = true;
        }

        if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
            let mut exp = end + 1;
            if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
                exp += 1;
            }
            if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
                end = skip_digits(bytes, exp);
                is_float = true;
            }
        }

        self.advance_to(end);
        let text = &source[start..end];

        if !is_float {
            if let Ok(n) = text.parse::<i64>() {
                return TokenKind::Integer(n);
            }
        }
        TokenKind::Float(text.parse::<f64>().unwrap_or(f64::INFINITY))
    }

    /// Skip whitespace and runs of `*`.
    fn skip_separators(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() || c == '*' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next_char(&self) -> Option<char> {
        let mut iter = self.source[self.pos..].chars();
        iter.next();
        iter.next()
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((i, c)) = self.chars.next() {
            self.pos = i + c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            Some(c)
        } else {
            None
        }
    }

    fn advance_to(&mut self, end: usize) {
        while self.pos < end {
            if self.advance().is_none() {
                break;
            }
        }
    }
}

fn skip_digits(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    i
}
