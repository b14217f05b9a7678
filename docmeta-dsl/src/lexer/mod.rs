//! Lexer module for doc-comment annotations

pub mod scanner;
pub mod token;

pub use scanner::*;
pub use token::*;

/// Locate the first annotation-introducing `@` and return the text the
/// lexer should see: everything from that `@`, trimmed of `*`, space and
/// `/` at both ends.
///
/// An `@` qualifies when it is at position 0 or preceded by whitespace or
/// `*`, so `user@example.com` never starts an annotation.
pub fn annotation_source(text: &str) -> Option<&str> {
    let start = text.match_indices('@').map(|(i, _)| i).find(|&i| {
        i == 0
            || text[..i]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_whitespace() || c == '*')
    })?;

    Some(text[start..].trim_matches(|c: char| c == '*' || c == ' ' || c == '/'))
}

/// Tokenize annotation text as prepared by [`annotation_source`].
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

// ============================================================================
// TESTS
// ============================================================================
