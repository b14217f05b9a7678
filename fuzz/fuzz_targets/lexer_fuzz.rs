//! Fuzz test for the doc-comment lexer
//!
//! Feeds arbitrary UTF-8 to the lexer and checks that it:
//! - never panics or loops forever
//! - always ends with Eof
//! - produces spans on character boundaries inside the input
//!
//! Run with: cargo +nightly fuzz run lexer_fuzz -- -max_total_time=60

#![no_main]

use docmeta_dsl::{annotation_source, Lexer, TokenKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let tokens = Lexer::new(input).tokenize();

        assert!(
            matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)),
            "Last token should always be Eof"
        );

        for token in &tokens {
            assert!(token.span.start <= token.span.end, "Span start should be <= end");
            assert!(token.span.end <= input.len(), "Span should stay inside the input");
            assert!(input.is_char_boundary(token.span.start));
            assert!(input.is_char_boundary(token.span.end));
            assert!(token.span.line >= 1, "Line numbers should be >= 1");
            assert!(token.span.column >= 1, "Column numbers should be >= 1");
        }

        if let Some(source) = annotation_source(input) {
            assert!(source.starts_with('@'), "Annotation source starts at a marker");
        }
    }
});
