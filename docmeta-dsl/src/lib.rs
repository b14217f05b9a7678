//! Docmeta DSL - Doc-Comment Annotation Parser
//!
//! Reads `@Name(args)` annotations out of doc comments, validates them
//! against the declaring type's own metadata, and builds instances through
//! the host's [`ClassCatalog`](docmeta_core::ClassCatalog).
//!
//! Architecture:
//! ```text
//! Doc comment (raw text)
//!     ↓
//! Lexer (tokens with byte offsets)
//!     ↓
//! Parser (recursive descent) ──→ Name Resolver (imports, namespaces)
//!     ↓                      ──→ Metadata Resolver (descriptor cache)
//! Validator / Instantiator
//!     ↓
//! Vec<AnnotationInstance>
//! ```
//!
//! [`DocReader`] wires these together per class, property or method.

pub mod lexer;
pub mod metadata;
pub mod parser;
pub mod reader;
pub mod resolver;
pub mod validate;

// Re-export key types for convenience
pub use lexer::{annotation_source, tokenize, Lexer, Span, Token, TokenKind};
pub use metadata::{
    AnnotationDescriptor, AttributeType, Construction, DescriptorCache, EnumConstraint,
    ValueType, ATTRIBUTE, ATTRIBUTES, ENUM, TARGET,
};
pub use parser::DocParser;
pub use reader::DocReader;
pub use resolver::NameResolver;
