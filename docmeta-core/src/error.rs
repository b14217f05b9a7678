//! Error types for docmeta operations

use std::fmt;
use thiserror::Error;

/// What the parser found where it expected something else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Found {
    Token { text: String, position: usize },
    EndOfInput,
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Found::Token { text, position } => write!(f, "'{}' at position {}", text, position),
            Found::EndOfInput => write!(f, "end of string"),
        }
    }
}

fn in_context(context: &str) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!(" in {}", context)
    }
}

/// Unexpected token versus grammar expectation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("[Syntax Error] Expected {expected}, got {found}{}.", in_context(.context))]
pub struct SyntaxError {
    pub expected: String,
    pub found: Found,
    pub context: String,
}

/// Name resolution, target, type and construction errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SemanticError {
    #[error("[Semantical Error] The annotation \"@{name}\" in {context} was never imported. Did you maybe forget to add a \"use\" statement for this annotation?")]
    UnresolvedName { name: String, context: String },

    #[error("[Semantical Error] The annotation \"@{name}\" in {context} does not exist, or could not be auto-loaded.")]
    UnknownType { name: String, context: String },

    #[error("[Semantical Error] The class \"{name}\" is not annotated with @Annotation. Are you sure this class can be used as annotation? If so, then you need to add @Annotation to the _class_ doc comment of \"{name}\". If it is indeed no annotation, then you need to add \"{original}\" to the ignored annotation names for {context}.")]
    NotAnAnnotation {
        name: String,
        original: String,
        context: String,
    },

    #[error("[Semantical Error] Annotation @{annotation} is not allowed to be declared on {context}. You may only use this annotation on these code elements: {allowed}.")]
    DisallowedTarget {
        annotation: String,
        context: String,
        allowed: String,
    },

    #[error("[Type Error] Attribute \"{attribute}\" of @{annotation} declared on {context} expects {expected}. This value should not be null.")]
    RequiredAttributeMissing {
        attribute: String,
        annotation: String,
        context: String,
        expected: String,
    },

    #[error("[Type Error] Attribute \"{attribute}\" of @{annotation} declared on {context} expects {expected}, but got {actual}.")]
    AttributeTypeMismatch {
        attribute: String,
        annotation: String,
        context: String,
        expected: String,
        actual: String,
    },

    #[error("[Enum Error] Attribute \"{attribute}\" of @{annotation} declared on {context} accepts only [{}], but got {given}.", .allowed.join(", "))]
    EnumeratorViolation {
        attribute: String,
        annotation: String,
        context: String,
        allowed: Vec<String>,
        given: String,
    },

    #[error("[Creation Error] The annotation @{annotation} declared on {context} does not have a property named \"{property}\". Available properties: {}", .available.join(", "))]
    UnknownProperty {
        annotation: String,
        context: String,
        property: String,
        available: Vec<String>,
    },

    #[error("[Creation Error] The annotation @{annotation} declared on {context} does not accept any values, but got {values}.")]
    NoValueAccepted {
        annotation: String,
        context: String,
        values: String,
    },

    #[error("[Semantical Error] Couldn't find constant {identifier}{}.", in_context(.context))]
    UndefinedConstant { identifier: String, context: String },

    #[error("[Creation Error] Invalid arguments for @{annotation}: {reason}")]
    InvalidArgument { annotation: String, reason: String },
}

/// Failure reported by the host's class catalog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Catalog could not construct {type_name}: {reason}")]
pub struct CatalogError {
    pub type_name: String,
    pub reason: String,
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to parse configuration: {reason}")]
    Parse { reason: String },
}

/// Master error type for all docmeta errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnnotationError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {reason}")]
    Storage { reason: String },

    #[error("Descriptor cache lock poisoned")]
    LockPoisoned,
}

/// Result type alias for docmeta operations.
pub type AnnotationResult<T> = Result<T, AnnotationError>;

// =============================================================================
// TESTS
// =============================================================================
