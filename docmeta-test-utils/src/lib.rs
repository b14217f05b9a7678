//! Docmeta Test Utilities
//!
//! Shared test infrastructure for the docmeta workspace:
//! - Fixture catalogs declaring annotation types and annotated classes
//! - Proptest generators for values and annotation source text
//! - Custom assertions for docmeta error variants

// Re-export core types for convenience
pub use docmeta_core::{
    AnnotationError, AnnotationInstance, AnnotationResult, Array, ArrayKey, ClassCatalog,
    ClassDef, ImportMap, Member, ParserConfig, SemanticError, StaticCatalog, SyntaxError, Targets,
    Value, ValueMap,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Fixture catalogs.
    //!
    //! [`catalog`] declares a handful of annotation types covering both
    //! construction styles, target restrictions, `@Attributes`, `@Required`,
    //! `@var` and `@Enum`, plus one annotated controller class.

    use super::*;

    /// Constructor-style, `bar: int` and `baz: array<string>` required, CLASS only.
    pub const FOO: &str = "NS\\Foo";
    /// Property injection with `@Required`, `@var` and `@Enum` properties.
    pub const ROUTE: &str = "App\\Annotation\\Route";
    /// Allowed on methods only, no properties.
    pub const ONLY_METHOD: &str = "App\\Annotation\\OnlyMethod";
    /// Constructor-style without declared attributes; receives any values.
    pub const TAG: &str = "App\\Annotation\\Tag";
    /// A type without the `@Annotation` marker.
    pub const PLAIN: &str = "App\\Model\\Plain";
    /// Annotated class whose members carry `@Route` and `@Tag`.
    pub const CONTROLLER: &str = "App\\Controller\\UserController";

    /// Wrap lines into a `/** ... */` doc comment.
    pub fn doc(lines: &[&str]) -> String {
        let mut text = String::from("/**\n");
        for line in lines {
            text.push_str(" * ");
            text.push_str(line);
            text.push('\n');
        }
        text.push_str(" */");
        text
    }

    pub fn foo_class() -> ClassDef {
        ClassDef::new()
            .doc(doc(&[
                "@Annotation",
                "@Target(\"CLASS\")",
                "@Attributes({",
                "    @Attribute(\"bar\", type = \"int\", required = true),",
                "    @Attribute(\"baz\", type = \"array<string>\", required = true),",
                "})",
            ]))
            .constructor_arity(1)
    }

    pub fn route_class() -> ClassDef {
        ClassDef::new()
            .doc(doc(&["@Annotation", "@Target({\"METHOD\", \"CLASS\"})"]))
            .property("path", Some("/** @var string @Required */"))
            .property_with_default(
                "method",
                Some(doc(&["@var string", "@Enum({\"GET\", \"POST\", \"DELETE\"})"]).as_str()),
                Value::from("GET"),
            )
            .property("name", None)
            .property("schemes", Some("/** @var array<string> */"))
            .constant("POST", Value::from("POST"))
    }

    pub fn only_method_class() -> ClassDef {
        ClassDef::new().doc(doc(&["@Annotation", "@Target(\"METHOD\")"]))
    }

    pub fn tag_class() -> ClassDef {
        ClassDef::new()
            .doc(doc(&["@Annotation"]))
            .constructor_arity(1)
    }

    pub fn controller_class() -> ClassDef {
        ClassDef::new()
            .doc(doc(&[
                "Serves users. Questions go to team@example.com.",
                "",
                "@Route(\"/users\")",
                "@Tag(\"api\")",
                "@author Jane",
            ]))
            .import("Route", ROUTE)
            .import("Tag", TAG)
            .method(
                "show",
                Some(
                    doc(&[
                        "@Route(\"/users/{id}\", method = Route::POST, name = \"user_show\")",
                        "@param int $id",
                    ])
                    .as_str(),
                ),
            )
            .method("undocumented", None)
            .property("repository", Some(doc(&["@var object", "@Tag(scope = \"di\")"]).as_str()))
    }

    /// Every fixture type, plus the global constant `LIMIT = 50`.
    pub fn catalog() -> StaticCatalog {
        StaticCatalog::new()
            .with_class(FOO, foo_class())
            .with_class(ROUTE, route_class())
            .with_class(ONLY_METHOD, only_method_class())
            .with_class(TAG, tag_class())
            .with_class(PLAIN, ClassDef::new().doc("/** A plain model. */"))
            .with_class(CONTROLLER, controller_class())
            .with_constant("LIMIT", Value::Int(50))
    }

    /// Imports mapping each short fixture name to its type.
    pub fn imports() -> ImportMap {
        [
            ("Foo", FOO),
            ("Route", ROUTE),
            ("OnlyMethod", ONLY_METHOD),
            ("Tag", TAG),
            ("Plain", PLAIN),
        ]
        .into_iter()
        .map(|(alias, name)| (alias.to_string(), name.to_string()))
        .collect()
    }

    /// Default configuration: strict about unimported names, default tags ignored.
    pub fn strict_config() -> ParserConfig {
        ParserConfig::default()
    }

    /// Configuration that skips unresolvable names.
    pub fn lenient_config() -> ParserConfig {
        ParserConfig::default().with_ignore_unimported(true)
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for annotation values and source text.

    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    /// Render a value as annotation source text.
    ///
    /// Strings are double-quoted with inner quotes doubled; floats use the
    /// shortest representation that reads back to the same value.
    pub fn to_literal(value: &Value) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format!("{:?}", f),
            Value::String(s) => format!("\"{}\"", s.replace('"', "\"\"")),
            Value::Array(items) => {
                let entries: Vec<String> = items
                    .iter()
                    .map(|(key, item)| match key {
                        ArrayKey::Index(_) => to_literal(item),
                        ArrayKey::Name(name) => {
                            format!("{}: {}", to_literal(&Value::from(name.as_str())), to_literal(item))
                        }
                    })
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
            Value::Annotation(instance) => format!("@{}", instance.type_name()),
        }
    }

    // === Text Generators ===

    /// Identifier usable as a field name: never a keyword.
    pub fn arb_identifier() -> impl Strategy<Value = String> {
        "[a-z][a-zA-Z0-9_]{0,10}".prop_filter("keywords are not identifiers", |s| {
            !["true", "false", "null"]
                .iter()
                .any(|kw| s.eq_ignore_ascii_case(kw))
        })
    }

    /// String contents without `@`, which would be taken as free text.
    pub fn arb_string_content() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 _./\"-]{0,20}"
    }

    /// Free doc-comment prose without annotation markers.
    pub fn arb_prose() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 ,.]{0,40}"
    }

    // === Value Generators ===

    /// Scalar annotation value, including null.
    pub fn arb_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-1_000_000i64..1_000_000).prop_map(Value::Int),
            (-1000.0f64..1000.0).prop_map(Value::Float),
            arb_string_content().prop_map(Value::String),
        ]
    }

    /// Scalar or flat list of scalars.
    pub fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            3 => arb_scalar(),
            1 => prop::collection::vec(arb_scalar(), 0..4).prop_map(Value::list),
        ]
    }

    /// Distinct field assignments for one annotation.
    pub fn arb_assignments() -> impl Strategy<Value = BTreeMap<String, Value>> {
        prop::collection::btree_map(arb_identifier(), arb_value(), 1..6)
    }

    /// `@Name(k = v, ...)` source for the given assignments.
    pub fn annotation_text(name: &str, assignments: &BTreeMap<String, Value>) -> String {
        let args: Vec<String> = assignments
            .iter()
            .map(|(key, value)| format!("{} = {}", key, to_literal(value)))
            .collect();
        format!("@{}({})", name, args.join(", "))
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertion helpers for docmeta error variants.

    use super::*;

    /// Assert that an AnnotationResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &AnnotationResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert a syntax error with the given expectation.
    #[track_caller]
    pub fn assert_syntax_error<T: std::fmt::Debug>(result: &AnnotationResult<T>, expected: &str) {
        match result {
            Err(AnnotationError::Syntax(SyntaxError { expected: e, .. })) => {
                assert_eq!(e, expected, "Wrong expectation in syntax error");
            }
            other => panic!("Expected syntax error, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_unresolved<T: std::fmt::Debug>(result: &AnnotationResult<T>, name: &str) {
        match result {
            Err(AnnotationError::Semantic(SemanticError::UnresolvedName { name: n, .. })) => {
                assert_eq!(n, name, "Wrong name in unresolved-name error");
            }
            other => panic!("Expected UnresolvedName for {}, got: {:?}", name, other),
        }
    }

    #[track_caller]
    pub fn assert_disallowed_target<T: std::fmt::Debug>(
        result: &AnnotationResult<T>,
        annotation: &str,
    ) {
        match result {
            Err(AnnotationError::Semantic(SemanticError::DisallowedTarget {
                annotation: a, ..
            })) => {
                assert_eq!(a, annotation, "Wrong annotation in target error");
            }
            other => panic!("Expected DisallowedTarget for {}, got: {:?}", annotation, other),
        }
    }

    #[track_caller]
    pub fn assert_required_missing<T: std::fmt::Debug>(
        result: &AnnotationResult<T>,
        attribute: &str,
    ) {
        match result {
            Err(AnnotationError::Semantic(SemanticError::RequiredAttributeMissing {
                attribute: a,
                ..
            })) => {
                assert_eq!(a, attribute, "Wrong attribute in required error");
            }
            other => panic!("Expected RequiredAttributeMissing for {}, got: {:?}", attribute, other),
        }
    }

    #[track_caller]
    pub fn assert_type_mismatch<T: std::fmt::Debug>(result: &AnnotationResult<T>, attribute: &str) {
        match result {
            Err(AnnotationError::Semantic(SemanticError::AttributeTypeMismatch {
                attribute: a,
                ..
            })) => {
                assert_eq!(a, attribute, "Wrong attribute in type error");
            }
            other => panic!("Expected AttributeTypeMismatch for {}, got: {:?}", attribute, other),
        }
    }

    #[track_caller]
    pub fn assert_enum_violation<T: std::fmt::Debug>(result: &AnnotationResult<T>, attribute: &str) {
        match result {
            Err(AnnotationError::Semantic(SemanticError::EnumeratorViolation {
                attribute: a,
                ..
            })) => {
                assert_eq!(a, attribute, "Wrong attribute in enum error");
            }
            other => panic!("Expected EnumeratorViolation for {}, got: {:?}", attribute, other),
        }
    }

    #[track_caller]
    pub fn assert_not_annotation<T: std::fmt::Debug>(result: &AnnotationResult<T>) {
        match result {
            Err(AnnotationError::Semantic(SemanticError::NotAnAnnotation { .. })) => {}
            other => panic!("Expected NotAnAnnotation, got: {:?}", other),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fixture_catalog_declares_types() {
        let catalog = fixtures::catalog();
        for name in [fixtures::FOO, fixtures::ROUTE, fixtures::TAG, fixtures::CONTROLLER] {
            assert!(catalog.type_exists(name), "{} missing", name);
        }
        assert_eq!(catalog.constructor_arity(fixtures::FOO), 1);
        assert_eq!(
            catalog.imports_of(fixtures::CONTROLLER).get("route").map(String::as_str),
            Some(fixtures::ROUTE)
        );
        assert_eq!(catalog.constant("LIMIT"), Some(Value::Int(50)));
    }

    #[test]
    fn test_doc_wraps_lines() {
        assert_eq!(fixtures::doc(&["@A", "@B"]), "/**\n * @A\n * @B\n */");
    }

    #[test]
    fn test_to_literal() {
        use generators::to_literal;
        assert_eq!(to_literal(&Value::from("say \"hi\"")), "\"say \"\"hi\"\"\"");
        assert_eq!(to_literal(&Value::Float(2.0)), "2.0");
        assert_eq!(
            to_literal(&Value::list(vec![Value::Int(1), Value::Null])),
            "{1, null}"
        );
    }

    #[test]
    fn test_assertion_unresolved() {
        let result: AnnotationResult<()> = Err(AnnotationError::Semantic(
            SemanticError::UnresolvedName {
                name: "Bar".to_string(),
                context: "class X".to_string(),
            },
        ));
        assertions::assert_unresolved(&result, "Bar");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_identifiers_are_not_keywords(name in generators::arb_identifier()) {
            prop_assert!(!name.eq_ignore_ascii_case("null"));
            prop_assert!(name.chars().next().is_some_and(|c| c.is_ascii_lowercase()));
        }

        #[test]
        fn prop_annotation_text_lists_every_field(fields in generators::arb_assignments()) {
            let text = generators::annotation_text("Tag", &fields);
            prop_assert!(text.starts_with("@Tag("));
            for key in fields.keys() {
                let needle = format!("{} = ", key);
                prop_assert!(text.contains(&needle));
            }
        }
    }
}
