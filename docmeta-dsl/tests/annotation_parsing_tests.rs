//! Integration tests for doc-comment annotation parsing
//!
//! Tests verify:
//! - Constructor-style and property-injection instantiation
//! - Required, typed and enumerated attributes
//! - Target checks for top-level and nested annotations
//! - Name resolution failures and ignored names
//! - Descriptor memoization

use docmeta_core::{
    AnnotationError, AnnotationInstance, ClassCatalog, ImportMap, ParserConfig, SemanticError,
    Targets, Value, ValueMap,
};
use docmeta_dsl::{DescriptorCache, DocParser, ATTRIBUTE, ATTRIBUTES};
use docmeta_test_utils::assertions::*;
use docmeta_test_utils::fixtures::{self, FOO, ONLY_METHOD, ROUTE, TAG};
use docmeta_test_utils::{ClassDef, StaticCatalog};
use std::sync::Arc;

// ============================================================================
// TEST HARNESS
// ============================================================================

/// Owns the catalog and cache a parser borrows.
struct Harness {
    catalog: StaticCatalog,
    cache: DescriptorCache,
    config: ParserConfig,
    imports: ImportMap,
}

impl Harness {
    fn new() -> Self {
        Self {
            catalog: fixtures::catalog(),
            cache: DescriptorCache::new(),
            config: fixtures::strict_config(),
            imports: fixtures::imports(),
        }
    }

    fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    fn with_imports(mut self, imports: ImportMap) -> Self {
        self.imports = imports;
        self
    }

    fn with_class(mut self, alias: &str, name: &str, class: ClassDef) -> Self {
        self.catalog = self.catalog.with_class(name, class);
        self.imports.insert(alias.to_string(), name.to_string());
        self
    }

    fn parse(&self, target: Targets, text: &str) -> Result<Vec<AnnotationInstance>, AnnotationError> {
        let mut parser = DocParser::from_config(&self.catalog, &self.cache, &self.config);
        parser.set_imports(self.imports.clone());
        parser.set_target(target);
        parser.parse(text, "class App\\User")
    }
}

fn only(mut annotations: Vec<AnnotationInstance>) -> AnnotationInstance {
    assert_eq!(annotations.len(), 1, "expected exactly one annotation");
    annotations.remove(0)
}

// ============================================================================
// CONSTRUCTOR STYLE
// ============================================================================

#[test]
fn test_constructor_receives_full_value_map() {
    let harness = Harness::new();
    let foo = only(
        harness
            .parse(Targets::CLASS, "/** @Foo(bar=1, baz={\"a\",\"b\"}) */")
            .expect("parse"),
    );

    let args: ValueMap = [
        ("bar".to_string(), Value::Int(1)),
        ("baz".to_string(), Value::list([Value::from("a"), Value::from("b")])),
    ]
    .into_iter()
    .collect();
    let expected = harness.catalog.construct(FOO, Some(args)).expect("construct");
    assert_eq!(foo, expected);
}

#[test]
fn test_missing_required_attribute() {
    let harness = Harness::new();
    let result = harness.parse(Targets::CLASS, "@Foo(baz={\"a\"})");
    assert_required_missing(&result, "bar");
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Attribute \"bar\" of @Foo declared on class App\\User expects a(n) int"));
}

#[test]
fn test_scalar_coerced_into_array_attribute() {
    let harness = Harness::new();
    let foo = only(harness.parse(Targets::CLASS, "@Foo(bar=2, baz=\"only\")").expect("parse"));
    assert_eq!(foo.get("baz"), Some(&Value::list([Value::from("only")])));
}

#[test]
fn test_attribute_type_mismatch() {
    let harness = Harness::new();
    let result = harness.parse(Targets::CLASS, "@Foo(bar=\"1\", baz={})");
    assert_type_mismatch(&result, "bar");
    assert!(result.unwrap_err().to_string().ends_with("expects a(n) int, but got string."));

    let result = harness.parse(Targets::CLASS, "@Foo(bar=1, baz={\"a\", 2})");
    assert_type_mismatch(&result, "baz");
}

// ============================================================================
// PROPERTY INJECTION
// ============================================================================

#[test]
fn test_property_injection_with_default_property() {
    let harness = Harness::new();
    let route = only(
        harness
            .parse(Targets::METHOD, "@Route(\"/users\", name=\"users\", schemes=\"https\")")
            .expect("parse"),
    );
    assert!(route.is(ROUTE));
    assert_eq!(route.get("path"), Some(&Value::from("/users")));
    assert_eq!(route.get("name"), Some(&Value::from("users")));
    assert_eq!(route.get("method"), Some(&Value::from("GET")));
    assert_eq!(route.get("schemes"), Some(&Value::list([Value::from("https")])));
}

#[test]
fn test_enum_constraint() {
    let harness = Harness::new();
    let route = only(
        harness
            .parse(Targets::METHOD, "@Route(\"/\", method=Route::POST)")
            .expect("parse"),
    );
    assert_eq!(route.get("method"), Some(&Value::from("POST")));

    let result = harness.parse(Targets::METHOD, "@Route(\"/\", method=\"PATCH\")");
    assert_enum_violation(&result, "method");
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("accepts only [GET, POST, DELETE], but got PATCH"));
}

#[test]
fn test_named_default_property_wins_over_positional_value() {
    let harness = Harness::new();
    let route = only(
        harness
            .parse(Targets::METHOD, "@Route(\"/a\", path=\"/b\")")
            .expect("parse"),
    );
    assert_eq!(route.get("path"), Some(&Value::from("/b")));

    let route = only(harness.parse(Targets::METHOD, "@Route(1, path=\"/b\")").expect("parse"));
    assert_eq!(route.get("path"), Some(&Value::from("/b")));

    let result = harness.parse(Targets::METHOD, "@Route(\"/a\", path=2)");
    assert_type_mismatch(&result, "path");
}

#[test]
fn test_positional_value_on_enum_default_property() {
    let harness = Harness::new().with_class(
        "Verb",
        "App\\Annotation\\Verb",
        ClassDef::new()
            .doc(fixtures::doc(&["@Annotation"]))
            .property("method", Some("/** @Enum({\"GET\", \"POST\"}) */"))
            .property("path", None),
    );

    let verb = only(
        harness
            .parse(Targets::METHOD, "@Verb(\"PUT\", method=\"GET\")")
            .expect("parse"),
    );
    assert_eq!(verb.get("method"), Some(&Value::from("GET")));

    let result = harness.parse(Targets::METHOD, "@Verb(\"PUT\", path=\"/\")");
    assert_enum_violation(&result, "method");
}

#[test]
fn test_unknown_property() {
    let harness = Harness::new();
    let result = harness.parse(Targets::METHOD, "@Route(\"/\", host=\"x\")");
    match result {
        Err(AnnotationError::Semantic(SemanticError::UnknownProperty { property, available, .. })) => {
            assert_eq!(property, "host");
            assert_eq!(available, vec!["path", "method", "name", "schemes"]);
        }
        other => panic!("Expected UnknownProperty, got: {:?}", other),
    }
}

#[test]
fn test_no_value_accepted() {
    let harness = Harness::new();
    let result = harness.parse(Targets::METHOD, "@OnlyMethod(\"x\")");
    assert!(matches!(
        result,
        Err(AnnotationError::Semantic(SemanticError::NoValueAccepted { ref values, .. }))
            if values == r#"{"value":"x"}"#
    ));
}

// ============================================================================
// TARGETS
// ============================================================================

#[test]
fn test_disallowed_target() {
    let harness = Harness::new();
    let result = harness.parse(Targets::PROPERTY, "@OnlyMethod");
    assert_disallowed_target(&result, "OnlyMethod");
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("You may only use this annotation on these code elements: METHOD."));

    assert!(harness.parse(Targets::METHOD, "@OnlyMethod").is_ok());
}

#[test]
fn test_empty_target_skips_check() {
    let harness = Harness::new();
    assert_eq!(harness.parse(Targets::empty(), "@OnlyMethod @Foo(bar=1, baz={})").expect("parse").len(), 2);
}

#[test]
fn test_sibling_annotations_use_caller_target() {
    let harness = Harness::new();
    let annotations = harness
        .parse(Targets::METHOD, "/**\n * @Tag(inner=@Tag)\n * @OnlyMethod\n * @OnlyMethod\n */")
        .expect("siblings keep the METHOD target");
    assert_eq!(annotations.len(), 3);
    assert!(annotations[0]
        .get("inner")
        .and_then(Value::as_annotation)
        .is_some_and(|inner| inner.is(TAG)));
    assert!(annotations[1].is(ONLY_METHOD));
}

#[test]
fn test_nested_annotations_use_annotation_target() {
    let harness = Harness::new();
    let result = harness.parse(Targets::METHOD, "@Tag(@OnlyMethod)");
    assert_disallowed_target(&result, "OnlyMethod");
}

#[test]
fn test_nested_builtin_attributes() {
    let harness = Harness::new().with_imports(
        [("Attributes", ATTRIBUTES), ("Attribute", ATTRIBUTE)]
            .into_iter()
            .map(|(alias, name)| (alias.to_string(), name.to_string()))
            .collect(),
    );

    let attributes = only(
        harness
            .parse(
                Targets::CLASS,
                "@Attributes({@Attribute(name=\"x\",type=\"string\",required=true)})",
            )
            .expect("parse"),
    );
    assert!(attributes.is(ATTRIBUTES));

    let items = attributes
        .get("value")
        .and_then(Value::as_array)
        .expect("array value");
    assert_eq!(items.len(), 1);
    let attribute = items
        .get_index(0)
        .and_then(Value::as_annotation)
        .expect("nested attribute");
    assert!(attribute.is(ATTRIBUTE));
    assert_eq!(attribute.get("name"), Some(&Value::from("x")));
    assert_eq!(attribute.get("type"), Some(&Value::from("string")));
    assert_eq!(attribute.get("required"), Some(&Value::Bool(true)));
}

// ============================================================================
// NAME RESOLUTION
// ============================================================================

#[test]
fn test_unresolved_name() {
    let harness = Harness::new();
    let result = harness.parse(Targets::CLASS, "@Bar");
    assert_unresolved(&result, "Bar");
    assert!(result.unwrap_err().to_string().contains("Did you maybe forget to add a \"use\" statement"));
}

#[test]
fn test_ignore_unimported() {
    let harness = Harness::new().with_config(fixtures::lenient_config());
    let annotations = harness
        .parse(Targets::CLASS, "@Bar(1, @Baz) @Tag(\"kept\")")
        .expect("parse");
    assert_eq!(only(annotations).get("value"), Some(&Value::from("kept")));
}

#[test]
fn test_default_documentation_tags_are_ignored() {
    let harness = Harness::new();
    let annotations = harness
        .parse(
            Targets::METHOD,
            "/**\n * @param string $name\n * @return void\n * @throws \\RuntimeException\n * @OnlyMethod\n */",
        )
        .expect("parse");
    assert!(only(annotations).is(ONLY_METHOD));
}

#[test]
fn test_not_an_annotation() {
    let harness = Harness::new();
    let result = harness.parse(Targets::CLASS, "@Plain");
    assert_not_annotation(&result);
}

#[test]
fn test_email_addresses_are_not_annotations() {
    let harness = Harness::new();
    let annotations = harness
        .parse(Targets::METHOD, "/** Contact admin@Foo.com or @OnlyMethod */")
        .expect("parse");
    assert!(only(annotations).is(ONLY_METHOD));
}

#[test]
fn test_constants_in_values() {
    let harness = Harness::new();
    let tag = only(
        harness
            .parse(Targets::CLASS, "@Tag(limit=LIMIT, type=Route::class, {Route::POST: true})")
            .expect("parse"),
    );
    assert_eq!(tag.get("limit"), Some(&Value::Int(50)));
    assert_eq!(tag.get("type"), Some(&Value::from(ROUTE)));

    let result = harness.parse(Targets::CLASS, "@Tag(limit=MISSING)");
    assert!(matches!(
        result,
        Err(AnnotationError::Semantic(SemanticError::UndefinedConstant { ref identifier, .. })) if identifier == "MISSING"
    ));
}

#[test]
fn test_syntax_error_reports_position() {
    let harness = Harness::new();
    let result = harness.parse(Targets::CLASS, "@Tag(a=1 b=2)");
    assert_syntax_error(&result, "')'");
    assert_eq!(
        result.unwrap_err().to_string(),
        "[Syntax Error] Expected ')', got 'b' at position 9 in class App\\User."
    );
}

// ============================================================================
// DESCRIPTOR CACHE
// ============================================================================

#[test]
fn test_describe_is_memoized() {
    let catalog = fixtures::catalog();
    let cache = DescriptorCache::new();
    let ignored = ParserConfig::default().effective_ignored_names();

    let first = cache.describe(ROUTE, &catalog, &ignored).expect("describe");
    let second = cache.describe(ROUTE, &catalog, &ignored).expect("describe");
    assert!(Arc::ptr_eq(&first, &second));

    let via_parse = {
        let mut parser = DocParser::new(&catalog, &cache);
        parser.set_imports(fixtures::imports());
        parser.parse("@Route(\"/\")", "method X::y()").expect("parse");
        cache.get(ROUTE).expect("lookup").expect("cached")
    };
    assert!(Arc::ptr_eq(&first, &via_parse));
}
