//! Fuzz test for the annotation parser
//!
//! Parses arbitrary UTF-8 as a doc comment against a small catalog and
//! checks that every outcome is either a list of instances or an error
//! with a non-empty message.
//!
//! Run with: cargo +nightly fuzz run parser_fuzz -- -max_total_time=60

#![no_main]

use docmeta_core::{ClassDef, ImportMap, StaticCatalog, Targets, Value};
use docmeta_dsl::{DescriptorCache, DocParser};
use libfuzzer_sys::fuzz_target;
use std::sync::LazyLock;

static CATALOG: LazyLock<StaticCatalog> = LazyLock::new(|| {
    StaticCatalog::new()
        .with_class(
            "Fuzz\\Route",
            ClassDef::new()
                .doc("/** @Annotation @Target({\"METHOD\", \"CLASS\"}) */")
                .property("path", Some("/** @var string @Required */"))
                .property("methods", Some("/** @var array<string> */")),
        )
        .with_class("Fuzz\\Tag", ClassDef::new().doc("/** @Annotation */").constructor_arity(1))
        .with_class("Fuzz\\Plain", ClassDef::new())
        .with_constant("LIMIT", Value::Int(10))
});

static IMPORTS: LazyLock<ImportMap> = LazyLock::new(|| {
    [("route", "Fuzz\\Route"), ("tag", "Fuzz\\Tag"), ("plain", "Fuzz\\Plain")]
        .into_iter()
        .map(|(alias, name)| (alias.to_string(), name.to_string()))
        .collect()
});

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let descriptors = DescriptorCache::new();
        let mut parser = DocParser::new(&*CATALOG, &descriptors);
        parser.set_imports(IMPORTS.clone());
        parser.set_target(Targets::CLASS);

        match parser.parse(input, "fuzz input") {
            Ok(annotations) => {
                for annotation in &annotations {
                    assert!(!annotation.type_name().is_empty());
                }
            }
            Err(err) => {
                assert!(!err.to_string().is_empty(), "Errors should carry a message");
            }
        }
    }
});
