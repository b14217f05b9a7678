//! Integration tests for the file-backed annotation cache
//!
//! Tests verify:
//! - Cached results equal what the direct reader returns
//! - Hits after the first miss, across reader instances
//! - Debug-mode invalidation against the class source time
//! - Recovery from corrupt cache files
//! - Reader errors are propagated and never cached

use docmeta_core::{AnnotationError, Reader};
use docmeta_dsl::DocReader;
use docmeta_storage::{CacheConfig, CacheEntry, FileCacheReader};
use docmeta_test_utils::fixtures::{self, CONTROLLER, ROUTE, TAG};
use docmeta_test_utils::{ClassDef, Member, StaticCatalog, Value};
use std::fs;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

const HOLDER: &str = "App\\Model\\Holder";

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn holder_catalog(doc: &str) -> StaticCatalog {
    fixtures::catalog().with_class(
        HOLDER,
        ClassDef::new()
            .doc(doc)
            .import("Tag", TAG)
            .import("Route", ROUTE)
            .property("id", Some("/** @Route(\"/id\") */")),
    )
}

fn cached(catalog: StaticCatalog, config: CacheConfig) -> FileCacheReader<DocReader> {
    FileCacheReader::new(DocReader::new(Arc::new(catalog)), config).expect("cache reader")
}

// ============================================================================
// ROUND TRIPS
// ============================================================================

#[test]
fn test_cached_results_match_direct_reader() {
    let dir = TempDir::new().expect("temp dir");
    let catalog = holder_catalog("/** @Tag(inner = @Tag({\"a\": 1.5, 2: null, \"list\": {true}})) */");
    let direct = DocReader::new(Arc::new(catalog.clone()));

    let writer = cached(catalog.clone(), CacheConfig::new(dir.path()));
    let reader = cached(catalog, CacheConfig::new(dir.path()));

    for member in [
        Member::Class(CONTROLLER),
        Member::Method { class: CONTROLLER, name: "show" },
        Member::Property { class: CONTROLLER, name: "repository" },
        Member::Class(HOLDER),
    ] {
        let expected = direct.annotations(member).expect("direct read");
        assert_eq!(writer.annotations(member).expect("write-through"), expected, "{}", member);
        assert_eq!(reader.annotations(member).expect("from file"), expected, "{}", member);
    }

    let stats = reader.stats().expect("stats");
    assert_eq!(stats.misses, 0, "second reader is served from files");
    assert_eq!(stats.hits, 4);
}

#[test]
fn test_cache_file_contents() {
    let dir = TempDir::new().expect("temp dir");
    let cache = cached(fixtures::catalog(), CacheConfig::new(dir.path()));
    let annotations = cache.class_annotations(CONTROLLER).expect("read");

    let path = cache.path_for(Member::Class(CONTROLLER));
    let entry: CacheEntry =
        serde_json::from_str(&fs::read_to_string(&path).expect("cache file")).expect("entry json");
    assert_eq!(entry.annotations, annotations);
    assert!(path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(&entry.key) && name.ends_with(".cache.json")));
}

// ============================================================================
// INVALIDATION
// ============================================================================

#[test]
fn test_debug_mode_reparses_newer_sources() {
    let dir = TempDir::new().expect("temp dir");
    let first = cached(holder_catalog("/** @Tag(\"v1\") */"), CacheConfig::new(dir.path()));
    let v1 = first.class_annotations(HOLDER).expect("v1");
    assert_eq!(v1[0].get("value"), Some(&Value::from("v1")));

    let mut changed = holder_catalog("/** @Tag(\"v2\") */");
    changed.touch(HOLDER, SystemTime::now() + Duration::from_secs(3600));

    let production = cached(changed.clone(), CacheConfig::new(dir.path()));
    assert_eq!(production.class_annotations(HOLDER).expect("stale read"), v1);

    let debug = cached(changed, CacheConfig::new(dir.path()).with_debug(true));
    let v2 = debug.class_annotations(HOLDER).expect("fresh read");
    assert_eq!(v2[0].get("value"), Some(&Value::from("v2")));
    assert_eq!(debug.stats().expect("stats").misses, 1);
}

#[test]
fn test_debug_mode_keeps_fresh_entries() {
    let dir = TempDir::new().expect("temp dir");
    let mut catalog = holder_catalog("/** @Tag(\"v1\") */");
    catalog.touch(HOLDER, SystemTime::UNIX_EPOCH);

    let config = CacheConfig::new(dir.path()).with_debug(true);
    cached(catalog.clone(), config.clone())
        .class_annotations(HOLDER)
        .expect("write");

    let again = cached(catalog, config);
    again.class_annotations(HOLDER).expect("read");
    assert_eq!(again.stats().expect("stats").misses, 0);
}

#[test]
fn test_corrupt_entry_is_reparsed() {
    let dir = TempDir::new().expect("temp dir");
    let cache = cached(fixtures::catalog(), CacheConfig::new(dir.path()));
    let expected = cache.class_annotations(CONTROLLER).expect("populate");

    let path = cache.path_for(Member::Class(CONTROLLER));
    fs::write(&path, "{ \"key\": ").expect("corrupt the entry");

    let recovered = cached(fixtures::catalog(), CacheConfig::new(dir.path()));
    assert_eq!(recovered.class_annotations(CONTROLLER).expect("recovered"), expected);
    assert_eq!(recovered.stats().expect("stats").misses, 1);

    let rewritten: CacheEntry =
        serde_json::from_str(&fs::read_to_string(&path).expect("cache file")).expect("valid again");
    assert_eq!(rewritten.annotations, expected);
}

// ============================================================================
// ERRORS
// ============================================================================

#[test]
fn test_reader_errors_are_not_cached() {
    let dir = TempDir::new().expect("temp dir");
    let cache = cached(holder_catalog("/** */"), CacheConfig::new(dir.path()));

    let result = cache.property_annotations(HOLDER, "id");
    assert!(matches!(result, Err(AnnotationError::Semantic(_))));
    assert!(!cache.path_for(Member::Property { class: HOLDER, name: "id" }).exists());
    assert_eq!(cache.stats().expect("stats").loaded, 0);
}

#[test]
fn test_unusable_directory() {
    let dir = TempDir::new().expect("temp dir");
    let file = dir.path().join("occupied");
    fs::write(&file, "not a directory").expect("write file");

    let result = FileCacheReader::new(
        DocReader::new(Arc::new(fixtures::catalog())),
        CacheConfig::new(&file),
    );
    let err = AnnotationError::from(result.expect_err("directory cannot be created"));
    assert!(matches!(err, AnnotationError::Storage { ref reason } if reason.contains("could not be created")));
}
