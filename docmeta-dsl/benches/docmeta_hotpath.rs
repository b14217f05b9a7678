use criterion::{black_box, criterion_group, criterion_main, Criterion};
use docmeta_core::{ParserConfig, Reader, Targets};
use docmeta_dsl::{annotation_source, tokenize, DescriptorCache, DocParser, DocReader};
use docmeta_test_utils::fixtures::{self, CONTROLLER, ROUTE};
use std::sync::Arc;

const ROUTE_DOC: &str = r#"/**
 * Shows one user.
 *
 * @Route("/users/{id}", method = "POST", name = "user_show", schemes = {"https", "http"})
 * @Tag(limit = LIMIT, owner = "team", nested = @Tag({1, 2.5, true, null}))
 * @param int $id
 */"#;

fn bench_tokenize(c: &mut Criterion) {
    let source = annotation_source(ROUTE_DOC).expect("annotation marker");

    c.bench_function("lexer/tokenize_route", |b| {
        b.iter(|| {
            let tokens = tokenize(black_box(source));
            black_box(tokens.len());
        });
    });
}

fn bench_parse(c: &mut Criterion) {
    let catalog = fixtures::catalog();
    let descriptors = DescriptorCache::new();
    let config = ParserConfig::default();
    let mut parser = DocParser::from_config(&catalog, &descriptors, &config);
    parser.set_imports(fixtures::imports());
    parser.set_target(Targets::METHOD);

    c.bench_function("parser/parse_route_doc", |b| {
        b.iter(|| {
            let annotations = parser
                .parse(black_box(ROUTE_DOC), "method UserController::show()")
                .expect("parse doc comment");
            black_box(annotations.len());
        });
    });
}

fn bench_describe(c: &mut Criterion) {
    let catalog = fixtures::catalog();
    let ignored = ParserConfig::default().effective_ignored_names();

    c.bench_function("metadata/describe_cold", |b| {
        b.iter(|| {
            let descriptors = DescriptorCache::new();
            let descriptor = descriptors
                .describe(black_box(ROUTE), &catalog, &ignored)
                .expect("describe route");
            black_box(descriptor.properties.len());
        });
    });

    let descriptors = DescriptorCache::new();
    c.bench_function("metadata/describe_warm", |b| {
        b.iter(|| {
            let descriptor = descriptors
                .describe(black_box(ROUTE), &catalog, &ignored)
                .expect("describe route");
            black_box(descriptor.properties.len());
        });
    });
}

fn bench_reader(c: &mut Criterion) {
    let reader = DocReader::new(Arc::new(fixtures::catalog()));

    c.bench_function("reader/controller_members", |b| {
        b.iter(|| {
            let class = reader.class_annotations(CONTROLLER).expect("class");
            let method = reader
                .method_annotations(CONTROLLER, "show")
                .expect("method");
            black_box(class.len() + method.len());
        });
    });
}

criterion_group!(benches, bench_tokenize, bench_parse, bench_describe, bench_reader);
criterion_main!(benches);
