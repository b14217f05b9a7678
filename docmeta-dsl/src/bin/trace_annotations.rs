/// Annotation Tracer - Shows the flow through Doc Comment → Tokens → Instances
///
/// Usage: cargo run --bin trace_annotations <comment-file> [options]

use docmeta_core::{ImportMap, ParserConfig, StaticCatalog, Targets};
use docmeta_dsl::{annotation_source, tokenize, DescriptorCache, DocParser};
use std::fs;
use tracing_subscriber::EnvFilter;

struct Options {
    comment: String,
    catalog: Option<String>,
    config: Option<String>,
    target: Targets,
    context: String,
    imports: ImportMap,
}

fn usage() -> ! {
    eprintln!("Usage: cargo run --bin trace_annotations <comment-file> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --catalog <file.json>   class catalog to resolve names against");
    eprintln!("  --config <file.toml>    parser configuration");
    eprintln!("  --target <TARGET>       CLASS, METHOD, PROPERTY, ANNOTATION or ALL");
    eprintln!("  --context <label>       element label used in errors");
    eprintln!("  --import <alias=Name>   add an import (repeatable)");
    std::process::exit(1);
}

fn parse_options(args: &[String]) -> Options {
    let Some(comment) = args.get(1) else { usage() };
    let mut options = Options {
        comment: comment.clone(),
        catalog: None,
        config: None,
        target: Targets::empty(),
        context: "doc comment".to_string(),
        imports: ImportMap::new(),
    };

    let mut rest = args[2..].iter();
    while let Some(flag) = rest.next() {
        let Some(value) = rest.next() else { usage() };
        match flag.as_str() {
            "--catalog" => options.catalog = Some(value.clone()),
            "--config" => options.config = Some(value.clone()),
            "--context" => options.context = value.clone(),
            "--target" => match Targets::from_literal(value) {
                Some(target) => options.target = target,
                None => {
                    eprintln!("❌ Unknown target {}", value);
                    std::process::exit(1);
                }
            },
            "--import" => match value.split_once('=') {
                Some((alias, name)) => {
                    options.imports.insert(alias.to_string(), name.to_string());
                }
                None => usage(),
            },
            _ => usage(),
        }
    }

    options
}

fn read(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("❌ Failed to read {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let options = parse_options(&args);
    let comment = read(&options.comment);

    let catalog = match &options.catalog {
        Some(path) => match StaticCatalog::from_json_str(&read(path)) {
            Ok(catalog) => catalog,
            Err(e) => {
                eprintln!("❌ Invalid catalog {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => StaticCatalog::new(),
    };

    let config = match &options.config {
        Some(path) => match ParserConfig::from_toml_str(&read(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Invalid config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => ParserConfig::default(),
    };

    println!("╔═══════════════════════════════════════════════════════════════");
    println!("║ DOC COMMENT ANNOTATION TRACER");
    println!("╚═══════════════════════════════════════════════════════════════\n");

    println!("📝 INPUT:");
    println!("{}", comment);
    println!();

    println!("🔤 TOKENS:");
    println!("─────────────────────────────────────────────────────────────");
    match annotation_source(&comment) {
        Some(source) => {
            for token in tokenize(source) {
                println!(
                    "{:>4}:{:<3} {:<16} {:?}",
                    token.span.line,
                    token.span.column,
                    token.kind.to_string(),
                    token.text(source)
                );
            }
        }
        None => println!("(no annotation marker)"),
    }
    println!();

    let descriptors = DescriptorCache::new();
    let mut parser = DocParser::from_config(&catalog, &descriptors, &config);
    parser.set_imports(options.imports);
    parser.set_target(options.target);

    println!("🌳 ANNOTATIONS:");
    println!("─────────────────────────────────────────────────────────────");
    match parser.parse(&comment, &options.context) {
        Ok(annotations) => {
            let json = serde_json::Value::Array(annotations.iter().map(|a| a.to_json()).collect());
            match serde_json::to_string_pretty(&json) {
                Ok(text) => println!("{}", text),
                Err(e) => println!("{:#?} ({})", annotations, e),
            }
            println!();
            println!("✅ Parsed {} annotation(s)", annotations.len());
        }
        Err(e) => {
            println!("❌ {}", e);
            std::process::exit(2);
        }
    }
}
