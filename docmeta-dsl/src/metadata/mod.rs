//! Metadata resolver: derives an annotation type's descriptor from its own
//! doc comment and public properties.

pub mod builtins;
pub mod cache;
pub mod descriptor;

pub use builtins::{is_builtin, ATTRIBUTE, ATTRIBUTES, BUILTIN_NAMES, ENUM, TARGET};
pub use cache::DescriptorCache;
pub use descriptor::*;

use crate::parser::DocParser;
use docmeta_core::{
    AnnotationInstance, AnnotationResult, ClassCatalog, Member, Targets, Value,
};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static VAR_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@var\s+(\S+)").expect("valid @var pattern"));

/// Type text following `@var`, if any.
pub fn var_type(comment: &str) -> Option<&str> {
    VAR_TYPE
        .captures(comment)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Build the descriptor of `name`. Called by [`DescriptorCache::describe`]
/// on a miss.
pub(crate) fn build_descriptor(
    name: &str,
    catalog: &dyn ClassCatalog,
    cache: &DescriptorCache,
    ignored: &BTreeSet<String>,
) -> AnnotationResult<AnnotationDescriptor> {
    let construction = if catalog.constructor_arity(name) > 0 {
        Construction::Constructor
    } else {
        Construction::PropertyInjection
    };

    let mut descriptor = AnnotationDescriptor::not_annotation(construction);
    let doc = catalog.doc_comment(Member::Class(name)).unwrap_or_default();
    if !doc.contains("@Annotation") {
        return Ok(descriptor);
    }
    descriptor.is_annotation = true;

    let mut parser = DocParser::new(catalog, cache);
    parser.set_ignore_unimported(true);
    parser.set_ignored_names(ignored.iter().cloned());
    parser.set_imports(builtins::bootstrap_imports());
    parser.set_target(Targets::CLASS);

    for annotation in parser.parse(&doc, &format!("class @{}", name))? {
        if annotation.is(TARGET) {
            apply_target(&mut descriptor, &annotation);
        } else if annotation.is(ATTRIBUTES) {
            let declared = annotation
                .get("value")
                .and_then(Value::as_array)
                .into_iter()
                .flat_map(|items| items.values())
                .filter_map(Value::as_annotation);
            for attribute in declared {
                if let Some(attribute_type) = attribute_from_instance(attribute) {
                    descriptor.add_attribute_type(attribute_type);
                }
            }
        }
    }

    if construction == Construction::PropertyInjection {
        parser.set_target(Targets::PROPERTY);

        for property in catalog.public_properties(name) {
            descriptor.properties.push(property.name.clone());

            let Some(comment) = property.doc_comment else {
                continue;
            };

            let required = comment.contains("@Required");
            let declared = var_type(&comment).unwrap_or("mixed");
            if let Some(attribute_type) =
                AttributeType::from_declaration(&property.name, declared, required)
            {
                descriptor.add_attribute_type(attribute_type);
            }

            if comment.contains("@Enum") {
                let context = Member::Property {
                    class: name,
                    name: &property.name,
                }
                .to_string();
                for annotation in parser.parse(&comment, &context)? {
                    if annotation.is(ENUM) {
                        descriptor
                            .enum_constraints
                            .insert(property.name.clone(), enum_from_instance(&annotation));
                    }
                }
            }
        }

        descriptor.default_property = descriptor.properties.first().cloned();
    }

    Ok(descriptor)
}

fn apply_target(descriptor: &mut AnnotationDescriptor, target: &AnnotationInstance) {
    let bits = target
        .get("targets")
        .and_then(Value::as_i64)
        .and_then(|bits| u8::try_from(bits).ok())
        .and_then(Targets::from_bits)
        .unwrap_or(Targets::ALL);
    descriptor.targets = bits;
    descriptor.targets_label = target
        .get("literal")
        .and_then(Value::as_str)
        .map(str::to_string);
}

fn attribute_from_instance(attribute: &AnnotationInstance) -> Option<AttributeType> {
    let name = attribute.get("name").and_then(Value::as_str)?;
    let declared = attribute.get("type").and_then(Value::as_str)?;
    let required = attribute
        .get("required")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    AttributeType::from_declaration(name, declared, required)
}

fn enum_from_instance(annotation: &AnnotationInstance) -> EnumConstraint {
    let allowed: Vec<Value> = annotation
        .get("value")
        .and_then(Value::as_array)
        .map(|items| items.values().cloned().collect())
        .unwrap_or_default();

    let literal: Vec<String> = annotation
        .get("literal")
        .and_then(Value::as_array)
        .map(|items| items.values().map(Value::to_string).collect())
        .unwrap_or_default();

    let display = if literal.is_empty() {
        allowed.iter().map(Value::to_string).collect()
    } else {
        literal
    };

    EnumConstraint { allowed, display }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmeta_core::{ClassDef, StaticCatalog};

    const ROUTE_DOC: &str = r#"/**
 * @Annotation
 * @Target({"METHOD", "CLASS"})
 */"#;

    fn catalog() -> StaticCatalog {
        StaticCatalog::new()
            .with_class(
                "App\\Route",
                ClassDef::new()
                    .doc(ROUTE_DOC)
                    .property("path", Some("/** @var string @Required */"))
                    .property(
                        "method",
                        Some("/**\n * @var string\n * @Enum({\"GET\", \"POST\"})\n */"),
                    )
                    .property("name", None)
                    .property("options", Some("/** @var array<string> */"))
                    .property("extra", Some("/** no type here */")),
            )
            .with_class(
                "App\\Column",
                ClassDef::new()
                    .doc("/** @Annotation @Attributes({@Attribute(\"length\", type=\"int\", required=true)}) */")
                    .constructor_arity(1),
            )
            .with_class("App\\Plain", ClassDef::new().doc("/** Just a class */"))
    }

    fn describe(name: &str) -> std::sync::Arc<AnnotationDescriptor> {
        let catalog = catalog();
        let cache = DescriptorCache::new();
        cache
            .describe(name, &catalog, &BTreeSet::new())
            .expect("describe")
    }

    #[test]
    fn test_var_type() {
        assert_eq!(var_type("/** @var   array<int> */"), Some("array<int>"));
        assert_eq!(var_type("/** @Required */"), None);
    }

    #[test]
    fn test_property_injection_descriptor() {
        let route = describe("App\\Route");
        assert!(route.is_annotation);
        assert_eq!(route.construction, Construction::PropertyInjection);
        assert_eq!(route.targets, Targets::METHOD | Targets::CLASS);
        assert_eq!(route.targets_label.as_deref(), Some("METHOD, CLASS"));
        assert_eq!(route.properties, vec!["path", "method", "name", "options", "extra"]);
        assert_eq!(route.default_property.as_deref(), Some("path"));

        let names: Vec<&str> = route.attribute_types.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["path", "method", "options"]);
        assert!(route.attribute_type("path").expect("path").required);
        assert_eq!(
            route.attribute_type("options").expect("options").element_type,
            Some(ValueType::String)
        );

        let methods = route.enum_constraints.get("method").expect("enum");
        assert_eq!(methods.display, vec!["GET", "POST"]);
        assert!(methods.allows(&Value::from("GET")));
    }

    #[test]
    fn test_constructor_descriptor_from_attributes() {
        let column = describe("App\\Column");
        assert_eq!(column.construction, Construction::Constructor);
        assert_eq!(column.targets, Targets::ALL);
        assert!(column.default_property.is_none());
        let length = column.attribute_type("length").expect("length");
        assert_eq!(length.value_type, ValueType::Integer);
        assert!(length.required);
    }

    #[test]
    fn test_non_annotation_type() {
        let plain = describe("App\\Plain");
        assert!(!plain.is_annotation);
    }
}
