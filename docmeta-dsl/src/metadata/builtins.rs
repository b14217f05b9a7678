//! The four built-in meta-annotations.
//!
//! Their descriptors are fixed tables instead of being derived from doc
//! comments, and the engine constructs their instances itself.

use super::descriptor::*;
use docmeta_core::{
    AnnotationInstance, AnnotationResult, Array, ImportMap, SemanticError, Targets,
    Value, ValueMap, BUILTIN_NAMESPACE, TARGET_LITERALS,
};
use std::collections::BTreeMap;

pub const TARGET: &str = "Docmeta\\Annotation\\Target";
pub const ATTRIBUTE: &str = "Docmeta\\Annotation\\Attribute";
pub const ATTRIBUTES: &str = "Docmeta\\Annotation\\Attributes";
pub const ENUM: &str = "Docmeta\\Annotation\\Enum";

pub const BUILTIN_NAMES: [&str; 4] = [TARGET, ATTRIBUTE, ATTRIBUTES, ENUM];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// Imports used when parsing an annotation type's own doc comment.
pub fn bootstrap_imports() -> ImportMap {
    BUILTIN_NAMES
        .iter()
        .map(|name| {
            let short = &name[BUILTIN_NAMESPACE.len() + 1..];
            (short.to_lowercase(), name.to_string())
        })
        .collect()
}

fn attribute(name: &str, declared: &str, required: bool) -> AttributeType {
    let (value_type, element_type) = ValueType::parse_declared(declared);
    AttributeType {
        name: name.to_string(),
        value_type,
        element_type,
        required,
        declared: declared.to_string(),
    }
}

fn descriptor(
    construction: Construction,
    properties: &[&str],
    targets: Targets,
    attribute_types: Vec<AttributeType>,
) -> AnnotationDescriptor {
    AnnotationDescriptor {
        is_annotation: true,
        construction,
        default_property: Some(
            properties
                .first()
                .copied()
                .unwrap_or("value")
                .to_string(),
        ),
        properties: properties.iter().map(|p| p.to_string()).collect(),
        attribute_types,
        enum_constraints: BTreeMap::new(),
        targets,
        targets_label: None,
    }
}

/// Seed table for the descriptor cache.
pub fn builtin_descriptors() -> Vec<(&'static str, AnnotationDescriptor)> {
    vec![
        (
            TARGET,
            descriptor(
                Construction::Constructor,
                &[],
                Targets::CLASS,
                vec![attribute("value", "array<string>", false)],
            ),
        ),
        (
            ATTRIBUTE,
            descriptor(
                Construction::PropertyInjection,
                &["name", "type", "required"],
                Targets::ANNOTATION,
                vec![
                    attribute("name", "string", true),
                    attribute("type", "string", true),
                    attribute("required", "boolean", false),
                ],
            ),
        ),
        (
            ATTRIBUTES,
            descriptor(
                Construction::PropertyInjection,
                &["value"],
                Targets::CLASS,
                vec![attribute("value", &format!("array<{}>", ATTRIBUTE), true)],
            ),
        ),
        (
            ENUM,
            descriptor(
                Construction::Constructor,
                &[],
                Targets::PROPERTY,
                vec![attribute("value", "array", true), attribute("literal", "array", false)],
            ),
        ),
    ]
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

/// Construct a built-in instance, `None` when `name` is not a built-in.
pub(crate) fn instantiate(
    name: &str,
    args: Option<ValueMap>,
) -> Option<AnnotationResult<AnnotationInstance>> {
    match name {
        TARGET => Some(construct_target(args.unwrap_or_default())),
        ENUM => Some(construct_enum(args.unwrap_or_default())),
        ATTRIBUTE => {
            let mut instance = AnnotationInstance::new(ATTRIBUTE);
            instance.set("name", Value::Null);
            instance.set("type", Value::Null);
            instance.set("required", Value::Bool(false));
            Some(Ok(instance))
        }
        ATTRIBUTES => {
            let mut instance = AnnotationInstance::new(ATTRIBUTES);
            instance.set("value", Value::Null);
            Some(Ok(instance))
        }
        _ => None,
    }
}

fn invalid(annotation: &str, reason: String) -> docmeta_core::AnnotationError {
    SemanticError::InvalidArgument {
        annotation: annotation.to_string(),
        reason,
    }
    .into()
}

fn construct_target(values: ValueMap) -> AnnotationResult<AnnotationInstance> {
    let literals: Vec<String> = match values.get("value") {
        None | Some(Value::Null) => vec!["ALL".to_string()],
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .values()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(invalid(
                    "Target",
                    format!(
                        "@Target expects either a string value, or an array of strings, \"{}\" given.",
                        other.type_label()
                    ),
                )),
            })
            .collect::<AnnotationResult<_>>()?,
        Some(other) => {
            return Err(invalid(
                "Target",
                format!(
                    "@Target expects either a string value, or an array of strings, \"{}\" given.",
                    other.type_label()
                ),
            ))
        }
    };

    let mut targets = Targets::empty();
    for literal in &literals {
        match Targets::from_literal(literal) {
            Some(flags) => targets |= flags,
            None => {
                let available: Vec<&str> = TARGET_LITERALS.iter().map(|(n, _)| *n).collect();
                return Err(invalid(
                    "Target",
                    format!(
                        "Invalid Target \"{}\". Available targets: [{}]",
                        literal,
                        available.join(", ")
                    ),
                ));
            }
        }
    }

    let mut instance = AnnotationInstance::new(TARGET);
    instance.set(
        "value",
        Value::list(literals.iter().map(|l| Value::from(l.as_str()))),
    );
    instance.set("targets", Value::Int(i64::from(targets.bits())));
    instance.set("literal", Value::from(literals.join(", ")));
    Ok(instance)
}

fn construct_enum(values: ValueMap) -> AnnotationResult<AnnotationInstance> {
    let allowed = match values.get("value") {
        Some(Value::Array(items)) => items.clone(),
        other => {
            return Err(invalid(
                "Enum",
                format!(
                    "@Enum expects an array of values, \"{}\" given.",
                    other.map(Value::type_label).unwrap_or_else(|| "NULL".to_string())
                ),
            ))
        }
    };

    if let Some(bad) = allowed.values().find(|v| !v.is_scalar()) {
        return Err(invalid(
            "Enum",
            format!("@Enum supports only scalar values \"{}\" given.", bad.type_label()),
        ));
    }

    let literal = match values.get("literal") {
        None | Some(Value::Null) => Array::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => {
            return Err(invalid(
                "Enum",
                format!("@Enum literal must be an array, \"{}\" given.", other.type_label()),
            ))
        }
    };

    for (key, label) in literal.iter() {
        let key_text = key.to_string();
        if !allowed.values().any(|v| v.to_string() == key_text) {
            return Err(invalid(
                "Enum",
                format!(
                    "Undefined enumerator value \"{}\" for literal \"{}\".",
                    key_text, label
                ),
            ));
        }
    }

    let mut instance = AnnotationInstance::new(ENUM);
    instance.set("value", Value::Array(allowed));
    instance.set("literal", Value::Array(literal));
    Ok(instance)
}
