//! Annotation descriptor types

use docmeta_core::{normalize, ClassCatalog, Targets, Value};
use std::collections::BTreeMap;
use std::fmt;

/// How an annotation instance is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construction {
    /// The whole keyed value map is passed to the constructor in one call.
    Constructor,
    /// Created without arguments, then each value is assigned to a property.
    PropertyInjection,
}

/// Declared type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    String,
    Integer,
    Float,
    Boolean,
    Array,
    Mixed,
    /// Any other name is a type name, stored without a leading `\`.
    Class(String),
}

impl ValueType {
    /// Map a single type name, accepting the usual aliases.
    pub fn from_name(name: &str) -> Self {
        match name {
            "string" => ValueType::String,
            "int" | "integer" => ValueType::Integer,
            "float" | "double" => ValueType::Float,
            "bool" | "boolean" => ValueType::Boolean,
            "array" => ValueType::Array,
            "mixed" => ValueType::Mixed,
            other => ValueType::Class(normalize(other).to_string()),
        }
    }

    /// Parse declared type text. `array<T>` and `T[]` declare an array of T.
    pub fn parse_declared(text: &str) -> (ValueType, Option<ValueType>) {
        let text = text.trim();
        if let Some(open) = text.find('<') {
            let inner = text[open + 1..].trim_end_matches('>');
            return (ValueType::Array, Some(ValueType::from_name(inner.trim())));
        }
        if let Some(element) = text.strip_suffix("[]") {
            return (ValueType::Array, Some(ValueType::from_name(element)));
        }
        (ValueType::from_name(text), None)
    }

    /// Whether a value satisfies this type. Class types accept annotation
    /// instances of that type or, per the catalog, one of its subtypes.
    pub fn accepts(&self, value: &Value, catalog: &dyn ClassCatalog) -> bool {
        match (self, value) {
            (ValueType::Mixed, _) => true,
            (ValueType::String, Value::String(_)) => true,
            (ValueType::Integer, Value::Int(_)) => true,
            (ValueType::Float, Value::Float(_)) => true,
            (ValueType::Boolean, Value::Bool(_)) => true,
            (ValueType::Array, Value::Array(_)) => true,
            (ValueType::Class(name), Value::Annotation(instance)) => {
                instance.is(name) || catalog.is_instance_of(instance, name)
            }
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::String => write!(f, "string"),
            ValueType::Integer => write!(f, "integer"),
            ValueType::Float => write!(f, "float"),
            ValueType::Boolean => write!(f, "boolean"),
            ValueType::Array => write!(f, "array"),
            ValueType::Mixed => write!(f, "mixed"),
            ValueType::Class(name) => write!(f, "{}", name),
        }
    }
}

/// Declared type of one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeType {
    pub name: String,
    pub value_type: ValueType,
    pub element_type: Option<ValueType>,
    pub required: bool,
    /// Type text as written, used in diagnostics.
    pub declared: String,
}

impl AttributeType {
    /// Build from a declaration such as `array<string>`. `mixed` declares
    /// nothing and yields `None`.
    pub fn from_declaration(name: &str, declared: &str, required: bool) -> Option<Self> {
        let (value_type, element_type) = ValueType::parse_declared(declared);
        if value_type == ValueType::Mixed {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            value_type,
            element_type,
            required,
            declared: declared.to_string(),
        })
    }
}

/// Allowed values of an enumerated property.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstraint {
    pub allowed: Vec<Value>,
    /// Labels shown in errors, defaults to the allowed values themselves.
    pub display: Vec<String>,
}

impl EnumConstraint {
    pub fn allows(&self, value: &Value) -> bool {
        self.allowed.iter().any(|allowed| allowed == value)
    }
}

/// Resolved schema of an annotation type. Built once per name and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationDescriptor {
    pub is_annotation: bool,
    pub construction: Construction,
    pub default_property: Option<String>,
    /// Public properties in declaration order (property injection only).
    pub properties: Vec<String>,
    pub attribute_types: Vec<AttributeType>,
    pub enum_constraints: BTreeMap<String, EnumConstraint>,
    pub targets: Targets,
    pub targets_label: Option<String>,
}

impl AnnotationDescriptor {
    /// Descriptor for a type that is not an annotation.
    pub fn not_annotation(construction: Construction) -> Self {
        Self {
            is_annotation: false,
            construction,
            default_property: None,
            properties: Vec::new(),
            attribute_types: Vec::new(),
            enum_constraints: BTreeMap::new(),
            targets: Targets::ALL,
            targets_label: None,
        }
    }

    /// Add an attribute type, replacing an earlier one with the same name.
    pub fn add_attribute_type(&mut self, attribute: AttributeType) {
        match self
            .attribute_types
            .iter_mut()
            .find(|existing| existing.name == attribute.name)
        {
            Some(existing) => *existing = attribute,
            None => self.attribute_types.push(attribute),
        }
    }

    pub fn attribute_type(&self, name: &str) -> Option<&AttributeType> {
        self.attribute_types.iter().find(|a| a.name == name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p == name)
    }

    /// Label listing the allowed targets, for diagnostics.
    pub fn allowed_targets_label(&self) -> String {
        self.targets_label
            .clone()
            .unwrap_or_else(|| self.targets.label())
    }
}
