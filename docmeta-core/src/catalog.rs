//! Host interfaces: the class catalog the parser reflects on, and the
//! reader contract shared by the direct and the caching readers.
//!
//! The parser never inspects program structure itself. Everything it needs
//! to know about types (existence, constructor shape, public properties,
//! doc comments, constants) comes through [`ClassCatalog`].

use crate::{AnnotationInstance, AnnotationResult, CatalogError, ImportMap, Value, ValueMap};
use std::fmt;
use std::time::SystemTime;

/// A program element whose doc comment can be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Member<'a> {
    Class(&'a str),
    Property { class: &'a str, name: &'a str },
    Method { class: &'a str, name: &'a str },
}

impl<'a> Member<'a> {
    /// Owning class of the member.
    pub fn class(&self) -> &'a str {
        match self {
            Member::Class(class) => class,
            Member::Property { class, .. } | Member::Method { class, .. } => class,
        }
    }
}

/// Renders the diagnostic context label, e.g. `property App\User::$name`.
impl fmt::Display for Member<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Class(class) => write!(f, "class {}", class),
            Member::Property { class, name } => write!(f, "property {}::${}", class, name),
            Member::Method { class, name } => write!(f, "method {}::{}()", class, name),
        }
    }
}

/// A public property of a type, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: String,
    pub doc_comment: Option<String>,
}

impl PropertyInfo {
    pub fn new(name: impl Into<String>, doc_comment: Option<String>) -> Self {
        Self {
            name: name.into(),
            doc_comment,
        }
    }
}

/// Reflection over the host program's types.
///
/// Names passed in are fully qualified and never carry a leading `\`.
/// Implementations must be safe to share between threads because the
/// descriptor cache and the readers are.
pub trait ClassCatalog: Send + Sync {
    /// Whether a type with this name exists.
    fn type_exists(&self, name: &str) -> bool;

    /// Number of constructor parameters, 0 when there is no constructor.
    fn constructor_arity(&self, name: &str) -> usize;

    /// Public properties in declaration order.
    fn public_properties(&self, name: &str) -> Vec<PropertyInfo>;

    /// Raw doc comment of a class, property or method.
    fn doc_comment(&self, member: Member<'_>) -> Option<String>;

    /// Create an instance.
    ///
    /// With `Some(args)` the keyed argument map is passed to the type's
    /// constructor. With `None` the instance is created without arguments
    /// and properties are assigned afterwards.
    fn construct(
        &self,
        name: &str,
        args: Option<ValueMap>,
    ) -> Result<AnnotationInstance, CatalogError>;

    /// Whether `instance` is of type `type_name` or one of its subtypes.
    fn is_instance_of(&self, instance: &AnnotationInstance, type_name: &str) -> bool {
        instance.is(type_name)
    }

    /// Value of a global (`NAME`) or class (`Type::NAME`) constant.
    fn constant(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Import aliases in effect where `class` is declared.
    fn imports_of(&self, _class: &str) -> ImportMap {
        ImportMap::new()
    }

    /// Last modification time of the source that declares `class`.
    fn source_modified(&self, _class: &str) -> Option<SystemTime> {
        None
    }
}

/// Reads the annotations declared on program elements.
///
/// Implemented by the direct doc-comment reader and by the file-backed
/// caching reader that wraps it.
pub trait Reader {
    fn class_annotations(&self, class: &str) -> AnnotationResult<Vec<AnnotationInstance>>;

    fn property_annotations(
        &self,
        class: &str,
        property: &str,
    ) -> AnnotationResult<Vec<AnnotationInstance>>;

    fn method_annotations(
        &self,
        class: &str,
        method: &str,
    ) -> AnnotationResult<Vec<AnnotationInstance>>;

    /// Modification time of the class source, used by cache freshness checks.
    fn source_modified(&self, _class: &str) -> Option<SystemTime> {
        None
    }

    /// Dispatch on the member kind.
    fn annotations(&self, member: Member<'_>) -> AnnotationResult<Vec<AnnotationInstance>> {
        match member {
            Member::Class(class) => self.class_annotations(class),
            Member::Property { class, name } => self.property_annotations(class, name),
            Member::Method { class, name } => self.method_annotations(class, name),
        }
    }

    /// First class annotation of the given type.
    fn class_annotation(
        &self,
        class: &str,
        type_name: &str,
    ) -> AnnotationResult<Option<AnnotationInstance>> {
        Ok(first_of(self.class_annotations(class)?, type_name))
    }

    fn property_annotation(
        &self,
        class: &str,
        property: &str,
        type_name: &str,
    ) -> AnnotationResult<Option<AnnotationInstance>> {
        Ok(first_of(self.property_annotations(class, property)?, type_name))
    }

    fn method_annotation(
        &self,
        class: &str,
        method: &str,
        type_name: &str,
    ) -> AnnotationResult<Option<AnnotationInstance>> {
        Ok(first_of(self.method_annotations(class, method)?, type_name))
    }
}

fn first_of(annotations: Vec<AnnotationInstance>, type_name: &str) -> Option<AnnotationInstance> {
    annotations.into_iter().find(|a| a.is(type_name))
}
