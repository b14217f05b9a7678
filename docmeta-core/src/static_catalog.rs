//! In-memory class catalog.
//!
//! Hosts that already know their types up front (tests, tooling, the trace
//! binary) describe them here instead of implementing [`ClassCatalog`].
//! The catalog can be built in code or loaded from JSON.

use crate::{
    normalize, AnnotationInstance, CatalogError, ClassCatalog, ConfigError, ImportMap, Member,
    PropertyInfo, Value, ValueMap,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::SystemTime;

/// A declared public property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
    /// Value the property holds on an argument-less instance.
    #[serde(default)]
    pub default: Value,
}

/// A declared method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
}

/// Everything the catalog knows about one type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub constructor_arity: usize,
    /// Direct supertypes, used by `is_instance_of`.
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
    #[serde(default)]
    pub constants: BTreeMap<String, Value>,
    #[serde(default)]
    pub imports: ImportMap,
    #[serde(skip)]
    pub modified: Option<SystemTime>,
}

impl ClassDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn constructor_arity(mut self, arity: usize) -> Self {
        self.constructor_arity = arity;
        self
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    pub fn property(self, name: impl Into<String>, doc: Option<&str>) -> Self {
        self.property_with_default(name, doc, Value::Null)
    }

    pub fn property_with_default(
        mut self,
        name: impl Into<String>,
        doc: Option<&str>,
        default: Value,
    ) -> Self {
        self.properties.push(PropertyDef {
            name: name.into(),
            doc: doc.map(str::to_string),
            default,
        });
        self
    }

    pub fn method(mut self, name: impl Into<String>, doc: Option<&str>) -> Self {
        self.methods.push(MethodDef {
            name: name.into(),
            doc: doc.map(str::to_string),
        });
        self
    }

    pub fn constant(mut self, name: impl Into<String>, value: Value) -> Self {
        self.constants.insert(name.into(), value);
        self
    }

    /// Register an import alias. The alias is stored lowercased.
    pub fn import(mut self, alias: &str, type_name: impl Into<String>) -> Self {
        self.imports.insert(alias.to_lowercase(), type_name.into());
        self
    }

    pub fn modified(mut self, at: SystemTime) -> Self {
        self.modified = Some(at);
        self
    }
}

/// Catalog backed by plain data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticCatalog {
    #[serde(default)]
    classes: BTreeMap<String, ClassDef>,
    /// Global constants.
    #[serde(default)]
    constants: BTreeMap<String, Value>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from its JSON form.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let mut catalog: StaticCatalog =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse {
                reason: e.to_string(),
            })?;
        // Keys may be written with a leading separator.
        catalog.classes = std::mem::take(&mut catalog.classes)
            .into_iter()
            .map(|(name, def)| (normalize(&name).to_string(), def))
            .collect();
        Ok(catalog)
    }

    pub fn with_class(mut self, name: &str, def: ClassDef) -> Self {
        self.insert_class(name, def);
        self
    }

    pub fn insert_class(&mut self, name: &str, def: ClassDef) {
        self.classes.insert(normalize(name).to_string(), def);
    }

    pub fn with_constant(mut self, name: impl Into<String>, value: Value) -> Self {
        self.constants.insert(name.into(), value);
        self
    }

    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes.get(normalize(name))
    }

    /// Record a new source modification time for a class.
    pub fn touch(&mut self, name: &str, at: SystemTime) {
        if let Some(def) = self.classes.get_mut(normalize(name)) {
            def.modified = Some(at);
        }
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    fn defaults_of(def: &ClassDef) -> ValueMap {
        def.properties
            .iter()
            .map(|p| (p.name.clone(), p.default.clone()))
            .collect()
    }
}

impl ClassCatalog for StaticCatalog {
    fn type_exists(&self, name: &str) -> bool {
        self.class(name).is_some()
    }

    fn constructor_arity(&self, name: &str) -> usize {
        self.class(name).map(|def| def.constructor_arity).unwrap_or(0)
    }

    fn public_properties(&self, name: &str) -> Vec<PropertyInfo> {
        self.class(name)
            .map(|def| {
                def.properties
                    .iter()
                    .map(|p| PropertyInfo::new(p.name.clone(), p.doc.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn doc_comment(&self, member: Member<'_>) -> Option<String> {
        let def = self.class(member.class())?;
        match member {
            Member::Class(_) => def.doc.clone(),
            Member::Property { name, .. } => def
                .properties
                .iter()
                .find(|p| p.name == name)
                .and_then(|p| p.doc.clone()),
            Member::Method { name, .. } => def
                .methods
                .iter()
                .find(|m| m.name.eq_ignore_ascii_case(name))
                .and_then(|m| m.doc.clone()),
        }
    }

    fn construct(
        &self,
        name: &str,
        args: Option<ValueMap>,
    ) -> Result<AnnotationInstance, CatalogError> {
        let name = normalize(name);
        let def = self.class(name).ok_or_else(|| CatalogError {
            type_name: name.to_string(),
            reason: "type is not declared in the catalog".to_string(),
        })?;

        let mut properties = Self::defaults_of(def);
        if let Some(args) = args {
            properties.extend(args);
        }
        Ok(AnnotationInstance::with_properties(name, properties))
    }

    fn is_instance_of(&self, instance: &AnnotationInstance, type_name: &str) -> bool {
        let wanted = normalize(type_name);
        let mut pending = vec![instance.type_name().to_string()];
        let mut seen = HashSet::new();

        while let Some(current) = pending.pop() {
            if current == wanted {
                return true;
            }
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(def) = self.class(&current) {
                pending.extend(def.parents.iter().map(|p| normalize(p).to_string()));
            }
        }
        false
    }

    fn constant(&self, name: &str) -> Option<Value> {
        match name.split_once("::") {
            Some((class, constant)) => self.class(class)?.constants.get(constant).cloned(),
            None => self.constants.get(normalize(name)).cloned(),
        }
    }

    fn imports_of(&self, class: &str) -> ImportMap {
        self.class(class)
            .map(|def| def.imports.clone())
            .unwrap_or_default()
    }

    fn source_modified(&self, class: &str) -> Option<SystemTime> {
        self.class(class).and_then(|def| def.modified)
    }
}
