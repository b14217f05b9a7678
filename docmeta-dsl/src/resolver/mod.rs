//! Name resolution for annotation names and constant references.

use crate::metadata::is_builtin;
use docmeta_core::{
    join, AnnotationResult, ClassCatalog, ImportMap, SemanticError, Value, CURRENT_NAMESPACE_KEY,
    NAMESPACE_SEPARATOR,
};
use std::collections::BTreeSet;

/// Resolves names written in a doc comment to fully-qualified type names.
pub struct NameResolver<'a> {
    catalog: &'a dyn ClassCatalog,
    imports: &'a ImportMap,
    namespaces: &'a [String],
    ignored: &'a BTreeSet<String>,
    ignore_unimported: bool,
}

impl<'a> NameResolver<'a> {
    pub fn new(
        catalog: &'a dyn ClassCatalog,
        imports: &'a ImportMap,
        namespaces: &'a [String],
        ignored: &'a BTreeSet<String>,
        ignore_unimported: bool,
    ) -> Self {
        Self {
            catalog,
            imports,
            namespaces,
            ignored,
            ignore_unimported,
        }
    }

    /// Built-ins always exist; everything else is asked of the catalog.
    pub fn type_exists(&self, name: &str) -> bool {
        is_builtin(name) || self.catalog.type_exists(name)
    }

    fn is_ignored(&self, raw: &str) -> bool {
        self.ignored.contains(raw)
    }

    fn current_namespace(&self) -> Option<&str> {
        self.imports.get(CURRENT_NAMESPACE_KEY).map(String::as_str)
    }

    /// Look an alias up in the import map: first as a lowercased key, then
    /// as the last segment of an imported name.
    pub fn imported(&self, alias: &str) -> Option<&str> {
        if let Some(name) = self.imports.get(&alias.to_lowercase()) {
            return Some(name);
        }

        let suffix = format!("{}{}", NAMESPACE_SEPARATOR, alias);
        self.imports
            .iter()
            .filter(|(key, _)| key.as_str() != CURRENT_NAMESPACE_KEY)
            .map(|(_, name)| name.as_str())
            .find(|name| *name == alias || name.ends_with(&suffix))
    }

    fn namespaced(&self, name: &str) -> Option<String> {
        self.namespaces
            .iter()
            .map(|ns| join(ns, name))
            .find(|candidate| self.type_exists(candidate))
    }

    /// Resolve an annotation name.
    ///
    /// Returns `Ok(None)` when the name should be skipped silently: it
    /// could not be resolved and either unimported names are ignored or the
    /// raw name is in the ignored set.
    pub fn resolve_annotation(&self, raw: &str, context: &str) -> AnnotationResult<Option<String>> {
        if let Some(qualified) = raw.strip_prefix(NAMESPACE_SEPARATOR) {
            return self.existing(qualified, context).map(Some);
        }

        let (alias, rest) = match raw.find(NAMESPACE_SEPARATOR) {
            Some(idx) => (&raw[..idx], &raw[idx..]),
            None => (raw, ""),
        };

        if let Some(name) = self.namespaced(raw) {
            return Ok(Some(name));
        }

        if let Some(imported) = self.imported(alias) {
            let name = format!("{}{}", imported, rest);
            return self.existing(&name, context).map(Some);
        }

        if !self.is_ignored(raw) {
            if let Some(ns) = self.current_namespace() {
                let candidate = join(ns, raw);
                if self.type_exists(&candidate) {
                    return Ok(Some(candidate));
                }
            }
            if self.type_exists(raw) {
                return Ok(Some(raw.to_string()));
            }
        }

        if self.ignore_unimported || self.is_ignored(raw) {
            return Ok(None);
        }

        Err(SemanticError::UnresolvedName {
            name: raw.to_string(),
            context: context.to_string(),
        }
        .into())
    }

    fn existing(&self, name: &str, context: &str) -> AnnotationResult<String> {
        let name = name.trim_start_matches(NAMESPACE_SEPARATOR);
        if self.type_exists(name) {
            Ok(name.to_string())
        } else {
            Err(SemanticError::UnknownType {
                name: name.to_string(),
                context: context.to_string(),
            }
            .into())
        }
    }

    /// Resolve the type part of a `Type::CONST` reference through the
    /// namespace list, the imports and the current namespace. Unresolvable
    /// names are returned unchanged.
    pub fn resolve_class_reference(&self, class: &str) -> String {
        let (alias, rest) = match class.find(NAMESPACE_SEPARATOR) {
            Some(idx) => (&class[..idx], &class[idx..]),
            None => (class, ""),
        };

        if let Some(name) = self.namespaced(class) {
            return name;
        }
        if let Some(imported) = self.imported(alias) {
            return format!("{}{}", imported, rest);
        }
        if let Some(ns) = self.current_namespace() {
            let candidate = join(ns, class);
            if self.type_exists(&candidate) {
                return candidate;
            }
        }
        class.to_string()
    }

    /// Evaluate a constant reference such as `Route::GET`, `\App\Route::GET`,
    /// `Route::class` or a global `LIMIT`.
    pub fn resolve_constant(&self, identifier: &str, context: &str) -> AnnotationResult<Value> {
        let mut identifier = identifier.to_string();

        if self.catalog.constant(&identifier).is_none() && !identifier.starts_with(NAMESPACE_SEPARATOR) {
            if let Some((class, constant)) = identifier.split_once("::") {
                identifier = format!("{}::{}", self.resolve_class_reference(class), constant);
            }
        }

        if let Some(idx) = identifier.rfind("::") {
            if identifier[idx + 2..].eq_ignore_ascii_case("class") {
                let class = identifier[..idx].trim_start_matches(NAMESPACE_SEPARATOR);
                return Ok(Value::from(class));
            }
        }

        self.catalog
            .constant(&identifier)
            .ok_or_else(|| {
                SemanticError::UndefinedConstant {
                    identifier: identifier.clone(),
                    context: context.to_string(),
                }
                .into()
            })
    }
}
