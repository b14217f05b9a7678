//! Annotation parser
//!
//! [`DocParser`] holds the per-reader settings (imports, namespaces, ignored
//! names, active target). Each [`DocParser::parse`] call runs a fresh
//! recursive-descent pass over one doc comment; see `grammar` for the rules.

mod grammar;

use crate::lexer::{annotation_source, tokenize};
use crate::metadata::DescriptorCache;
use crate::resolver::NameResolver;
use docmeta_core::{
    AnnotationInstance, AnnotationResult, ClassCatalog, ImportMap, ParserConfig, Targets,
    CURRENT_NAMESPACE_KEY,
};
use std::collections::BTreeSet;
use tracing::trace;

/// Parses doc comments into validated annotation instances.
pub struct DocParser<'a> {
    catalog: &'a dyn ClassCatalog,
    descriptors: &'a DescriptorCache,
    target: Targets,
    imports: ImportMap,
    namespaces: Vec<String>,
    ignored_names: BTreeSet<String>,
    ignore_unimported: bool,
}

impl<'a> DocParser<'a> {
    /// A parser with no imports, no ignored names and no target check.
    pub fn new(catalog: &'a dyn ClassCatalog, descriptors: &'a DescriptorCache) -> Self {
        Self {
            catalog,
            descriptors,
            target: Targets::empty(),
            imports: ImportMap::new(),
            namespaces: Vec::new(),
            ignored_names: BTreeSet::new(),
            ignore_unimported: false,
        }
    }

    /// A parser configured from a [`ParserConfig`].
    pub fn from_config(
        catalog: &'a dyn ClassCatalog,
        descriptors: &'a DescriptorCache,
        config: &ParserConfig,
    ) -> Self {
        let mut parser = Self::new(catalog, descriptors);
        parser.set_ignore_unimported(config.ignore_unimported);
        parser.set_ignored_names(config.effective_ignored_names());
        for namespace in &config.namespaces {
            parser.add_namespace(namespace.clone());
        }
        parser
    }

    /// Target for top-level annotations of the next parse. Empty disables
    /// the target check.
    pub fn set_target(&mut self, target: Targets) {
        self.target = target;
    }

    /// Replace the import map. Aliases are matched case-insensitively; the
    /// current-namespace entry is kept as given.
    pub fn set_imports(&mut self, imports: ImportMap) {
        self.imports = imports
            .into_iter()
            .map(|(alias, name)| {
                let alias = if alias == CURRENT_NAMESPACE_KEY {
                    alias
                } else {
                    alias.to_lowercase()
                };
                (alias, name)
            })
            .collect();
    }

    pub fn add_namespace(&mut self, namespace: impl Into<String>) {
        self.namespaces.push(namespace.into());
    }

    pub fn set_ignored_names<I>(&mut self, names: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.ignored_names = names.into_iter().collect();
    }

    pub fn set_ignore_unimported(&mut self, ignore: bool) {
        self.ignore_unimported = ignore;
    }

    pub fn target(&self) -> Targets {
        self.target
    }

    pub fn imports(&self) -> &ImportMap {
        &self.imports
    }

    pub fn ignored_names(&self) -> &BTreeSet<String> {
        &self.ignored_names
    }

    /// Parse every top-level annotation in `text`, in source order.
    ///
    /// `context` names the element the comment belongs to and is used only
    /// in error messages, e.g. `class App\User`.
    pub fn parse(&self, text: &str, context: &str) -> AnnotationResult<Vec<AnnotationInstance>> {
        let Some(source) = annotation_source(text) else {
            return Ok(Vec::new());
        };

        let tokens = tokenize(source);
        let annotations = grammar::Parser::new(self, source, tokens, context).annotations()?;
        trace!(context, count = annotations.len(), "parsed doc comment");
        Ok(annotations)
    }

    pub(crate) fn resolver(&self) -> NameResolver<'_> {
        NameResolver::new(
            self.catalog,
            &self.imports,
            &self.namespaces,
            &self.ignored_names,
            self.ignore_unimported,
        )
    }
}
