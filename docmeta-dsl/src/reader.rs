//! Direct doc-comment reader.

use crate::metadata::DescriptorCache;
use crate::parser::DocParser;
use docmeta_core::{
    namespace_of, AnnotationInstance, AnnotationResult, ClassCatalog, ImportMap, Member,
    ParserConfig, Reader, Targets, CURRENT_NAMESPACE_KEY,
};
use std::sync::Arc;
use std::time::SystemTime;

/// Reads annotations by parsing the member's doc comment on every call.
///
/// Imports come from the catalog for the declaring class, plus the class's
/// own namespace. Descriptors are shared through an [`Arc`] so several
/// readers over the same catalog describe each type once.
#[derive(Clone)]
pub struct DocReader {
    catalog: Arc<dyn ClassCatalog>,
    descriptors: Arc<DescriptorCache>,
    config: ParserConfig,
}

impl DocReader {
    pub fn new(catalog: Arc<dyn ClassCatalog>) -> Self {
        Self {
            catalog,
            descriptors: Arc::new(DescriptorCache::new()),
            config: ParserConfig::default(),
        }
    }

    /// Reader with a validated configuration.
    pub fn with_config(catalog: Arc<dyn ClassCatalog>, config: ParserConfig) -> AnnotationResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(catalog)
        })
    }

    /// Share an existing descriptor cache.
    pub fn with_descriptors(mut self, descriptors: Arc<DescriptorCache>) -> Self {
        self.descriptors = descriptors;
        self
    }

    pub fn descriptors(&self) -> &Arc<DescriptorCache> {
        &self.descriptors
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    fn imports_for(&self, class: &str) -> ImportMap {
        let mut imports = self.catalog.imports_of(class);
        let namespace = namespace_of(class);
        if !namespace.is_empty() {
            imports.insert(CURRENT_NAMESPACE_KEY.to_string(), namespace.to_string());
        }
        imports
    }

    fn read(&self, member: Member<'_>, target: Targets) -> AnnotationResult<Vec<AnnotationInstance>> {
        let Some(doc) = self.catalog.doc_comment(member) else {
            return Ok(Vec::new());
        };

        let mut parser = DocParser::from_config(self.catalog.as_ref(), &self.descriptors, &self.config);
        parser.set_imports(self.imports_for(member.class()));
        parser.set_target(target);
        parser.parse(&doc, &member.to_string())
    }
}

impl Reader for DocReader {
    fn class_annotations(&self, class: &str) -> AnnotationResult<Vec<AnnotationInstance>> {
        self.read(Member::Class(class), Targets::CLASS)
    }

    fn property_annotations(
        &self,
        class: &str,
        property: &str,
    ) -> AnnotationResult<Vec<AnnotationInstance>> {
        self.read(
            Member::Property {
                class,
                name: property,
            },
            Targets::PROPERTY,
        )
    }

    fn method_annotations(
        &self,
        class: &str,
        method: &str,
    ) -> AnnotationResult<Vec<AnnotationInstance>> {
        self.read(
            Member::Method {
                class,
                name: method,
            },
            Targets::METHOD,
        )
    }

    fn source_modified(&self, class: &str) -> Option<SystemTime> {
        self.catalog.source_modified(class)
    }
}

impl std::fmt::Debug for DocReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocReader")
            .field("descriptors", &self.descriptors)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmeta_core::{AnnotationError, ClassDef, SemanticError, StaticCatalog, Value};

    fn catalog() -> StaticCatalog {
        StaticCatalog::new()
            .with_class(
                "App\\Annotation\\Cached",
                ClassDef::new()
                    .doc("/** @Annotation @Target({\"METHOD\", \"CLASS\"}) */")
                    .property("ttl", Some("/** @var int */")),
            )
            .with_class(
                "App\\Service\\Mailer",
                ClassDef::new()
                    .doc("/**\n * Sends mail to admin@example.com\n * @Cached(60)\n */")
                    .import("Cached", "App\\Annotation\\Cached")
                    .method("send", Some("/** @Cached(ttl=5) */"))
                    .property("from", Some("/** @Cached */")),
            )
            .with_class("App\\Service\\Local", ClassDef::new().doc("/** @Helper */"))
            .with_class("App\\Service\\Helper", ClassDef::new().doc("/** @Annotation */"))
    }

    fn reader() -> DocReader {
        DocReader::new(Arc::new(catalog()))
    }

    #[test]
    fn test_class_and_method_annotations() {
        let reader = reader();
        let class = reader.class_annotations("App\\Service\\Mailer").expect("class");
        assert_eq!(class.len(), 1);
        assert_eq!(class[0].get("ttl"), Some(&Value::Int(60)));

        let method = reader
            .method_annotation("App\\Service\\Mailer", "send", "App\\Annotation\\Cached")
            .expect("method")
            .expect("present");
        assert_eq!(method.get("ttl"), Some(&Value::Int(5)));
    }

    #[test]
    fn test_property_target_is_checked() {
        let err = reader()
            .property_annotations("App\\Service\\Mailer", "from")
            .unwrap_err();
        assert_eq!(
            err,
            AnnotationError::Semantic(SemanticError::DisallowedTarget {
                annotation: "Cached".to_string(),
                context: "property App\\Service\\Mailer::$from".to_string(),
                allowed: "METHOD, CLASS".to_string(),
            })
        );
    }

    #[test]
    fn test_current_namespace_resolution() {
        let annotations = reader().class_annotations("App\\Service\\Local").expect("class");
        assert!(annotations[0].is("App\\Service\\Helper"));
    }

    #[test]
    fn test_missing_members_read_empty() {
        let reader = reader();
        assert!(reader.class_annotations("App\\Missing").expect("empty").is_empty());
        assert!(reader
            .method_annotations("App\\Service\\Mailer", "unknown")
            .expect("empty")
            .is_empty());
    }

    #[test]
    fn test_descriptors_are_shared() {
        let reader = reader();
        let copy = reader.clone();
        reader.class_annotations("App\\Service\\Mailer").expect("class");
        assert!(copy
            .descriptors()
            .contains("App\\Annotation\\Cached")
            .expect("lookup"));
    }
}
