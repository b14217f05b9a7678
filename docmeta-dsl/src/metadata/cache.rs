//! Descriptor cache shared by every parser that reads the same catalog.

use super::builtins::builtin_descriptors;
use super::descriptor::AnnotationDescriptor;
use docmeta_core::{normalize, AnnotationError, AnnotationResult, ClassCatalog};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Memoized descriptors keyed by fully-qualified type name.
///
/// Pre-seeded with the built-in meta-annotations. Each name is written at
/// most once: when two callers race to describe the same type, the first
/// insert wins and both get that descriptor. Descriptors are built outside
/// the lock, so describing a type whose doc comment mentions other
/// annotation types can re-enter the cache freely.
pub struct DescriptorCache {
    entries: RwLock<HashMap<String, Arc<AnnotationDescriptor>>>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        let entries = builtin_descriptors()
            .into_iter()
            .map(|(name, descriptor)| (name.to_string(), Arc::new(descriptor)))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub fn get(&self, name: &str) -> AnnotationResult<Option<Arc<AnnotationDescriptor>>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AnnotationError::LockPoisoned)?;
        Ok(entries.get(normalize(name)).cloned())
    }

    /// Insert unless already present; returns the descriptor that is cached.
    pub fn insert_if_absent(
        &self,
        name: &str,
        descriptor: AnnotationDescriptor,
    ) -> AnnotationResult<Arc<AnnotationDescriptor>> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AnnotationError::LockPoisoned)?;
        Ok(Arc::clone(
            entries
                .entry(normalize(name).to_string())
                .or_insert_with(|| Arc::new(descriptor)),
        ))
    }

    /// Descriptor for `name`, built from the catalog on first use.
    ///
    /// `ignored` is the ignored-name set of the parser that asked; the
    /// metadata parser reuses it when reading the type's own doc comment.
    pub fn describe(
        &self,
        name: &str,
        catalog: &dyn ClassCatalog,
        ignored: &BTreeSet<String>,
    ) -> AnnotationResult<Arc<AnnotationDescriptor>> {
        if let Some(descriptor) = self.get(name)? {
            return Ok(descriptor);
        }

        let descriptor = super::build_descriptor(normalize(name), catalog, self, ignored)?;
        debug!(
            annotation = name,
            is_annotation = descriptor.is_annotation,
            attributes = descriptor.attribute_types.len(),
            "built annotation descriptor"
        );
        self.insert_if_absent(name, descriptor)
    }

    pub fn contains(&self, name: &str) -> AnnotationResult<bool> {
        Ok(self.get(name)?.is_some())
    }

    pub fn len(&self) -> AnnotationResult<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AnnotationError::LockPoisoned)?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> AnnotationResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for DescriptorCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DescriptorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self
            .entries
            .read()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        f.debug_struct("DescriptorCache").field("names", &names).finish()
    }
}
