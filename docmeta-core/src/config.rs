//! Parser configuration

use crate::{AnnotationResult, ConfigError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Documentation tags that are never treated as annotations.
pub const DEFAULT_IGNORED_NAMES: &[&str] = &[
    // Marker tags read by the metadata resolver
    "Annotation",
    "Attribute",
    "Attributes",
    "Required",
    "Target",
    "Enum",
    // Common doc-block tags
    "access",
    "author",
    "category",
    "copyright",
    "deprecated",
    "example",
    "filesource",
    "global",
    "ignore",
    "inheritdoc",
    "inheritDoc",
    "internal",
    "license",
    "link",
    "method",
    "package",
    "param",
    "property",
    "property-read",
    "property-write",
    "return",
    "see",
    "since",
    "source",
    "subpackage",
    "throw",
    "throws",
    "todo",
    "TODO",
    "uses",
    "var",
    "version",
    // Tool-specific tags
    "codeCoverageIgnore",
    "codeCoverageIgnoreStart",
    "codeCoverageIgnoreEnd",
    "fixme",
    "FIXME",
    "noinspection",
    "override",
    "SuppressWarnings",
];

/// Options for reading annotations from doc comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Silently skip names that cannot be resolved.
    pub ignore_unimported: bool,
    /// Extra names to skip, matched exactly and case-sensitively.
    pub ignored_names: BTreeSet<String>,
    /// Namespaces searched for unqualified names, in order.
    pub namespaces: Vec<String>,
    /// Add [`DEFAULT_IGNORED_NAMES`] to `ignored_names`.
    pub include_default_ignored: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            ignore_unimported: false,
            ignored_names: BTreeSet::new(),
            namespaces: Vec::new(),
            include_default_ignored: true,
        }
    }
}

impl ParserConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(text: &str) -> AnnotationResult<Self> {
        let config: ParserConfig = toml::from_str(text).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_ignore_unimported(mut self, ignore: bool) -> Self {
        self.ignore_unimported = ignore;
        self
    }

    pub fn with_ignored_name(mut self, name: impl Into<String>) -> Self {
        self.ignored_names.insert(name.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.push(namespace.into());
        self
    }

    pub fn with_default_ignored(mut self, include: bool) -> Self {
        self.include_default_ignored = include;
        self
    }

    /// The configured ignored names merged with the defaults when enabled.
    pub fn effective_ignored_names(&self) -> BTreeSet<String> {
        let mut names = self.ignored_names.clone();
        if self.include_default_ignored {
            names.extend(DEFAULT_IGNORED_NAMES.iter().map(|n| n.to_string()));
        }
        names
    }

    /// Validate the configuration.
    pub fn validate(&self) -> AnnotationResult<()> {
        for name in &self.ignored_names {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "ignored_names".to_string(),
                    value: format!("{:?}", name),
                    reason: "ignored names must not be blank".to_string(),
                }
                .into());
            }
        }

        for namespace in &self.namespaces {
            if namespace.is_empty()
                || namespace.starts_with('\\')
                || namespace.ends_with('\\')
                || namespace.contains(char::is_whitespace)
            {
                return Err(ConfigError::InvalidValue {
                    field: "namespaces".to_string(),
                    value: namespace.clone(),
                    reason: "namespaces must be non-empty without surrounding separators or whitespace"
                        .to_string(),
                }
                .into());
            }
        }

        Ok(())
    }
}
