//! Helpers for backslash-separated type names.

/// Separator between namespace segments.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// Import-map key holding the namespace of the annotated class.
pub const CURRENT_NAMESPACE_KEY: &str = "__NAMESPACE__";

/// Namespace of the built-in annotation types.
pub const BUILTIN_NAMESPACE: &str = "Docmeta\\Annotation";

/// Alias (lowercased) to fully-qualified type name.
pub type ImportMap = std::collections::BTreeMap<String, String>;

/// Strip a leading `\` from a fully-qualified name.
pub fn normalize(name: &str) -> &str {
    name.strip_prefix(NAMESPACE_SEPARATOR).unwrap_or(name)
}

/// Namespace part of a type name, empty for the global namespace.
pub fn namespace_of(name: &str) -> &str {
    let name = normalize(name);
    match name.rfind(NAMESPACE_SEPARATOR) {
        Some(idx) => &name[..idx],
        None => "",
    }
}

/// Last segment of a type name.
pub fn short_name(name: &str) -> &str {
    let name = normalize(name);
    match name.rfind(NAMESPACE_SEPARATOR) {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// Join a namespace and a relative name.
pub fn join(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", namespace, NAMESPACE_SEPARATOR, name)
    }
}
