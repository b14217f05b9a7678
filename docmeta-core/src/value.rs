//! Annotation values and constructed annotation instances.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Keyed argument map handed to the validator and to constructors.
pub type ValueMap = BTreeMap<String, Value>;

// ============================================================================
// ARRAYS
// ============================================================================

/// Key of an array entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArrayKey {
    Index(i64),
    Name(String),
}

impl ArrayKey {
    /// Build a key from written text. Canonical integer text becomes an index,
    /// so `"1"` and `1` address the same entry.
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.parse::<i64>() {
            Ok(index) if index.to_string() == name => ArrayKey::Index(index),
            _ => ArrayKey::Name(name),
        }
    }
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKey::Index(i) => write!(f, "{}", i),
            ArrayKey::Name(s) => write!(f, "{}", s),
        }
    }
}

/// Ordered array with integer or string keys.
///
/// Unkeyed entries are appended with the next free integer index. Inserting
/// an existing key replaces that entry in place and keeps its position.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Array {
    entries: Vec<(ArrayKey, Value)>,
}

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under the next integer index.
    pub fn push(&mut self, value: Value) {
        let next = self
            .entries
            .iter()
            .filter_map(|(key, _)| match key {
                ArrayKey::Index(i) => Some(*i + 1),
                ArrayKey::Name(_) => None,
            })
            .max()
            .unwrap_or(0)
            .max(0);
        self.entries.push((ArrayKey::Index(next), value));
    }

    /// Insert a value under an explicit key.
    pub fn insert(&mut self, key: ArrayKey, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &ArrayKey) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_index(&self, index: i64) -> Option<&Value> {
        self.get(&ArrayKey::Index(index))
    }

    pub fn get_name(&self, name: &str) -> Option<&Value> {
        self.get(&ArrayKey::from_name(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArrayKey, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ArrayKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn into_values(self) -> impl Iterator<Item = Value> {
        self.entries.into_iter().map(|(_, v)| v)
    }

    /// True when the keys are exactly `0..len` in order.
    pub fn is_list(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .all(|(i, (key, _))| *key == ArrayKey::Index(i as i64))
    }
}

impl From<Vec<Value>> for Array {
    fn from(values: Vec<Value>) -> Self {
        values.into_iter().collect()
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut array = Array::new();
        for value in iter {
            array.push(value);
        }
        array
    }
}

impl FromIterator<(ArrayKey, Value)> for Array {
    fn from_iter<I: IntoIterator<Item = (ArrayKey, Value)>>(iter: I) -> Self {
        let mut array = Array::new();
        for (key, value) in iter {
            array.insert(key, value);
        }
        array
    }
}

// ============================================================================
// VALUES
// ============================================================================

/// A parsed annotation value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Array),
    Annotation(Box<AnnotationInstance>),
}

impl Value {
    /// Build a list array from plain values.
    pub fn list<I: IntoIterator<Item = Value>>(values: I) -> Self {
        Value::Array(values.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null, booleans, numbers and strings.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&AnnotationInstance> {
        match self {
            Value::Annotation(a) => Some(a),
            _ => None,
        }
    }

    /// Runtime type name used in diagnostics.
    pub fn type_label(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(_) => "boolean".to_string(),
            Value::Int(_) => "integer".to_string(),
            Value::Float(_) => "double".to_string(),
            Value::String(_) => "string".to_string(),
            Value::Array(_) => "array".to_string(),
            Value::Annotation(a) => format!("an instance of {}", a.type_name()),
        }
    }

    /// Convert into a JSON value. List arrays become JSON arrays, keyed arrays
    /// become objects, annotations become objects of their properties.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(a) if a.is_list() => {
                serde_json::Value::Array(a.values().map(Value::to_json).collect())
            }
            Value::Array(a) => serde_json::Value::Object(
                a.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
            Value::Annotation(a) => a.to_json(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(a) => {
                write!(f, "{{")?;
                for (i, (key, value)) in a.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match key {
                        ArrayKey::Index(_) if a.is_list() => write!(f, "{}", value)?,
                        _ => write!(f, "{}: {}", key, value)?,
                    }
                }
                write!(f, "}}")
            }
            Value::Annotation(a) => write!(f, "@{}", a.type_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

impl From<AnnotationInstance> for Value {
    fn from(a: AnnotationInstance) -> Self {
        Value::Annotation(Box::new(a))
    }
}

// ============================================================================
// ANNOTATION INSTANCES
// ============================================================================

/// A constructed annotation object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationInstance {
    type_name: String,
    properties: ValueMap,
}

impl AnnotationInstance {
    /// Create an instance with no properties set.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: ValueMap::new(),
        }
    }

    pub fn with_properties(type_name: impl Into<String>, properties: ValueMap) -> Self {
        Self {
            type_name: type_name.into(),
            properties,
        }
    }

    /// Fully-qualified type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        self.properties.get(property)
    }

    pub fn set(&mut self, property: impl Into<String>, value: Value) {
        self.properties.insert(property.into(), value);
    }

    pub fn properties(&self) -> &ValueMap {
        &self.properties
    }

    pub fn into_properties(self) -> ValueMap {
        self.properties
    }

    /// Exact type-name match.
    pub fn is(&self, type_name: &str) -> bool {
        self.type_name == type_name.trim_start_matches('\\')
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.properties
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Deserialize the properties into a caller-defined struct.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_json())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_push_uses_next_index() {
        let mut array = Array::new();
        array.insert(ArrayKey::Index(5), Value::Int(1));
        array.insert(ArrayKey::Name("a".to_string()), Value::Int(2));
        array.push(Value::Int(3));

        assert_eq!(array.get_index(6), Some(&Value::Int(3)));
        assert_eq!(array.len(), 3);
        assert!(!array.is_list());
    }

    #[test]
    fn test_array_insert_replaces_in_place() {
        let mut array = Array::new();
        array.insert(ArrayKey::from_name("x"), Value::Int(1));
        array.insert(ArrayKey::from_name("y"), Value::Int(2));
        array.insert(ArrayKey::from_name("x"), Value::Int(3));

        let keys: Vec<String> = array.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["x", "y"]);
        assert_eq!(array.get_name("x"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_array_key_from_numeric_name() {
        assert_eq!(ArrayKey::from_name("12"), ArrayKey::Index(12));
        assert_eq!(ArrayKey::from_name("012"), ArrayKey::Name("012".to_string()));
        assert_eq!(ArrayKey::from_name("-3"), ArrayKey::Index(-3));
    }

    #[test]
    fn test_value_type_labels() {
        assert_eq!(Value::Null.type_label(), "NULL");
        assert_eq!(Value::Int(1).type_label(), "integer");
        assert_eq!(Value::Float(1.5).type_label(), "double");
        assert_eq!(
            Value::from(AnnotationInstance::new("NS\\Foo")).type_label(),
            "an instance of NS\\Foo"
        );
    }

    #[test]
    fn test_value_display() {
        let list = Value::list(vec![Value::from("a"), Value::Int(2)]);
        assert_eq!(list.to_string(), "{a, 2}");

        let mut keyed = Array::new();
        keyed.insert(ArrayKey::from_name("k"), Value::Bool(true));
        assert_eq!(Value::Array(keyed).to_string(), "{k: true}");
    }

    #[test]
    fn test_deserialize_into_struct() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Route {
            path: String,
            methods: Vec<String>,
            priority: Option<i64>,
        }

        let mut instance = AnnotationInstance::new("App\\Route");
        instance.set("path", Value::from("/users"));
        instance.set(
            "methods",
            Value::list(vec![Value::from("GET"), Value::from("POST")]),
        );

        let route: Route = instance.deserialize_into().expect("deserialize route");
        assert_eq!(
            route,
            Route {
                path: "/users".to_string(),
                methods: vec!["GET".to_string(), "POST".to_string()],
                priority: None,
            }
        );
    }

    #[test]
    fn test_instance_json_round_trip() {
        let mut inner = AnnotationInstance::new("NS\\Inner");
        inner.set("x", Value::Float(2.5));
        let mut outer = AnnotationInstance::new("NS\\Outer");
        outer.set("inner", Value::from(inner));
        outer.set("flags", Value::list(vec![Value::Null, Value::Bool(false)]));

        let text = serde_json::to_string(&outer).expect("serialize");
        let back: AnnotationInstance = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, outer);
    }
}
