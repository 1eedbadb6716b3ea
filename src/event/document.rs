use serde_json::{Map, Value};
use std::fmt;

/// Normalizes a field expression into a JSON pointer path.
///
/// Expressions already starting with `/` are used as-is; dotted field names
/// (`source.ip`) become `/source/ip`. The empty expression addresses the
/// document root.
pub fn pointer_of(field: &str) -> String {
    if field.is_empty() || field.starts_with('/') {
        return field.to_string();
    }
    let mut path = String::with_capacity(field.len() + 1);
    for segment in field.split('.') {
        path.push('/');
        path.push_str(segment);
    }
    path
}

/// Leaf and interior kinds a document node can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Null,
    Bool,
    Int,
    Double,
    String,
    Array,
    Object,
}

impl ValueType {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Number(n) if n.is_f64() => ValueType::Double,
            Value::Number(_) => ValueType::Int,
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
        }
    }
}

/// Mutable tree-structured event addressed by JSON pointer paths.
///
/// All accessors report absence with `Option`/`bool` instead of failing when
/// a path does not resolve. Setters overwrite type-mismatched nodes and
/// create missing interior nodes: named segments become object keys, decimal
/// segments become null-padded array slots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventDocument {
    root: Value,
}

impl EventDocument {
    /// Creates an empty object document.
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// Parses a raw ingress payload as a JSON document.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            root: serde_json::from_str(raw)?,
        })
    }

    /// Wraps an already-built JSON value.
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Borrows the backing JSON value.
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Consumes the document, returning the backing JSON value.
    pub fn into_value(self) -> Value {
        self.root
    }

    /// Returns true when the path resolves to any node.
    pub fn exists(&self, path: &str) -> bool {
        self.root.pointer(path).is_some()
    }

    /// Returns the node kind at the path, if present.
    pub fn value_type(&self, path: &str) -> Option<ValueType> {
        self.root.pointer(path).map(ValueType::of)
    }

    /// Returns the raw JSON subtree at the path.
    pub fn get_value(&self, path: &str) -> Option<&Value> {
        self.root.pointer(path)
    }

    /// Returns the string at the path, if the node is a string.
    pub fn get_string(&self, path: &str) -> Option<&str> {
        self.root.pointer(path).and_then(Value::as_str)
    }

    /// Returns the integer at the path, if the node is an integer.
    pub fn get_int(&self, path: &str) -> Option<i64> {
        self.root
            .pointer(path)
            .filter(|v| !matches!(v, Value::Number(n) if n.is_f64()))
            .and_then(Value::as_i64)
    }

    /// Returns the double at the path, if the node is a float.
    pub fn get_double(&self, path: &str) -> Option<f64> {
        self.root
            .pointer(path)
            .filter(|v| matches!(v, Value::Number(n) if n.is_f64()))
            .and_then(Value::as_f64)
    }

    /// Returns the boolean at the path, if the node is a boolean.
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.root.pointer(path).and_then(Value::as_bool)
    }

    /// Returns the array elements at the path, if the node is an array.
    pub fn get_array(&self, path: &str) -> Option<&Vec<Value>> {
        self.root.pointer(path).and_then(Value::as_array)
    }

    pub fn is_string(&self, path: &str) -> bool {
        matches!(self.value_type(path), Some(ValueType::String))
    }

    pub fn is_int(&self, path: &str) -> bool {
        matches!(self.value_type(path), Some(ValueType::Int))
    }

    pub fn is_double(&self, path: &str) -> bool {
        matches!(self.value_type(path), Some(ValueType::Double))
    }

    pub fn is_object(&self, path: &str) -> bool {
        matches!(self.value_type(path), Some(ValueType::Object))
    }

    pub fn is_array(&self, path: &str) -> bool {
        matches!(self.value_type(path), Some(ValueType::Array))
    }

    /// Writes a value at the path, creating missing interior nodes.
    pub fn set(&mut self, path: &str, value: Value) {
        if path.is_empty() {
            self.root = value;
            return;
        }
        *ensure_path(&mut self.root, path) = value;
    }

    /// Writes a string at the path.
    pub fn set_string(&mut self, path: &str, value: impl Into<String>) {
        self.set(path, Value::String(value.into()));
    }

    /// Writes an integer at the path.
    pub fn set_int(&mut self, path: &str, value: i64) {
        self.set(path, Value::from(value));
    }

    /// Removes the node at the path. Returns false when nothing resolved.
    pub fn erase(&mut self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        let (parent_path, last) = match path.rfind('/') {
            Some(idx) => (&path[..idx], &path[idx + 1..]),
            None => return false,
        };
        let key = unescape_segment(last);
        let parent = if parent_path.is_empty() {
            Some(&mut self.root)
        } else {
            self.root.pointer_mut(parent_path)
        };
        match parent {
            Some(Value::Object(map)) => map.remove(&key).is_some(),
            Some(Value::Array(items)) => match key.parse::<usize>() {
                Ok(idx) if idx < items.len() => {
                    items.remove(idx);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Appends a value to the array at the path. A missing or non-array node
    /// is replaced by an empty array first.
    pub fn append(&mut self, path: &str, value: Value) {
        let node = ensure_path(&mut self.root, path);
        if !node.is_array() {
            *node = Value::Array(Vec::new());
        }
        if let Some(items) = node.as_array_mut() {
            items.push(value);
        }
    }

    /// Merges the subtree at `source_path` into `target_path`.
    ///
    /// Both nodes must exist and share the same kind, which must be object or
    /// array: objects union their keys with the source winning conflicts,
    /// arrays concatenate. Returns false when the precondition fails, leaving
    /// the document untouched.
    pub fn merge(&mut self, source_path: &str, target_path: &str) -> bool {
        let source = match self.root.pointer(source_path) {
            Some(node) => node.clone(),
            None => return false,
        };
        let target = match self.root.pointer_mut(target_path) {
            Some(node) => node,
            None => return false,
        };
        match (target, source) {
            (Value::Object(target_map), Value::Object(source_map)) => {
                for (key, value) in source_map {
                    target_map.insert(key, value);
                }
                true
            }
            (Value::Array(target_items), Value::Array(source_items)) => {
                target_items.extend(source_items);
                true
            }
            _ => false,
        }
    }
}

impl fmt::Display for EventDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn ensure_path<'a>(root: &'a mut Value, path: &str) -> &'a mut Value {
    let mut node = root;
    for raw in path.split('/').skip(1) {
        let segment = unescape_segment(raw);
        node = match segment.parse::<usize>() {
            Ok(idx) => {
                if !node.is_array() {
                    *node = Value::Array(Vec::new());
                }
                let items = node.as_array_mut().expect("node was just made an array");
                if items.len() <= idx {
                    items.resize(idx + 1, Value::Null);
                }
                &mut items[idx]
            }
            Err(_) => {
                if !node.is_object() {
                    *node = Value::Object(Map::new());
                }
                node.as_object_mut()
                    .expect("node was just made an object")
                    .entry(segment)
                    .or_insert(Value::Null)
            }
        };
    }
    node
}
