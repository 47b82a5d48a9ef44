//! Key paths and edits addressed to a JSONC document

use std::fmt;

use serde_json::Value;

/// One step of a key path: an object key or an array index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => write!(f, "{key}"),
            Segment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Build a key path made only of object keys
pub fn key_path(keys: &[&str]) -> Vec<Segment> {
    keys.iter().map(|&key| Segment::from(key)).collect()
}

/// A single targeted change: set the value at `path`, or remove it when `value` is `None`
#[derive(Debug, Clone, PartialEq)]
pub struct JsonEdit {
    pub path: Vec<Segment>,
    pub value: Option<Value>,
}

impl JsonEdit {
    pub fn set(path: Vec<Segment>, value: Value) -> Self {
        Self {
            path,
            value: Some(value),
        }
    }

    pub fn remove(path: Vec<Segment>) -> Self {
        Self { path, value: None }
    }

    /// Dotted rendering of the path, for logs
    pub fn path_display(&self) -> String {
        self.path
            .iter()
            .map(Segment::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Wrap `value` in the objects/arrays named by `segments`, innermost last
pub(crate) fn nest(segments: &[Segment], value: Value) -> Value {
    segments.iter().rev().fold(value, |inner, segment| match segment {
        Segment::Key(key) => {
            let mut map = serde_json::Map::new();
            map.insert(key.clone(), inner);
            Value::Object(map)
        }
        Segment::Index(_) => Value::Array(vec![inner]),
    })
}
