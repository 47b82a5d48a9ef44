//! Read-only view over a parsed JSONC document
//!
//! tree-sitter-json accepts `//` and `/* */` comments as extras, which gives us
//! byte-accurate spans for every value while leaving comments untouched.

use serde_json::{Map, Value};
use tracing::warn;
use tree_sitter::{Node, Tree};

use crate::error::Error;
use crate::jsonc::path::Segment;

pub struct JsoncDocument<'a> {
    text: &'a str,
    tree: Tree,
}

impl<'a> JsoncDocument<'a> {
    /// Parse `text`, failing with [`Error::MalformedDocument`] on any syntax error
    ///
    /// A lone trailing comma inside an object or array is tolerated.
    pub fn parse(text: &'a str) -> Result<Self, Error> {
        let mut parser = tree_sitter::Parser::new();
        let language = tree_sitter_json::LANGUAGE;
        parser.set_language(&language.into()).map_err(|e| {
            warn!("Failed to set JSON language for tree-sitter: {}", e);
            Error::malformed(e.to_string())
        })?;

        let tree = parser.parse(text, None).ok_or_else(|| {
            warn!("Failed to parse JSONC content");
            Error::malformed("Failed to parse JSONC")
        })?;

        if let Some(reason) = find_syntax_error(tree.root_node(), text) {
            return Err(Error::malformed(reason));
        }

        let values = {
            let root = tree.root_node();
            let mut cursor = root.walk();
            root.children(&mut cursor)
                .filter(|node| is_value(*node))
                .count()
        };
        if values > 1 {
            return Err(Error::malformed("more than one top-level value"));
        }

        Ok(Self { text, tree })
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// The single top-level value, if the document has one
    pub fn root_value(&self) -> Option<Node<'_>> {
        let root = self.tree.root_node();
        let mut cursor = root.walk();
        root.children(&mut cursor).find(|node| is_value(*node))
    }

    /// Locate the value node at `path`
    pub fn find(&self, path: &[Segment]) -> Option<Node<'_>> {
        path.iter()
            .try_fold(self.root_value()?, |node, segment| self.child(node, segment))
    }

    /// Step from a container node to the value addressed by `segment`
    ///
    /// Duplicate keys resolve to the last occurrence.
    pub fn child<'t>(&self, node: Node<'t>, segment: &Segment) -> Option<Node<'t>> {
        match (node.kind(), segment) {
            ("object", Segment::Key(key)) => pairs(node)
                .into_iter()
                .filter(|pair| self.pair_key(*pair).as_deref() == Some(key.as_str()))
                .last()
                .and_then(|pair| pair.child_by_field_name("value")),
            ("array", Segment::Index(index)) => elements(node).get(*index).copied(),
            _ => None,
        }
    }

    /// Decoded key of a `pair` node
    pub fn pair_key(&self, pair: Node<'_>) -> Option<String> {
        let key = pair.child_by_field_name("key")?;
        serde_json::from_str::<String>(&self.text[key.byte_range()]).ok()
    }

    /// Decode the value at `path` into a [`Value`]
    pub fn value_at(&self, path: &[Segment]) -> Result<Option<Value>, Error> {
        self.find(path).map(|node| self.to_value(node)).transpose()
    }

    /// Decode a value node (and everything below it) into a [`Value`]
    pub fn to_value(&self, node: Node<'_>) -> Result<Value, Error> {
        let raw = &self.text[node.byte_range()];
        match node.kind() {
            "object" => {
                let mut map = Map::new();
                for pair in pairs(node) {
                    let (Some(key), Some(value)) =
                        (self.pair_key(pair), pair.child_by_field_name("value"))
                    else {
                        continue;
                    };
                    map.insert(key, self.to_value(value)?);
                }
                Ok(Value::Object(map))
            }
            "array" => elements(node)
                .into_iter()
                .map(|element| self.to_value(element))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            "string" | "number" | "true" | "false" | "null" => serde_json::from_str(raw)
                .map_err(|e| Error::malformed(format!("invalid {} {raw:?}: {e}", node.kind()))),
            other => Err(Error::malformed(format!("unexpected node {other}"))),
        }
    }
}

/// Parse a JSONC text straight into a [`Value`]; `None` for an empty document
pub fn parse_value(text: &str) -> Result<Option<Value>, Error> {
    let document = JsoncDocument::parse(text)?;
    document
        .root_value()
        .map(|root| document.to_value(root))
        .transpose()
}

/// Value-bearing children: not punctuation, not comments, not recovered errors
pub(crate) fn is_value(node: Node<'_>) -> bool {
    node.is_named() && !node.is_extra() && !node.is_error()
}

pub(crate) fn pairs(object: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = object.walk();
    object
        .children(&mut cursor)
        .filter(|node| node.kind() == "pair")
        .collect()
}

pub(crate) fn elements(array: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = array.walk();
    array
        .children(&mut cursor)
        .filter(|node| is_value(*node))
        .collect()
}

fn find_syntax_error(node: Node<'_>, text: &str) -> Option<String> {
    let line = node.start_position().row + 1;
    if node.is_missing() {
        return Some(format!("missing {} at line {line}", node.kind()));
    }
    if node.is_error() {
        let snippet = text[node.byte_range()].trim();
        if snippet == "," {
            return None;
        }
        let snippet: String = snippet.chars().take(40).collect();
        return Some(format!("unexpected {snippet:?} at line {line}"));
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find_map(|child| find_syntax_error(child, text))
}
