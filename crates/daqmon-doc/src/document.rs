//! ---
//! daq_section: "01-hierarchical-document"
//! daq_subsection: "module"
//! daq_type: "source"
//! daq_scope: "code"
//! daq_description: "Dotted-path document tree with repeated-child support."
//! daq_version: "v0.0.0-prealpha"
//! daq_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::scalar::{FromScalar, ToScalar};
use crate::{DocError, Result};

/// Separator character used in dotted node paths.
pub const PATH_SEPARATOR: char = '.';

/// A mutable tree of named nodes addressed by dotted paths.
///
/// Intermediate nodes are created on write. Scalar reads never fail: an
/// absent path or a type mismatch yields the caller's default. Repeated
/// children (`rules.rule`, `users.user`) are stored as an array under the
/// repeated name and iterated back as one `(name, node)` pair per element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Value);

impl Default for Document {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the scalar at `path`, falling back to `default` on absence or
    /// type mismatch.
    pub fn get<T: FromScalar>(&self, path: &str, default: T) -> T {
        walk(&self.0, path).and_then(T::from_scalar).unwrap_or(default)
    }

    /// Write a scalar at `path`, overwriting any existing node.
    pub fn put<T: ToScalar>(&mut self, path: &str, value: T) {
        *ensure_node(&mut self.0, path) = value.to_scalar();
    }

    /// Borrow the node at `path`, if present.
    pub fn child(&self, path: &str) -> Option<Node<'_>> {
        walk(&self.0, path).map(Node)
    }

    /// Iterate the direct children of the node at `path`.
    ///
    /// An absent path yields no children rather than an error.
    pub fn children(&self, path: &str) -> Vec<(&str, Node<'_>)> {
        self.child(path).map(|node| node.children()).unwrap_or_default()
    }

    /// Replace the subtree at `path` with `child`.
    pub fn put_child(&mut self, path: &str, child: Document) {
        *ensure_node(&mut self.0, path) = child.0;
    }

    /// Append one repeated child node at `path`.
    pub fn add_child(&mut self, path: &str, child: Document) {
        self.push_value(path, child.0);
    }

    /// Append one repeated unnamed scalar at `path`.
    pub fn add_scalar<T: ToScalar>(&mut self, path: &str, value: T) {
        self.push_value(path, value.to_scalar());
    }

    fn push_value(&mut self, path: &str, value: Value) {
        let node = ensure_node(&mut self.0, path);
        match node {
            Value::Array(items) => items.push(value),
            Value::Null => *node = Value::Array(vec![value]),
            other => {
                let existing = other.take();
                *other = Value::Array(vec![existing, value]);
            }
        }
    }

    /// Join a caller-supplied map key onto `root`, validating the key first.
    ///
    /// Keys that are empty or contain [`PATH_SEPARATOR`] would corrupt the
    /// tree structure, so they are rejected before any write happens.
    pub fn join(root: &str, key: &str) -> Result<String> {
        Self::validate_key(key)?;
        Ok(format!("{root}{PATH_SEPARATOR}{key}"))
    }

    /// Check that `key` is usable as a single path segment.
    pub fn validate_key(key: &str) -> Result<()> {
        if key.is_empty() || key.contains(PATH_SEPARATOR) {
            return Err(DocError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(())
    }

    /// Borrow the raw tree value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Encode the document into compact wire bytes.
    pub fn to_wire(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(&self.0)?)
    }

    /// Decode a document from wire bytes.
    pub fn from_wire(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_cbor::from_slice(bytes)?;
        if !value.is_object() {
            return Err(DocError::MalformedRoot);
        }
        Ok(Self(value))
    }

    /// Render the document as JSON text, for diagnostics and logs.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }

    /// Parse a document from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(DocError::MalformedRoot);
        }
        Ok(Self(value))
    }
}

/// Borrowed view of one node inside a [`Document`].
#[derive(Debug, Clone, Copy)]
pub struct Node<'a>(&'a Value);

impl<'a> Node<'a> {
    /// Read the scalar at `path` below this node, with `default` fallback.
    pub fn get<T: FromScalar>(&self, path: &str, default: T) -> T {
        walk(self.0, path).and_then(T::from_scalar).unwrap_or(default)
    }

    /// Read this node itself as a scalar.
    pub fn as_scalar<T: FromScalar>(&self) -> Option<T> {
        T::from_scalar(self.0)
    }

    /// Iterate the direct children of this node.
    ///
    /// Object entries yield one `(name, node)` pair each; an array stored
    /// under a name (repeated children) is flattened to one pair per
    /// element; a bare array yields unnamed `("", node)` pairs. Scalar
    /// nodes have no children.
    pub fn children(&self) -> Vec<(&'a str, Node<'a>)> {
        let mut pairs = Vec::new();
        match self.0 {
            Value::Object(map) => {
                for (name, value) in map {
                    match value {
                        Value::Array(items) => {
                            pairs.extend(items.iter().map(|item| (name.as_str(), Node(item))));
                        }
                        other => pairs.push((name.as_str(), Node(other))),
                    }
                }
            }
            Value::Array(items) => {
                pairs.extend(items.iter().map(|item| ("", Node(item))));
            }
            _ => {}
        }
        pairs
    }

    /// Borrow the raw tree value.
    pub fn value(&self) -> &'a Value {
        self.0
    }
}

fn walk<'a>(mut node: &'a Value, path: &str) -> Option<&'a Value> {
    for segment in path.split(PATH_SEPARATOR) {
        node = node.as_object()?.get(segment)?;
    }
    Some(node)
}

fn ensure_node<'a>(mut node: &'a mut Value, path: &str) -> &'a mut Value {
    for segment in path.split(PATH_SEPARATOR) {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(map) = node else {
            unreachable!()
        };
        node = map.entry(segment.to_string()).or_insert(Value::Null);
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn put_creates_intermediate_nodes() {
        let mut doc = Document::new();
        doc.put("status.run.number", 42u32);
        assert_eq!(doc.as_value(), &json!({"status": {"run": {"number": 42}}}));
        assert_eq!(doc.get("status.run.number", 0u32), 42);
    }

    #[test]
    fn get_falls_back_on_absence_and_mismatch() {
        let mut doc = Document::new();
        doc.put("host", "daq01");
        assert_eq!(doc.get("port", 31415u16), 31415);
        assert_eq!(doc.get("host", 0u32), 0);
        assert_eq!(doc.get("host", String::new()), "daq01");
    }

    #[test]
    fn repeated_children_flatten_in_order() {
        let mut doc = Document::new();
        for expr in ["a > 1", "b > 2"] {
            let mut child = Document::new();
            child.put("expr", expr);
            doc.add_child("rules.rule", child);
        }

        let rules = doc.children("rules");
        assert_eq!(rules.len(), 2);
        assert!(rules.iter().all(|(name, _)| *name == "rule"));
        assert_eq!(rules[0].1.get("expr", String::new()), "a > 1");
        assert_eq!(rules[1].1.get("expr", String::new()), "b > 2");
    }

    #[test]
    fn unnamed_scalar_children_iterate_with_empty_name() {
        let mut doc = Document::new();
        doc.add_scalar("facts", "beam_on");
        doc.add_scalar("facts", "sms_connected");

        let facts = doc.children("facts");
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].0, "");
        assert_eq!(facts[1].1.as_scalar::<String>().as_deref(), Some("sms_connected"));
    }

    #[test]
    fn absent_paths_iterate_empty() {
        let doc = Document::new();
        assert!(doc.child("missing").is_none());
        assert!(doc.children("missing.section").is_empty());
    }

    #[test]
    fn put_child_overwrites_subtree() {
        let mut doc = Document::new();
        doc.put("errors.old", "stale");
        doc.put_child("errors", Document::new());
        assert!(doc.children("errors").is_empty());
    }

    #[test]
    fn join_rejects_separator_and_empty_keys() {
        assert!(matches!(
            Document::join("pvs", "chopper.speed"),
            Err(DocError::InvalidKey { .. })
        ));
        assert!(matches!(
            Document::join("pvs", ""),
            Err(DocError::InvalidKey { .. })
        ));
        assert_eq!(Document::join("pvs", "chopper_speed").unwrap(), "pvs.chopper_speed");
    }

    #[test]
    fn wire_bytes_round_trip() {
        let mut doc = Document::new();
        doc.put("recording", true);
        doc.put("run_number", 4821u32);

        let bytes = doc.to_wire().expect("encode wire bytes");
        let back = Document::from_wire(&bytes).expect("decode wire bytes");
        assert_eq!(doc, back);
    }

    #[test]
    fn json_text_round_trip() {
        let doc = Document::from_json_str(r#"{"paused": "true"}"#).expect("parse json");
        assert!(doc.get("paused", false));
        let text = doc.to_json_string().expect("render json");
        assert_eq!(Document::from_json_str(&text).expect("reparse"), doc);
    }

    #[test]
    fn scalar_wire_root_is_rejected() {
        let bytes = serde_cbor::to_vec(&json!(17)).expect("encode scalar");
        assert!(matches!(Document::from_wire(&bytes), Err(DocError::MalformedRoot)));
    }
}
