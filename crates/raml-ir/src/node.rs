//! Node types for the document tree

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

/// A node in the document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Ordered mapping of unique string keys
    Map(Map),

    /// Ordered list of nodes
    Sequence(Vec<Node>),

    /// Leaf value
    Scalar(Scalar),

    /// Parsed, reference-dereferenced schema
    Schema(SchemaFragment),

    /// An include whose target could not be read (carries the include file name)
    Absent(String),
}

/// Leaf values
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(Float),
    Bool(bool),
    Null,
}

/// A floating-point value together with its textual form
///
/// The text is what templates and `as_text` see, so `1.0` stays `1.0`
/// instead of collapsing to `1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Float {
    value: f64,
    text: String,
}

/// A schema produced by a schema plugin
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaFragment {
    /// Name of the plugin that produced the value (e.g. `json-schema`)
    pub format: String,

    /// Parsed value
    pub value: serde_json::Value,
}

/// Insertion-ordered map with unique string keys
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map {
    entries: Vec<(String, Node)>,
}

impl Node {
    /// Empty map node
    pub fn map() -> Self {
        Node::Map(Map::new())
    }

    /// Null scalar node
    pub fn null() -> Self {
        Node::Scalar(Scalar::Null)
    }

    /// String scalar node
    pub fn string(value: impl Into<String>) -> Self {
        Node::Scalar(Scalar::String(value.into()))
    }

    /// Short name of the variant, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Map(_) => "map",
            Node::Sequence(_) => "sequence",
            Node::Scalar(Scalar::String(_)) => "string",
            Node::Scalar(Scalar::Integer(_)) => "integer",
            Node::Scalar(Scalar::Float(_)) => "float",
            Node::Scalar(Scalar::Bool(_)) => "boolean",
            Node::Scalar(Scalar::Null) => "null",
            Node::Schema(_) => "schema",
            Node::Absent(_) => "absent",
        }
    }

    /// True for maps and sequences
    pub fn is_container(&self) -> bool {
        matches!(self, Node::Map(_) | Node::Sequence(_))
    }

    /// True when the node carries no content
    pub fn is_empty(&self) -> bool {
        match self {
            Node::Map(map) => map.is_empty(),
            Node::Sequence(items) => items.is_empty(),
            Node::Scalar(Scalar::Null) | Node::Absent(_) => true,
            Node::Scalar(_) | Node::Schema(_) => false,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Node::Absent(_))
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Borrow the value of a string scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_schema(&self) -> Option<&SchemaFragment> {
        match self {
            Node::Schema(fragment) => Some(fragment),
            _ => None,
        }
    }

    /// Look up a key when this node is a map
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map().and_then(|map| map.get(key))
    }
}

impl Scalar {
    /// Textual form of the scalar (`Null` renders as the empty string)
    pub fn as_text(&self) -> String {
        match self {
            Scalar::String(s) => s.clone(),
            Scalar::Integer(i) => i.to_string(),
            Scalar::Float(f) => f.as_str().to_string(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Null => String::new(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl Float {
    /// Float with its shortest round-tripping text (`1.0`, `0.25`)
    pub fn new(value: f64) -> Self {
        Self {
            value,
            text: format!("{:?}", value),
        }
    }

    /// Float with the text it was decoded from
    pub fn with_text(value: f64, text: impl Into<String>) -> Self {
        Self {
            value,
            text: text.into(),
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl From<f64> for Float {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl SchemaFragment {
    pub fn new(format: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            format: format.into(),
            value,
        }
    }
}

impl Map {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Insert a value, replacing an existing key in place.
    /// Returns the previous value if the key was present.
    pub fn insert(&mut self, key: impl Into<String>, value: Node) -> Option<Node> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove a key, keeping the order of the remaining entries
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Node)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Deep-merge `other` into this map.
    ///
    /// Map values present on both sides merge key by key; any other
    /// combination is overwritten by the value from `other`. Keys only
    /// present in `other` are appended.
    pub fn merge(&mut self, other: Map) {
        for (key, value) in other.entries {
            match self.get_mut(&key) {
                Some(existing) => merge_value(existing, value),
                None => self.entries.push((key, value)),
            }
        }
    }
}

/// Deep-merge `incoming` onto `existing` using the [`Map::merge`] rule
pub fn merge_value(existing: &mut Node, incoming: Node) {
    match (existing, incoming) {
        (Node::Map(base), Node::Map(overlay)) => base.merge(overlay),
        (slot, incoming) => *slot = incoming,
    }
}

impl IntoIterator for Map {
    type Item = (String, Node);
    type IntoIter = std::vec::IntoIter<(String, Node)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, Node)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl From<Map> for Node {
    fn from(map: Map) -> Self {
        Node::Map(map)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Sequence(items)
    }
}

impl From<Scalar> for Node {
    fn from(scalar: Scalar) -> Self {
        Node::Scalar(scalar)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::string(value)
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::string(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Scalar(Scalar::Integer(value))
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Scalar(Scalar::Float(Float::new(value)))
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Scalar(Scalar::Bool(value))
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Map(map) => map.serialize(serializer),
            Node::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Scalar(scalar) => scalar.serialize(serializer),
            Node::Schema(fragment) => fragment.value.serialize(serializer),
            Node::Absent(_) => serializer.serialize_unit(),
        }
    }
}

impl Serialize for Map {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            out.serialize_entry(key, value)?;
        }
        out.end()
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::String(s) => serializer.serialize_str(s),
            Scalar::Integer(i) => serializer.serialize_i64(*i),
            Scalar::Float(f) => serializer.serialize_f64(f.value()),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Null => serializer.serialize_unit(),
        }
    }
}
