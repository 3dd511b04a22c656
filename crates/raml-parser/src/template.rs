//! `<<variable>>` substitution in trait and resource-type bodies

use raml_ir::{Map, Node, Scalar};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::trace;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<<([^<>]*)>>").expect("token pattern is valid"));

/// Variable name to replacement text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: BTreeMap<String, String>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect scalar entries of a binding map; other values are skipped
    pub fn from_node(node: &Node) -> Self {
        let mut bindings = Self::new();
        if let Some(map) = node.as_map() {
            for (name, value) in map.iter() {
                match value {
                    Node::Scalar(scalar) => bindings.insert(name, scalar.as_text()),
                    other => trace!("Ignoring non-scalar binding {} ({})", name, other.kind()),
                }
            }
        }
        bindings
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Replace bound `<<name>>` tokens in `text`; unbound tokens are kept verbatim
pub fn substitute<'t>(text: &'t str, bindings: &Bindings) -> Cow<'t, str> {
    if !text.contains("<<") {
        return Cow::Borrowed(text);
    }
    TOKEN.replace_all(text, |caps: &Captures<'_>| match bindings.get(&caps[1]) {
        Some(value) => value.to_string(),
        None => caps[0].to_string(),
    })
}

/// Copy of `body` with every string scalar and map key substituted
pub fn apply_variables(bindings: &Bindings, body: &Node) -> Node {
    match body {
        Node::Map(map) => {
            let mut out = Map::new();
            for (key, value) in map.iter() {
                out.insert(substitute(key, bindings), apply_variables(bindings, value));
            }
            Node::Map(out)
        }
        Node::Sequence(items) => Node::Sequence(
            items
                .iter()
                .map(|item| apply_variables(bindings, item))
                .collect(),
        ),
        Node::Scalar(Scalar::String(text)) => Node::string(substitute(text, bindings)),
        other => other.clone(),
    }
}
