//! Structured-document decoding into the generic tree

use crate::include::INCLUDE_MARKER;
use crate::{Error, Result};
use raml_ir::{Float, Map, Node, Scalar};
use serde_yaml::Value;
use std::path::Path;
use tracing::trace;

/// Turns document text into a [`Node`] tree
pub trait DocumentDecoder: Send + Sync {
    /// Decode `text`; `origin` names the source in error messages
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] when the text is not a well-formed document.
    fn decode(&self, text: &str, origin: &Path) -> Result<Node>;
}

/// YAML decoder (RAML documents are YAML)
///
/// A `!include path` tag becomes the scalar `"!include path"`, so tagged
/// and quoted include directives are handled the same way downstream.
/// Other tags are dropped and their value kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDecoder;

impl YamlDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentDecoder for YamlDecoder {
    fn decode(&self, text: &str, origin: &Path) -> Result<Node> {
        trace!("Decoding YAML from {:?}", origin);
        let value: Value = serde_yaml::from_str(text)
            .map_err(|e| Error::decode(origin.display().to_string(), e.to_string()))?;
        Ok(convert(value))
    }
}

fn convert(value: Value) -> Node {
    match value {
        Value::Null => Node::null(),
        Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
        Value::Number(n) => Node::Scalar(number(&n)),
        Value::String(s) => Node::string(s),
        Value::Sequence(items) => Node::Sequence(items.into_iter().map(convert).collect()),
        Value::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                map.insert(key_text(&key), convert(value));
            }
            Node::Map(map)
        }
        Value::Tagged(tagged) => {
            if tagged.tag == "include" {
                let target = match convert(tagged.value) {
                    Node::Scalar(scalar) => scalar.as_text(),
                    other => return other,
                };
                Node::string(format!("{}{}", INCLUDE_MARKER, target.trim()))
            } else {
                convert(tagged.value)
            }
        }
    }
}

fn number(n: &serde_yaml::Number) -> Scalar {
    if let Some(i) = n.as_i64() {
        Scalar::Integer(i)
    } else if let Some(f) = n.as_f64() {
        Scalar::Float(Float::with_text(f, n.to_string()))
    } else {
        Scalar::String(n.to_string())
    }
}

/// Map keys are strings in the tree; `200:` becomes `"200"`
fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Tagged(tagged) => key_text(&tagged.value),
        complex => serde_yaml::to_string(complex)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(text: &str) -> Node {
        YamlDecoder::new().decode(text, Path::new("test.raml")).unwrap()
    }

    #[test]
    fn test_decode_scalars_and_order() {
        let node = decode("title: API\nversion: 1\nratio: 0.5\nbeta: true\nnothing: ~\n");
        let map = node.as_map().unwrap();

        assert_eq!(
            map.keys().collect::<Vec<_>>(),
            vec!["title", "version", "ratio", "beta", "nothing"]
        );
        assert_eq!(map.get("version"), Some(&Node::from(1)));
        assert_eq!(map.get("ratio"), Some(&Node::from(0.5)));
        assert_eq!(map.get("beta"), Some(&Node::from(true)));
        assert_eq!(map.get("nothing"), Some(&Node::null()));
    }

    #[test]
    fn test_decode_whole_floats_keep_fraction() {
        let node = decode("version: 1.0\nlimit: 2.0\n");
        let version = node.get("version").and_then(Node::as_scalar).unwrap();
        assert_eq!(version.as_text(), "1.0");
        assert_eq!(node.get("limit"), Some(&Node::from(2.0)));
    }

    #[test]
    fn test_decode_numeric_keys() {
        let node = decode("responses:\n  200:\n    description: ok\n");
        assert!(node.get("responses").and_then(|r| r.get("200")).is_some());
    }

    #[test]
    fn test_decode_include_tag() {
        let node = decode("schema: !include schemas/user.json\n");
        assert_eq!(node.get("schema"), Some(&Node::from("!include schemas/user.json")));
    }

    #[test]
    fn test_decode_quoted_include_kept() {
        let node = decode("schema: \"!include user.json\"\n");
        assert_eq!(node.get("schema"), Some(&Node::from("!include user.json")));
    }

    #[test]
    fn test_decode_other_tags_dropped() {
        let node = decode("value: !custom 42\n");
        assert_eq!(node.get("value"), Some(&Node::from(42)));
    }

    #[test]
    fn test_decode_empty_document() {
        assert!(decode("").is_empty());
        assert!(decode("#%RAML 0.8\n").is_empty());
    }

    #[test]
    fn test_decode_error_carries_origin() {
        let err = YamlDecoder::new()
            .decode("title: [unclosed", Path::new("broken.raml"))
            .unwrap_err();
        match err {
            Error::Decode { path, .. } => assert_eq!(path, "broken.raml"),
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }
}
