//! Parser configuration options

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration for a [`Parser`](crate::Parser)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Parse embedded and included schemas (default: true).
    /// When false, non-structured includes are kept as raw text.
    pub parse_schemas: bool,

    /// File extensions always decoded as structured documents
    /// (default: yaml, yml, raml, rml)
    pub structured_extensions: Vec<String>,
}

impl ParserConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable schema parsing
    pub fn parse_schemas(mut self, enabled: bool) -> Self {
        self.parse_schemas = enabled;
        self
    }

    /// Replace the list of structured-document extensions
    pub fn structured_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.structured_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Whether files with this extension are decoded as documents
    pub fn is_structured(&self, extension: &str) -> bool {
        self.structured_extensions
            .iter()
            .any(|known| known.eq_ignore_ascii_case(extension))
    }

    /// Load a configuration from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::Config(format!("YAML parse error: {}", e)))
    }

    /// Load a configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            parse_schemas: true,
            structured_extensions: ["yaml", "yml", "raml", "rml"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}
