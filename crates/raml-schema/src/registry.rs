//! Schema parser capability trait and ordered registry

use crate::json::JsonSchemaParser;
use crate::Result;
use raml_ir::{FileSystem, Node, SchemaFragment};
use std::fmt;
use std::path::Path;
use tracing::trace;

/// A plugin able to recognize and parse one schema language
pub trait SchemaParser: Send + Sync {
    /// Stable plugin name, recorded on every fragment it produces
    fn name(&self) -> &str;

    /// Whether an included file at `path` is handled by this plugin
    fn can_parse_file(&self, path: &Path) -> bool;

    /// Whether a tree value is an inline schema this plugin understands
    fn can_parse_inline(&self, value: &Node) -> bool;

    /// Parse a schema file, resolving references relative to its directory
    ///
    /// # Errors
    ///
    /// Returns an error when the file is unreadable, malformed, or references
    /// something that cannot be resolved.
    fn parse_file(&self, path: &Path, fs: &dyn FileSystem) -> Result<SchemaFragment>;

    /// Parse an inline schema, resolving references relative to `base_dir`
    ///
    /// # Errors
    ///
    /// Returns an error when the text is malformed or references something
    /// that cannot be resolved.
    fn parse_inline(
        &self,
        text: &str,
        base_dir: &Path,
        fs: &dyn FileSystem,
    ) -> Result<SchemaFragment>;
}

/// Ordered set of schema parsers; first match wins
pub struct SchemaParserRegistry {
    parsers: Vec<Box<dyn SchemaParser>>,
}

impl SchemaParserRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Registry holding the built-in JSON Schema parser
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(JsonSchemaParser::new());
        registry
    }

    /// Append a parser; it is consulted after every parser registered before it
    pub fn register(&mut self, parser: impl SchemaParser + 'static) -> &mut Self {
        self.parsers.push(Box::new(parser));
        self
    }

    /// First parser claiming the file at `path`
    pub fn for_file(&self, path: &Path) -> Option<&dyn SchemaParser> {
        let parser = self
            .parsers
            .iter()
            .find(|parser| parser.can_parse_file(path))
            .map(|parser| &**parser);
        if let Some(parser) = parser {
            trace!("Schema parser '{}' claims file {:?}", parser.name(), path);
        }
        parser
    }

    /// First parser claiming an inline value
    pub fn for_inline(&self, value: &Node) -> Option<&dyn SchemaParser> {
        self.parsers
            .iter()
            .find(|parser| parser.can_parse_inline(value))
            .map(|parser| &**parser)
    }

    /// Names of the registered parsers, in dispatch order
    pub fn names(&self) -> Vec<&str> {
        self.parsers.iter().map(|parser| parser.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl Default for SchemaParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for SchemaParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaParserRegistry")
            .field("parsers", &self.names())
            .finish()
    }
}
