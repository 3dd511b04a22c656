//! Root parser: runs the resolution pipeline for one document

use crate::cache::IncludeCache;
use crate::config::ParserConfig;
use crate::decoder::{DocumentDecoder, YamlDecoder};
use crate::include::IncludeResolver;
use crate::inherit::{DefinitionKind, DefinitionTable, apply_to_resources};
use crate::model::ApiDefinition;
use crate::{Error, Result};
use raml_ir::{FileSystem, LocalFileSystem, Map, Node, try_for_each_leaf_mut};
use raml_schema::{SchemaParser, SchemaParserRegistry};
use std::path::Path;
use tracing::{debug, info, trace};

/// Resolves RAML documents
///
/// A parser owns its include cache, so independent parses running in
/// parallel each need their own `Parser`.
pub struct Parser {
    config: ParserConfig,
    fs: Box<dyn FileSystem>,
    decoder: Box<dyn DocumentDecoder>,
    schemas: SchemaParserRegistry,
    cache: IncludeCache,
}

impl Parser {
    /// Parser reading from the local filesystem with the default schema parsers
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
            fs: Box::new(LocalFileSystem),
            decoder: Box::new(YamlDecoder::new()),
            schemas: SchemaParserRegistry::with_defaults(),
            cache: IncludeCache::new(),
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_file_system(mut self, fs: impl FileSystem + 'static) -> Self {
        self.fs = Box::new(fs);
        self
    }

    pub fn with_decoder(mut self, decoder: impl DocumentDecoder + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    /// Replace the schema parser registry
    pub fn with_schema_parsers(mut self, schemas: SchemaParserRegistry) -> Self {
        self.schemas = schemas;
        self
    }

    /// Append a schema parser after the ones already registered
    pub fn register_schema_parser(&mut self, parser: impl SchemaParser + 'static) -> &mut Self {
        self.schemas.register(parser);
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn schema_parsers(&self) -> &SchemaParserRegistry {
        &self.schemas
    }

    /// Include cache of the most recent parse
    pub fn cache(&self) -> &IncludeCache {
        &self.cache
    }

    /// Parse a document using the configured schema-parsing flag
    pub fn parse(&mut self, path: impl AsRef<Path>) -> Result<ApiDefinition> {
        let parse_schemas = self.config.parse_schemas;
        self.parse_with(path, parse_schemas)
    }

    /// Parse a document, overriding the schema-parsing flag
    pub fn parse_with(
        &mut self,
        path: impl AsRef<Path>,
        parse_schemas: bool,
    ) -> Result<ApiDefinition> {
        let path = path.as_ref();
        let path_text = path.display().to_string();

        if !self.fs.is_file(path) {
            return Err(Error::file_not_found(path_text));
        }
        info!("Parsing RAML document: {}", path_text);

        self.cache.clear();
        let root_dir = path.parent().unwrap_or(Path::new(""));

        let bytes = self
            .fs
            .read(path)
            .map_err(|_| Error::file_not_found(path_text.clone()))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| Error::decode(path_text.clone(), e.to_string()))?;
        let decoded = self.decoder.decode(&text, path)?;
        if decoded.is_empty() {
            return Err(Error::empty_document(path_text));
        }

        let resolved = IncludeResolver::new(
            self.fs.as_ref(),
            self.decoder.as_ref(),
            &self.schemas,
            &self.config,
            &mut self.cache,
        )
        .parse_schemas(parse_schemas)
        .resolve(decoded, root_dir)?;
        if resolved.is_empty() {
            return Err(Error::empty_document(path_text));
        }
        debug!(
            "Resolved includes for {} ({} cached, {} hits)",
            path_text,
            self.cache.len(),
            self.cache.hits()
        );

        let mut root = match resolved {
            Node::Map(mut map) => {
                apply_definitions(&mut map, DefinitionKind::Trait)?;
                apply_definitions(&mut map, DefinitionKind::ResourceType)?;
                Node::Map(map)
            }
            other => other,
        };

        if parse_schemas {
            self.parse_inline_schemas(&mut root, root_dir)?;
        }

        info!("Parsed RAML document: {}", path_text);
        Ok(ApiDefinition::new(root))
    }

    /// Replace every leaf claimed by a schema parser with its parsed form
    fn parse_inline_schemas(&self, root: &mut Node, root_dir: &Path) -> Result<()> {
        let schemas = &self.schemas;
        let fs = self.fs.as_ref();

        try_for_each_leaf_mut(root, &mut |leaf: &mut Node| -> Result<()> {
            let Node::Scalar(scalar) = &*leaf else {
                return Ok(());
            };
            let Some(parser) = schemas.for_inline(leaf) else {
                return Ok(());
            };
            trace!("Schema parser '{}' claims inline value", parser.name());
            let fragment = parser.parse_inline(&scalar.as_text(), root_dir, fs)?;
            *leaf = Node::Schema(fragment);
            Ok(())
        })
    }
}

fn apply_definitions(root: &mut Map, kind: DefinitionKind) -> Result<()> {
    let Some(collection) = root.get(kind.collection_key()) else {
        return Ok(());
    };
    let table = DefinitionTable::from_collection(kind, collection);
    debug!("Applying {} {} definitions", table.len(), kind);
    apply_to_resources(root, &table)
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raml_ir::MemoryFileSystem;

    fn parser(fs: MemoryFileSystem) -> Parser {
        Parser::new().with_file_system(fs)
    }

    #[test]
    fn test_missing_root_file() {
        let err = parser(MemoryFileSystem::new()).parse("api/root.raml").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let fs = MemoryFileSystem::new().with_file("api/root.raml", "title: x\n");
        let err = parser(fs).parse("api").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_empty_document() {
        let fs = MemoryFileSystem::new().with_file("root.raml", "#%RAML 0.8\n");
        let err = parser(fs).parse("root.raml").unwrap_err();
        assert!(matches!(err, Error::EmptyDocument { .. }));
    }

    #[test]
    fn test_document_of_only_missing_include_is_empty() {
        let fs = MemoryFileSystem::new().with_file("root.raml", "!include nowhere.raml\n");
        let err = parser(fs).parse("root.raml").unwrap_err();
        assert!(matches!(err, Error::EmptyDocument { .. }));
    }

    #[test]
    fn test_pipeline_order() {
        let fs = MemoryFileSystem::new()
            .with_file(
                "api/root.raml",
                "title: T\ntraits: !include traits.raml\nresourceTypes:\n  - base:\n      get:\n        is: [paged]\n/items:\n  type: base\n  post:\n    is: [paged]\n",
            )
            .with_file(
                "api/traits.raml",
                "- paged:\n    queryParameters:\n      page: {type: integer}\n",
            );
        let api = parser(fs).parse("api/root.raml").unwrap();
        let items = api.resource("/items").unwrap();

        // traits run before resource types, so `is` inside a type body stays
        assert!(items.method("get").and_then(|g| g.get("is")).is_some());
        assert!(
            items
                .method("post")
                .and_then(|p| p.get("queryParameters"))
                .is_some()
        );
    }

    #[test]
    fn test_inline_schema_sweep_toggle() {
        let fs = MemoryFileSystem::new().with_file(
            "root.raml",
            "title: T\n/a:\n  post:\n    body:\n      application/json:\n        schema: '{\"type\": \"object\"}'\n",
        );
        let mut parser = parser(fs);

        let parsed = parser.parse("root.raml").unwrap();
        let schema = raml_ir::Cursor::new(parsed.root())
            .navigate(&["/a", "post", "body", "application/json", "schema"])
            .unwrap();
        assert!(schema.node().as_schema().is_some());

        let raw = parser.parse_with("root.raml", false).unwrap();
        let schema = raml_ir::Cursor::new(raw.root())
            .navigate(&["/a", "post", "body", "application/json", "schema"])
            .unwrap();
        assert_eq!(schema.node().as_str(), Some(r#"{"type": "object"}"#));
    }

    #[test]
    fn test_cache_cleared_between_parses() {
        let fs = MemoryFileSystem::new()
            .with_file("root.raml", "a: !include part.yaml\n")
            .with_file("part.yaml", "x: 1\n");
        let mut parser = parser(fs);

        parser.parse("root.raml").unwrap();
        parser.parse("root.raml").unwrap();
        assert_eq!(parser.cache().len(), 1);
        assert_eq!(parser.cache().hits(), 0);
    }

    #[test]
    fn test_config_disables_schemas() {
        let fs = MemoryFileSystem::new()
            .with_file("root.raml", "doc: !include notes.md\n")
            .with_file("notes.md", "# Notes");
        let mut parser = parser(fs).with_config(ParserConfig::new().parse_schemas(false));

        let api = parser.parse("root.raml").unwrap();
        assert_eq!(api.root().get("doc"), Some(&Node::from("# Notes")));
    }
}
