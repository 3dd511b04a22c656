//! Recursive `!include` resolution with per-session caching

use crate::cache::IncludeCache;
use crate::config::ParserConfig;
use crate::decoder::DocumentDecoder;
use crate::{Error, Result};
use raml_ir::{FileSystem, Map, Node, Scalar};
use raml_schema::SchemaParserRegistry;
use std::path::Path;
use tracing::{debug, trace, warn};

/// Marker that turns a string scalar into a file reference
pub const INCLUDE_MARKER: &str = "!include ";

/// Target path of an include directive, if `value` is one
pub fn include_target(value: &str) -> Option<&str> {
    value
        .strip_prefix(INCLUDE_MARKER)
        .map(str::trim)
        .filter(|target| !target.is_empty())
}

/// Splices included files into a tree
pub struct IncludeResolver<'a> {
    fs: &'a dyn FileSystem,
    decoder: &'a dyn DocumentDecoder,
    schemas: &'a SchemaParserRegistry,
    config: &'a ParserConfig,
    cache: &'a mut IncludeCache,
    parse_schemas: bool,
    /// Include file names currently being resolved
    active: Vec<String>,
}

impl<'a> IncludeResolver<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        decoder: &'a dyn DocumentDecoder,
        schemas: &'a SchemaParserRegistry,
        config: &'a ParserConfig,
        cache: &'a mut IncludeCache,
    ) -> Self {
        Self {
            fs,
            decoder,
            schemas,
            config,
            cache,
            parse_schemas: config.parse_schemas,
            active: Vec::new(),
        }
    }

    /// Override the configured schema-parsing flag
    pub fn parse_schemas(mut self, enabled: bool) -> Self {
        self.parse_schemas = enabled;
        self
    }

    /// Replace every include directive in `node`, recursing into containers.
    /// Relative include paths resolve against `base_dir`.
    pub fn resolve(&mut self, node: Node, base_dir: &Path) -> Result<Node> {
        match node {
            Node::Map(map) => {
                let mut out = Map::new();
                for (key, value) in map {
                    let resolved = self.resolve(value, base_dir)?;
                    out.insert(key, resolved);
                }
                Ok(Node::Map(out))
            }
            Node::Sequence(items) => items
                .into_iter()
                .map(|item| self.resolve(item, base_dir))
                .collect::<Result<Vec<_>>>()
                .map(Node::Sequence),
            Node::Scalar(Scalar::String(value)) => {
                if let Some(target) = include_target(&value) {
                    return self.load_file(target, base_dir);
                }
                Ok(Node::Scalar(Scalar::String(value)))
            }
            other => Ok(other),
        }
    }

    /// Load, decode and resolve one included file.
    ///
    /// An unreadable file yields [`Node::Absent`] rather than an error.
    pub fn load_file(&mut self, file_name: &str, base_dir: &Path) -> Result<Node> {
        if let Some(cached) = self.cache.lookup(file_name) {
            debug!("Cache hit for include: {}", file_name);
            return Ok(cached);
        }
        trace!("Cache miss for include: {}", file_name);

        if self.active.iter().any(|active| active == file_name) {
            return Err(Error::CircularInclude {
                file: file_name.to_string(),
            });
        }

        let full_path = base_dir.join(file_name);
        if !self.fs.is_file(&full_path) {
            warn!("Included file is not readable: {:?}", full_path);
            return Ok(Node::Absent(file_name.to_string()));
        }
        let bytes = match self.fs.read(&full_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Included file is not readable: {:?}: {}", full_path, e);
                return Ok(Node::Absent(file_name.to_string()));
            }
        };

        let extension = full_path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let node = if self.config.is_structured(extension) {
            let text = String::from_utf8(bytes)
                .map_err(|e| Error::decode(full_path.display().to_string(), e.to_string()))?;
            let decoded = self.decoder.decode(&text, &full_path)?;
            let include_dir = full_path.parent().unwrap_or(Path::new(""));

            self.active.push(file_name.to_string());
            let resolved = self.resolve(decoded, include_dir);
            self.active.pop();
            resolved?
        } else if self.parse_schemas {
            match self.schemas.for_file(&full_path) {
                Some(parser) => Node::Schema(parser.parse_file(&full_path, self.fs)?),
                None => return Err(Error::unsupported_extension(extension)),
            }
        } else {
            Node::string(String::from_utf8_lossy(&bytes).into_owned())
        };

        debug!("Resolved include {} ({})", file_name, node.kind());
        self.cache.register(file_name, node.clone());
        Ok(node)
    }
}
