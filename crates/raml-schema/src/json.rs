//! JSON Schema parser with `$ref` dereferencing

use crate::registry::SchemaParser;
use crate::{Error, Result};
use raml_ir::{FileSystem, Node, SchemaFragment};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, trace};

/// Format name recorded on fragments produced by [`JsonSchemaParser`]
pub const FORMAT: &str = "json-schema";

/// Parses JSON schemas and replaces every resolvable `$ref` with its target
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaParser;

impl JsonSchemaParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_value(text: &str, source: &Path) -> Result<Value> {
        serde_json::from_str(text)
            .map_err(|e| Error::invalid_schema(source.display().to_string(), e.to_string()))
    }
}

impl SchemaParser for JsonSchemaParser {
    fn name(&self) -> &str {
        FORMAT
    }

    fn can_parse_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }

    fn can_parse_inline(&self, value: &Node) -> bool {
        let Some(text) = value.as_str() else {
            return false;
        };
        let trimmed = text.trim_start();
        if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
            return false;
        }
        serde_json::from_str::<Value>(text).is_ok()
    }

    fn parse_file(&self, path: &Path, fs: &dyn FileSystem) -> Result<SchemaFragment> {
        let bytes = fs
            .read(path)
            .map_err(|e| Error::invalid_schema(path.display().to_string(), e.to_string()))?;
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| Error::invalid_schema(path.display().to_string(), e.to_string()))?;

        let base_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        let mut resolver = RefResolver::new(fs);
        let document = Document {
            id: path.display().to_string(),
            base_dir,
            root: Rc::new(value),
        };
        let resolved = resolver.resolve(&document.root, &document)?;

        debug!("Parsed JSON schema file {:?}", path);
        Ok(SchemaFragment::new(FORMAT, resolved))
    }

    fn parse_inline(
        &self,
        text: &str,
        base_dir: &Path,
        fs: &dyn FileSystem,
    ) -> Result<SchemaFragment> {
        let value = Self::parse_value(text, base_dir)?;

        let mut resolver = RefResolver::new(fs);
        let document = Document {
            id: "#inline".to_string(),
            base_dir: base_dir.to_path_buf(),
            root: Rc::new(value),
        };
        let resolved = resolver.resolve(&document.root, &document)?;

        trace!("Parsed inline JSON schema relative to {:?}", base_dir);
        Ok(SchemaFragment::new(FORMAT, resolved))
    }
}

/// A JSON document references are resolved against
#[derive(Clone)]
struct Document {
    id: String,
    base_dir: PathBuf,
    root: Rc<Value>,
}

/// Walks a value, substituting `$ref` objects with their targets
struct RefResolver<'a> {
    fs: &'a dyn FileSystem,
    loaded: HashMap<PathBuf, Document>,
    /// `document#pointer` keys currently being expanded
    active: Vec<String>,
}

impl<'a> RefResolver<'a> {
    fn new(fs: &'a dyn FileSystem) -> Self {
        Self {
            fs,
            loaded: HashMap::new(),
            active: Vec::new(),
        }
    }

    fn resolve(&mut self, value: &Value, document: &Document) -> Result<Value> {
        match value {
            Value::Object(object) => {
                if let Some(Value::String(reference)) = object.get("$ref") {
                    return self.dereference(reference, value, document);
                }
                let mut out = serde_json::Map::with_capacity(object.len());
                for (key, child) in object {
                    out.insert(key.clone(), self.resolve(child, document)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve(item, document))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn dereference(&mut self, reference: &str, original: &Value, document: &Document) -> Result<Value> {
        if is_remote(reference) {
            trace!("Leaving remote reference unresolved: {}", reference);
            return Ok(original.clone());
        }

        let (file_part, pointer) = match reference.split_once('#') {
            Some((file, pointer)) => (file, normalize_pointer(pointer)),
            None => (reference, String::new()),
        };

        let target_document = if file_part.is_empty() {
            document.clone()
        } else {
            self.load(file_part, reference, document)?
        };

        let key = format!("{}#{}", target_document.id, pointer);
        if self.active.contains(&key) {
            debug!("Reference cycle at {}; keeping $ref in place", key);
            return Ok(original.clone());
        }

        let target = target_document
            .root
            .pointer(&pointer)
            .cloned()
            .ok_or_else(|| Error::unresolved(reference, document.base_dir.display().to_string()))?;

        self.active.push(key);
        let resolved = self.resolve(&target, &target_document);
        self.active.pop();

        trace!("Resolved $ref {}", reference);
        resolved
    }

    fn load(&mut self, file_part: &str, reference: &str, document: &Document) -> Result<Document> {
        let relative = file_part
            .strip_prefix("file://")
            .or_else(|| file_part.strip_prefix("file:"))
            .unwrap_or(file_part);
        let path = document.base_dir.join(relative);

        if let Some(loaded) = self.loaded.get(&path) {
            return Ok(loaded.clone());
        }

        let bytes = self
            .fs
            .read(&path)
            .map_err(|_| Error::unresolved(reference, document.base_dir.display().to_string()))?;
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| Error::invalid_schema(path.display().to_string(), e.to_string()))?;

        let loaded = Document {
            id: path.display().to_string(),
            base_dir: path.parent().unwrap_or(Path::new(".")).to_path_buf(),
            root: Rc::new(value),
        };
        self.loaded.insert(path, loaded.clone());
        Ok(loaded)
    }
}

fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// `definitions/a` and `/definitions/a` both address the same pointer
fn normalize_pointer(pointer: &str) -> String {
    if pointer.is_empty() || pointer.starts_with('/') {
        pointer.to_string()
    } else {
        format!("/{}", pointer)
    }
}
