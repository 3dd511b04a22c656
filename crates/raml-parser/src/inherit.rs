//! Trait and resource-type inheritance
//!
//! Traits are pulled in by `is: [..]` (a list, folded in order) and resource
//! types by `type: ..` (a single reference). A reference is either a bare
//! definition name or a one-entry map `{name: {variable: value}}`. The
//! definition body is templated with the explicit bindings plus the implicit
//! `resourcePath` / `resourcePathName`, inheritance is applied to the body
//! itself, and the result is deep-merged into the node carrying the
//! directive.

use crate::template::{Bindings, apply_variables};
use crate::{Error, Result};
use raml_ir::{Map, Node, merge_value};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace};

/// Which kind of definition a table holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Trait,
    ResourceType,
}

impl DefinitionKind {
    /// Top-level key holding the definitions
    pub fn collection_key(self) -> &'static str {
        match self {
            DefinitionKind::Trait => "traits",
            DefinitionKind::ResourceType => "resourceTypes",
        }
    }

    /// Key that applies a definition
    pub fn directive_key(self) -> &'static str {
        match self {
            DefinitionKind::Trait => "is",
            DefinitionKind::ResourceType => "type",
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionKind::Trait => write!(f, "trait"),
            DefinitionKind::ResourceType => write!(f, "resource type"),
        }
    }
}

/// Definitions addressable by name
#[derive(Debug, Clone)]
pub struct DefinitionTable {
    kind: DefinitionKind,
    definitions: HashMap<String, Node>,
}

impl DefinitionTable {
    pub fn new(kind: DefinitionKind) -> Self {
        Self {
            kind,
            definitions: HashMap::new(),
        }
    }

    /// Flatten a `traits` / `resourceTypes` collection.
    ///
    /// Accepts a list of maps (`- name: body`) or a single map. A name seen
    /// twice keeps the later body.
    pub fn from_collection(kind: DefinitionKind, collection: &Node) -> Self {
        let mut table = Self::new(kind);
        match collection {
            Node::Sequence(items) => {
                for item in items {
                    match item.as_map() {
                        Some(map) => table.extend(map),
                        None => trace!("Skipping non-map {} entry ({})", kind, item.kind()),
                    }
                }
            }
            Node::Map(map) => table.extend(map),
            other => trace!("Ignoring {} collection of kind {}", kind, other.kind()),
        }
        table
    }

    fn extend(&mut self, map: &Map) {
        for (name, body) in map.iter() {
            self.insert(name, body.clone());
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, body: Node) {
        let name = name.into();
        if self.definitions.insert(name.clone(), body).is_some() {
            debug!("Duplicate {} '{}': later definition wins", self.kind, name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.definitions.get(name)
    }

    pub fn kind(&self) -> DefinitionKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definition names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// The resource a definition is being applied to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceContext {
    /// Full resource path (`resourcePath`)
    pub path: String,
    /// Display name, or the path without its leading `/` (`resourcePathName`)
    pub name: String,
}

impl ResourceContext {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Context for a top-level resource keyed `key`
    pub fn for_resource(key: &str, body: &Node) -> Self {
        Self::new(key, resource_name(key, body))
    }

    /// Explicit bindings plus the implicit resource variables.
    /// The implicit variables always take precedence.
    pub fn bindings(&self, mut explicit: Bindings) -> Bindings {
        explicit.insert("resourcePath", self.path.clone());
        explicit.insert("resourcePathName", self.name.clone());
        explicit
    }
}

fn resource_name(key: &str, body: &Node) -> String {
    match body.get("displayName").and_then(Node::as_scalar) {
        Some(display_name) => display_name.as_text(),
        None => key.strip_prefix('/').unwrap_or(key).to_string(),
    }
}

/// Apply `is:` directives throughout a resource subtree
pub fn apply_traits(node: Node, traits: &DefinitionTable, ctx: &ResourceContext) -> Result<Node> {
    Applier::new(traits).apply(node, ctx, true)
}

/// Apply `type:` directives on a resource and its nested resources
pub fn apply_types(node: Node, types: &DefinitionTable, ctx: &ResourceContext) -> Result<Node> {
    Applier::new(types).apply(node, ctx, true)
}

/// Run `table` over every top-level resource (keys starting with `/`)
pub fn apply_to_resources(root: &mut Map, table: &DefinitionTable) -> Result<()> {
    let resource_keys: Vec<String> = root
        .keys()
        .filter(|key| key.starts_with('/'))
        .map(String::from)
        .collect();

    for key in resource_keys {
        let Some(slot) = root.get_mut(&key) else {
            continue;
        };
        let body = std::mem::replace(slot, Node::null());
        let ctx = ResourceContext::for_resource(&key, &body);
        trace!("Applying {}s to resource {}", table.kind(), key);
        *slot = Applier::new(table).apply(body, &ctx, true)?;
    }
    Ok(())
}

struct Applier<'t> {
    table: &'t DefinitionTable,
    /// Definition names currently being expanded
    active: Vec<String>,
}

impl<'t> Applier<'t> {
    fn new(table: &'t DefinitionTable) -> Self {
        Self {
            table,
            active: Vec::new(),
        }
    }

    fn apply(&mut self, node: Node, ctx: &ResourceContext, is_resource: bool) -> Result<Node> {
        let mut map = match node {
            Node::Map(map) => map,
            other => return Ok(other),
        };

        let mut result = Map::new();

        // A resource type seeds the resource before any of its own keys.
        if self.table.kind() == DefinitionKind::ResourceType && is_resource {
            if let Some(reference) = map.remove(DefinitionKind::ResourceType.directive_key()) {
                self.merge_reference(&mut result, reference, ctx)?;
            }
        }

        for (key, value) in map {
            if self.table.kind() == DefinitionKind::Trait
                && key == DefinitionKind::Trait.directive_key()
            {
                let references = match value {
                    Node::Sequence(items) => items,
                    Node::Scalar(scalar) if scalar.is_null() => Vec::new(),
                    single => vec![single],
                };
                for reference in references {
                    self.merge_reference(&mut result, reference, ctx)?;
                }
                continue;
            }

            // nested resources keep the top-level resource's variables
            let child_is_resource = key.starts_with('/');
            let new_value = self.apply(value, ctx, child_is_resource)?;

            match result.get_mut(&key) {
                Some(existing) => merge_value(existing, new_value),
                None => {
                    result.insert(key, new_value);
                }
            }
        }

        Ok(Node::Map(result))
    }

    /// Resolve one reference and fold it onto `result`
    fn merge_reference(
        &mut self,
        result: &mut Map,
        reference: Node,
        ctx: &ResourceContext,
    ) -> Result<()> {
        let kind = self.table.kind();
        let (name, explicit) = match reference {
            Node::Scalar(scalar) if scalar.is_null() => return Ok(()),
            Node::Scalar(scalar) => (scalar.as_text(), Bindings::new()),
            Node::Map(map) if map.len() == 1 => {
                let Some((name, params)) = map.into_iter().next() else {
                    return Ok(());
                };
                (name, Bindings::from_node(&params))
            }
            other => {
                debug!("Ignoring malformed {} reference ({})", kind, other.kind());
                return Ok(());
            }
        };

        let Some(body) = self.table.get(&name) else {
            debug!("Unknown {} '{}' referenced from {}", kind, name, ctx.path);
            return Ok(());
        };

        if self.active.iter().any(|active| active == &name) {
            return Err(Error::circular(kind, name));
        }

        let bindings = ctx.bindings(explicit);
        let templated = apply_variables(&bindings, body);

        self.active.push(name);
        let resolved = self.apply(templated, ctx, kind == DefinitionKind::ResourceType);
        self.active.pop();

        match resolved? {
            Node::Map(contribution) => result.merge(contribution),
            other => trace!("{} body is not a map ({}); nothing to merge", kind, other.kind()),
        }
        Ok(())
    }
}
