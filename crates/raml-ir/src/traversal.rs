//! Traversal and cursor APIs for navigating the document tree

use crate::node::Node;
use crate::Error;
use crate::Result;

/// A cursor for navigating the tree
///
/// Keys in RAML documents routinely contain `/` (resource paths), so
/// navigation takes explicit key segments instead of a delimited string.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    /// Current node
    node: &'a Node,

    /// Path to current node (for error reporting)
    path: Vec<String>,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the given node
    pub fn new(node: &'a Node) -> Self {
        Self {
            node,
            path: Vec::new(),
        }
    }

    /// Get the current node
    pub fn node(&self) -> &'a Node {
        self.node
    }

    /// Get the current path
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Render the current path for diagnostics, e.g. `$["/widgets"]["get"]`
    pub fn display_path(&self) -> String {
        render_path(&self.path)
    }

    /// Navigate to a map entry by key
    pub fn child(&self, key: &str) -> Result<Cursor<'a>> {
        let map = self.node.as_map().ok_or_else(|| {
            Error::type_mismatch(self.display_path(), "map", self.node.kind())
        })?;

        let mut new_path = self.path.clone();
        new_path.push(key.to_string());

        match map.get(key) {
            Some(child) => Ok(Cursor {
                node: child,
                path: new_path,
            }),
            None => Err(Error::node_not_found(render_path(&new_path))),
        }
    }

    /// Navigate to a sequence item by index
    pub fn child_at(&self, index: usize) -> Result<Cursor<'a>> {
        let items = self.node.as_sequence().ok_or_else(|| {
            Error::type_mismatch(self.display_path(), "sequence", self.node.kind())
        })?;

        let mut new_path = self.path.clone();
        new_path.push(index.to_string());

        match items.get(index) {
            Some(child) => Ok(Cursor {
                node: child,
                path: new_path,
            }),
            None => Err(Error::node_not_found(render_path(&new_path))),
        }
    }

    /// Follow a sequence of map keys
    pub fn navigate(&self, keys: &[&str]) -> Result<Cursor<'a>> {
        let mut cursor = self.clone();
        for key in keys {
            cursor = cursor.child(key)?;
        }
        Ok(cursor)
    }
}

fn render_path(path: &[String]) -> String {
    let mut out = String::from("$");
    for segment in path {
        out.push_str("[\"");
        out.push_str(segment);
        out.push_str("\"]");
    }
    out
}

/// Visit every non-container value in document order, with its key path
pub fn for_each_leaf<F>(node: &Node, visitor: &mut F)
where
    F: FnMut(&[String], &Node),
{
    walk_leaves(node, visitor, &mut Vec::new());
}

fn walk_leaves<F>(node: &Node, visitor: &mut F, path: &mut Vec<String>)
where
    F: FnMut(&[String], &Node),
{
    match node {
        Node::Map(map) => {
            for (key, value) in map.iter() {
                path.push(key.to_string());
                walk_leaves(value, visitor, path);
                path.pop();
            }
        }
        Node::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                path.push(index.to_string());
                walk_leaves(item, visitor, path);
                path.pop();
            }
        }
        leaf => visitor(path, leaf),
    }
}

/// Visit every non-container value mutably, stopping at the first error
pub fn try_for_each_leaf_mut<E, F>(node: &mut Node, visitor: &mut F) -> std::result::Result<(), E>
where
    F: FnMut(&mut Node) -> std::result::Result<(), E>,
{
    match node {
        Node::Map(map) => {
            for (_, value) in map.iter_mut() {
                try_for_each_leaf_mut(value, visitor)?;
            }
            Ok(())
        }
        Node::Sequence(items) => {
            for item in items.iter_mut() {
                try_for_each_leaf_mut(item, visitor)?;
            }
            Ok(())
        }
        leaf => visitor(leaf),
    }
}
