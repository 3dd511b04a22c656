//! Per-session cache of resolved include files

use raml_ir::Node;
use std::collections::HashMap;

/// Resolved include contents keyed by the file name as written in the
/// `!include` directive (not by the resolved path or by content).
#[derive(Debug, Default)]
pub struct IncludeCache {
    entries: HashMap<String, Node>,
    hits: usize,
    misses: usize,
}

impl IncludeCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a resolved include
    pub fn register(&mut self, file_name: impl Into<String>, node: Node) {
        self.entries.insert(file_name.into(), node);
    }

    /// Look up a file name, recording a hit or a miss
    pub fn lookup(&mut self, file_name: &str) -> Option<Node> {
        match self.entries.get(file_name) {
            Some(node) => {
                self.hits += 1;
                Some(node.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Check if a file name is cached
    pub fn contains(&self, file_name: &str) -> bool {
        self.entries.contains_key(file_name)
    }

    pub fn get(&self, file_name: &str) -> Option<&Node> {
        self.entries.get(file_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Drop all entries and counters (start of a new parse session)
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_counts() {
        let mut cache = IncludeCache::new();
        assert!(cache.lookup("a.raml").is_none());

        cache.register("a.raml", Node::from("x"));
        assert_eq!(cache.lookup("a.raml"), Some(Node::from("x")));
        assert_eq!(cache.lookup("a.raml"), Some(Node::from("x")));

        assert_eq!(cache.hits(), 2);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keyed_by_name_not_content() {
        let mut cache = IncludeCache::new();
        cache.register("a.raml", Node::from("same"));
        cache.register("b.raml", Node::from("same"));
        assert_eq!(cache.len(), 2);
        assert!(cache.contains("b.raml"));
        assert!(!cache.contains("./a.raml"));
    }

    #[test]
    fn test_clear() {
        let mut cache = IncludeCache::new();
        cache.register("a.raml", Node::null());
        cache.lookup("a.raml");
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.hits(), 0);
        assert_eq!(cache.misses(), 0);
    }
}
