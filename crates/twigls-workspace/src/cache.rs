use rustc_hash::FxHashMap;
use twigls_syntax::SyntaxTree;

/// The latest syntax tree per document URI.
///
/// Replacing or removing an entry drops the previous tree.
#[derive(Debug, Default)]
pub struct TreeCache {
    trees: FxHashMap<String, SyntaxTree>,
}

impl TreeCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, uri: &str) -> Option<&SyntaxTree> {
        self.trees.get(uri)
    }

    /// Store `tree` for `uri`, returning a reference to the stored tree.
    pub fn insert(&mut self, uri: &str, tree: SyntaxTree) -> &SyntaxTree {
        if self.trees.insert(uri.to_string(), tree).is_some() {
            tracing::trace!(uri, "replaced cached tree");
        }
        &self.trees[uri]
    }

    pub fn remove(&mut self, uri: &str) -> bool {
        self.trees.remove(uri).is_some()
    }

    pub fn clear(&mut self) {
        self.trees.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use twigls_syntax::Parser;

    use super::*;

    #[test]
    fn test_insert_replaces() {
        let parser = Parser::new();
        let mut cache = TreeCache::new();
        cache.insert("file:///a.twig", parser.parse_text("{{ a }}"));
        let stored = cache.insert("file:///a.twig", parser.parse_text("{{ b }}"));
        assert_eq!(stored.source(), "{{ b }}");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let parser = Parser::new();
        let mut cache = TreeCache::new();
        cache.insert("file:///a.twig", parser.parse_text(""));
        cache.insert("file:///b.twig", parser.parse_text(""));

        assert!(cache.remove("file:///a.twig"));
        assert!(!cache.remove("file:///a.twig"));
        assert!(cache.get("file:///a.twig").is_none());

        cache.clear();
        assert!(cache.is_empty());
    }
}
