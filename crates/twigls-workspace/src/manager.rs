use std::fmt;

use rustc_hash::FxHashMap;
use tower_lsp_server::ls_types;
use twigls_source::PositionEncoding;
use twigls_syntax::SyntaxTree;
use twigls_syntax::TreeProvider;

use crate::DocumentError;
use crate::TextDocument;
use crate::TreeCache;

type ParseListener = Box<dyn Fn(&str, &SyntaxTree) + Send + Sync>;

/// Owns the text and latest tree of every open document.
///
/// Each open or change re-parses the document through the provider and
/// notifies parse listeners. A failed parse leaves the document without a
/// tree until the next successful one.
pub struct DocumentManager<P> {
    provider: P,
    encoding: PositionEncoding,
    documents: FxHashMap<String, TextDocument>,
    trees: TreeCache,
    listeners: Vec<ParseListener>,
}

impl<P: TreeProvider> DocumentManager<P> {
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            encoding: PositionEncoding::default(),
            documents: FxHashMap::default(),
            trees: TreeCache::new(),
            listeners: Vec::new(),
        }
    }

    /// Interpret change ranges in `encoding` instead of UTF-16.
    #[must_use]
    pub fn with_encoding(mut self, encoding: PositionEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn encoding(&self) -> PositionEncoding {
        self.encoding
    }

    /// Register a callback run after every successful parse.
    pub fn on_did_parse(&mut self, listener: impl Fn(&str, &SyntaxTree) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn open(
        &mut self,
        uri: &str,
        text: String,
        version: i32,
        language_id: &str,
    ) -> Option<&SyntaxTree> {
        tracing::debug!(uri, version, "opened document");
        let tree = self.provider.parse(&text);
        self.documents
            .insert(uri.to_string(), TextDocument::new(text, version, language_id));
        self.store(uri, tree)
    }

    /// Apply `changes` and reparse, incrementally when a tree is cached.
    pub fn change(
        &mut self,
        uri: &str,
        version: i32,
        changes: Vec<ls_types::TextDocumentContentChangeEvent>,
    ) -> Result<Option<&SyntaxTree>, DocumentError> {
        let document = self
            .documents
            .get_mut(uri)
            .ok_or_else(|| DocumentError::NotOpen(uri.to_string()))?;
        let edits = document.apply_changes(changes, version, self.encoding)?;

        let tree = match self.trees.get(uri) {
            Some(old) => self.provider.reparse(document.content(), old, &edits),
            None => self.provider.parse(document.content()),
        };
        Ok(self.store(uri, tree))
    }

    /// Forget the document and its tree. Returns whether it was open.
    pub fn close(&mut self, uri: &str) -> bool {
        tracing::debug!(uri, "closed document");
        self.trees.remove(uri);
        self.documents.remove(uri).is_some()
    }

    #[must_use]
    pub fn document(&self, uri: &str) -> Option<&TextDocument> {
        self.documents.get(uri)
    }

    #[must_use]
    pub fn tree(&self, uri: &str) -> Option<&SyntaxTree> {
        self.trees.get(uri)
    }

    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    fn store(&mut self, uri: &str, tree: Option<SyntaxTree>) -> Option<&SyntaxTree> {
        let Some(tree) = tree else {
            tracing::warn!(uri, "parse failed, dropping cached tree");
            self.trees.remove(uri);
            return None;
        };

        let tree = self.trees.insert(uri, tree);
        for listener in &self.listeners {
            listener(uri, tree);
        }
        Some(tree)
    }
}

impl<P> fmt::Debug for DocumentManager<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentManager")
            .field("encoding", &self.encoding)
            .field("documents", &self.documents.len())
            .field("trees", &self.trees.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
