use std::fmt::Write as _;

use serde::Serialize;
use twigls_source::LineIndex;
use twigls_source::Span;

use crate::cursor::TreeCursor;
use crate::kind::SyntaxKind;
use crate::stream::TagStream;

/// A row/column position in a syntax tree.
///
/// Rows are 0-based lines, columns are UTF-16 code units from the start of the
/// row, which is what LSP clients send by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Point {
    pub row: u32,
    pub column: u32,
}

impl Point {
    #[must_use]
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);

    pub(crate) fn new(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
pub(crate) struct NodeData {
    pub(crate) kind: SyntaxKind,
    pub(crate) span: Span,
    pub(crate) start: Point,
    pub(crate) end: Point,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) has_error: bool,
}

/// An immutable concrete syntax tree for one version of a document.
///
/// Nodes live in a flat arena in creation order, so a parent always precedes
/// its children and a pre-order walk is a walk over increasing ids.
#[derive(Clone, Debug)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<NodeData>,
    line_index: LineIndex,
}

impl SyntaxTree {
    pub(crate) fn new(source: String, nodes: Vec<NodeData>, line_index: LineIndex) -> Self {
        Self {
            source,
            nodes,
            line_index,
        }
    }

    #[must_use]
    pub fn root_node(&self) -> SyntaxNode<'_> {
        SyntaxNode {
            tree: self,
            id: NodeId::ROOT,
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    #[must_use]
    pub fn walk(&self) -> TreeCursor<'_> {
        TreeCursor::new(self.root_node())
    }

    /// Every `statement_block` node in document order.
    #[must_use]
    pub fn tags(&self) -> TagStream<'_> {
        TagStream::new(self)
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub(crate) fn node(&self, id: NodeId) -> SyntaxNode<'_> {
        SyntaxNode { tree: self, id }
    }
}

/// A borrowed handle to one node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNode<'_> {}

impl std::fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}, {}] - [{}, {}]",
            self.kind(),
            self.start_position().row,
            self.start_position().column,
            self.end_position().row,
            self.end_position().column
        )
    }
}

impl<'t> SyntaxNode<'t> {
    fn data(&self) -> &'t NodeData {
        self.tree.data(self.id)
    }

    pub(crate) fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    #[must_use]
    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    #[must_use]
    pub fn is_named(&self) -> bool {
        self.kind().is_named()
    }

    #[must_use]
    pub fn text(&self) -> &'t str {
        self.tree
            .source
            .get(self.data().span.as_range())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn span(&self) -> Span {
        self.data().span
    }

    #[must_use]
    pub fn start_byte(&self) -> u32 {
        self.data().span.start()
    }

    #[must_use]
    pub fn end_byte(&self) -> u32 {
        self.data().span.end()
    }

    #[must_use]
    pub fn start_position(&self) -> Point {
        self.data().start
    }

    #[must_use]
    pub fn end_position(&self) -> Point {
        self.data().end
    }

    /// Whether this node is an `ERROR` node or contains one.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.data().has_error
    }

    #[must_use]
    pub fn parent(&self) -> Option<SyntaxNode<'t>> {
        self.data().parent.map(|id| self.tree.node(id))
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    #[must_use]
    pub fn child(&self, index: usize) -> Option<SyntaxNode<'t>> {
        self.data()
            .children
            .get(index)
            .map(|id| self.tree.node(*id))
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = SyntaxNode<'t>> + 't {
        let tree = self.tree;
        self.data().children.iter().map(move |id| tree.node(*id))
    }

    pub fn named_children(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
        self.children().filter(SyntaxNode::is_named)
    }

    #[must_use]
    pub fn named_child(&self, index: usize) -> Option<SyntaxNode<'t>> {
        self.named_children().nth(index)
    }

    #[must_use]
    pub fn first_child(&self) -> Option<SyntaxNode<'t>> {
        self.children().next()
    }

    #[must_use]
    pub fn last_child(&self) -> Option<SyntaxNode<'t>> {
        self.children().next_back()
    }

    /// First named child of the given kind.
    #[must_use]
    pub fn child_of_kind(&self, kind: SyntaxKind) -> Option<SyntaxNode<'t>> {
        self.children().find(|child| child.kind() == kind)
    }

    /// Smallest node whose range contains `point`. Ranges are treated as
    /// inclusive of their end so a cursor just past a token still hits it.
    #[must_use]
    pub fn descendant_for_position(&self, point: Point) -> Option<SyntaxNode<'t>> {
        if point < self.start_position() || point > self.end_position() {
            return None;
        }

        let mut node = *self;
        'descend: loop {
            for child in node.children() {
                if child.start_position() <= point && point <= child.end_position() {
                    node = child;
                    continue 'descend;
                }
            }
            return Some(node);
        }
    }

    /// S-expression rendering of the named structure below this node.
    #[must_use]
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(&mut out);
        out
    }

    fn write_sexp(&self, out: &mut String) {
        let _ = write!(out, "({}", self.kind());
        for child in self.named_children() {
            out.push(' ');
            child.write_sexp(out);
        }
        out.push(')');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;

    #[test]
    fn test_node_text_and_positions() {
        let tree = Parser::new().parse_text("a\n  {{ user }}");
        let output = tree.root_node().child(1).unwrap();
        assert_eq!(output.kind(), SyntaxKind::OutputStatement);
        assert_eq!(output.text(), "{{ user }}");
        assert_eq!(output.start_position(), Point::new(1, 2));
        assert_eq!(output.end_position(), Point::new(1, 12));
    }

    #[test]
    fn test_columns_are_utf16() {
        let tree = Parser::new().parse_text("é😀{{ x }}");
        let output = tree.root_node().child(1).unwrap();
        assert_eq!(output.start_position(), Point::new(0, 3));
        assert_eq!(output.start_byte(), 6);
    }

    #[test]
    fn test_parent_links() {
        let tree = Parser::new().parse_text("{% if a %}");
        let block = tree.root_node().child(0).unwrap();
        let keyword = block.named_child(0).unwrap();
        assert_eq!(keyword.kind(), SyntaxKind::Keyword);
        assert_eq!(keyword.parent(), Some(block));
        assert_eq!(block.parent(), Some(tree.root_node()));
        assert!(tree.root_node().parent().is_none());
    }

    #[test]
    fn test_descendant_for_position() {
        let tree = Parser::new().parse_text("{{ user.name }}");
        let node = tree
            .root_node()
            .descendant_for_position(Point::new(0, 9))
            .unwrap();
        assert_eq!(node.kind(), SyntaxKind::Identifier);
        assert_eq!(node.text(), "name");
        assert_eq!(node.parent().unwrap().kind(), SyntaxKind::PropertyAccess);
    }

    #[test]
    fn test_first_and_last_child() {
        let tree = Parser::new().parse_text("{%- if a -%}");
        let block = tree.root_node().child(0).unwrap();
        assert_eq!(block.first_child().unwrap().text(), "{%-");
        let last = block.last_child().unwrap();
        assert_eq!(last.kind(), SyntaxKind::StatementEnd);
        assert_eq!(last.text(), "-%}");
    }
}
