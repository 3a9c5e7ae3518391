use twigls_source::LineIndex;
use twigls_source::PositionEncoding;
use twigls_source::Span;

use crate::kind::SyntaxKind;
use crate::tree::NodeData;
use crate::tree::NodeId;
use crate::tree::Point;
use crate::tree::SyntaxTree;

/// Arena builder used by the parser. Nodes are opened and closed in a strict
/// stack discipline; points are filled in once the whole source is known.
pub(crate) struct TreeBuilder {
    nodes: Vec<NodeData>,
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn push(&mut self, kind: SyntaxKind, span: Span) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        let parent = self.stack.last().copied();
        self.nodes.push(NodeData {
            kind,
            span,
            start: Point::default(),
            end: Point::default(),
            parent,
            children: Vec::new(),
            has_error: kind == SyntaxKind::Error,
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        id
    }

    pub(crate) fn start_node(&mut self, kind: SyntaxKind, start: usize) -> NodeId {
        let id = self.push(kind, Span::from_parts(start, 0));
        self.stack.push(id);
        id
    }

    pub(crate) fn finish_node(&mut self, end: usize) {
        if let Some(id) = self.stack.pop() {
            let node = &mut self.nodes[id.index()];
            node.span = Span::from_bounds(node.span.start_usize(), end);
        }
    }

    pub(crate) fn leaf(&mut self, kind: SyntaxKind, start: usize, end: usize) -> NodeId {
        self.push(kind, Span::from_bounds(start, end))
    }

    pub(crate) fn mark_error(&mut self, id: NodeId) {
        self.nodes[id.index()].has_error = true;
    }

    pub(crate) fn finish(mut self, source: String) -> SyntaxTree {
        let line_index = LineIndex::new(&source);

        // Children always have larger ids than their parent, so a reverse
        // sweep sees every child before the parent it propagates into.
        for index in (0..self.nodes.len()).rev() {
            if self.nodes[index].has_error {
                if let Some(parent) = self.nodes[index].parent {
                    self.nodes[parent.index()].has_error = true;
                }
            }
        }

        for node in &mut self.nodes {
            let start = line_index.line_col(node.span.start(), &source, PositionEncoding::Utf16);
            let end = line_index.line_col(node.span.end(), &source, PositionEncoding::Utf16);
            node.start = Point::new(start.line(), start.column());
            node.end = Point::new(end.line(), end.column());
        }

        SyntaxTree::new(source, self.nodes, line_index)
    }
}
