use std::iter::FusedIterator;

use crate::cursor::TreeCursor;
use crate::kind::SyntaxKind;
use crate::tree::SyntaxNode;
use crate::tree::SyntaxTree;

/// Pre-order walk yielding every `statement_block` node in document order.
///
/// Uses an explicit cursor rather than recursion, so deeply nested input
/// cannot exhaust the stack. Once exhausted it stays exhausted.
pub struct TagStream<'t> {
    cursor: TreeCursor<'t>,
    done: bool,
}

impl<'t> TagStream<'t> {
    #[must_use]
    pub fn new(tree: &'t SyntaxTree) -> Self {
        Self {
            cursor: tree.walk(),
            done: false,
        }
    }

    fn advance(&mut self) {
        if self.cursor.goto_first_child() {
            return;
        }
        loop {
            if self.cursor.goto_next_sibling() {
                return;
            }
            if !self.cursor.goto_parent() {
                self.done = true;
                return;
            }
        }
    }
}

impl<'t> Iterator for TagStream<'t> {
    type Item = SyntaxNode<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let node = self.cursor.node();
            self.advance();
            if node.kind() == SyntaxKind::StatementBlock {
                return Some(node);
            }
        }
        None
    }
}

impl FusedIterator for TagStream<'_> {}
