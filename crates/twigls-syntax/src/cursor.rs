use crate::tree::SyntaxNode;

/// A stateful cursor over a [`crate::SyntaxTree`].
///
/// Keeps the child index of every ancestor so sibling moves don't have to
/// search the parent's child list.
pub struct TreeCursor<'t> {
    node: SyntaxNode<'t>,
    path: Vec<usize>,
}

impl<'t> TreeCursor<'t> {
    pub(crate) fn new(node: SyntaxNode<'t>) -> Self {
        Self {
            node,
            path: Vec::new(),
        }
    }

    #[must_use]
    pub fn node(&self) -> SyntaxNode<'t> {
        self.node
    }

    pub fn goto_first_child(&mut self) -> bool {
        match self.node.child(0) {
            Some(child) => {
                self.node = child;
                self.path.push(0);
                true
            }
            None => false,
        }
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        let Some(index) = self.path.last().copied() else {
            return false;
        };
        let Some(sibling) = self.node.parent().and_then(|parent| parent.child(index + 1)) else {
            return false;
        };
        self.node = sibling;
        if let Some(last) = self.path.last_mut() {
            *last = index + 1;
        }
        true
    }

    pub fn goto_parent(&mut self) -> bool {
        if self.path.pop().is_none() {
            return false;
        }
        match self.node.parent() {
            Some(parent) => {
                self.node = parent;
                true
            }
            None => false,
        }
    }
}
