use crate::tree::Point;
use crate::tree::SyntaxTree;

/// One text edit, described in both byte offsets and points, as needed to
/// update a previously parsed tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputEdit {
    pub start_byte: usize,
    pub old_end_byte: usize,
    pub new_end_byte: usize,
    pub start_position: Point,
    pub old_end_position: Point,
    pub new_end_position: Point,
}

impl InputEdit {
    /// Check the edit is internally consistent with a new text of `new_len`
    /// bytes.
    pub fn validate(&self, new_len: usize) -> Result<(), &'static str> {
        if self.start_byte > self.old_end_byte {
            return Err("start after old end");
        }
        if self.start_byte > self.new_end_byte {
            return Err("start after new end");
        }
        if self.new_end_byte > new_len {
            return Err("new end past end of text");
        }
        if self.start_position > self.old_end_position
            || self.start_position > self.new_end_position
        {
            return Err("positions out of order");
        }
        Ok(())
    }
}

/// Source of syntax trees for documents.
///
/// `None` means the provider could not produce a tree; callers treat that
/// document version as having no diagnostics and no completions.
pub trait TreeProvider {
    fn parse(&mut self, text: &str) -> Option<SyntaxTree>;

    /// Produce a tree for `text`, which is `old_tree`'s text with `edits`
    /// applied in order. Offsets and points in `edits` must already be
    /// computed by the caller.
    fn reparse(&mut self, text: &str, old_tree: &SyntaxTree, edits: &[InputEdit])
        -> Option<SyntaxTree>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(start: usize, old_end: usize, new_end: usize) -> InputEdit {
        InputEdit {
            start_byte: start,
            old_end_byte: old_end,
            new_end_byte: new_end,
            start_position: Point::new(0, u32::try_from(start).unwrap()),
            old_end_position: Point::new(0, u32::try_from(old_end).unwrap()),
            new_end_position: Point::new(0, u32::try_from(new_end).unwrap()),
        }
    }

    #[test]
    fn test_validate() {
        assert!(edit(2, 4, 3).validate(10).is_ok());
        assert!(edit(5, 4, 6).validate(10).is_err());
        assert!(edit(2, 4, 11).validate(10).is_err());
    }
}
