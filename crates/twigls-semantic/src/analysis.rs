use tracing::trace;
use twigls_syntax::SyntaxNode;
use twigls_syntax::SyntaxTree;

use crate::tags::classify;
use crate::tags::is_inline_set;
use crate::tags::tag_keyword;
use crate::tags::BlockType;
use crate::tags::TagClass;
use crate::types::MisplacedKeyword;
use crate::types::NestingError;
use crate::types::ScopedBlockInfo;
use crate::types::TagAnalysisResult;
use crate::types::TagLocation;

/// Lines added past the last tag for blocks that are never closed, so that
/// line-range scope queries treat them as open to the end of the document.
pub const UNCLOSED_LINE_PADDING: u32 = 1000;

/// Pair opening and closing tags and collect every structural anomaly.
///
/// Pure function of the tree: calling it twice yields identical results.
#[must_use]
pub fn analyze_tags(tree: &SyntaxTree) -> TagAnalysisResult {
    let mut pairing = TagPairing::default();
    for tag in tree.tags() {
        pairing.handle_tag(&tag);
    }
    let result = pairing.finish();
    trace!(
        scoped = result.scoped_blocks.len(),
        unclosed = result.unclosed.len(),
        orphans = result.orphan_closers.len(),
        nesting = result.nesting_errors.len(),
        misplaced = result.misplaced_keywords.len(),
        "analyzed tags"
    );
    result
}

struct OpenTag {
    block_type: BlockType,
    start_line: u32,
    start_character: u32,
    location: TagLocation,
}

#[derive(Default)]
struct TagPairing {
    stack: Vec<OpenTag>,
    max_end_line: u32,
    result: TagAnalysisResult,
}

impl TagPairing {
    fn handle_tag(&mut self, tag: &SyntaxNode<'_>) {
        self.max_end_line = self.max_end_line.max(tag.end_position().row);

        let Some(keyword) = tag_keyword(tag) else {
            return;
        };
        let name = keyword.text();

        match classify(name) {
            TagClass::MidBlock { valid_parents } => {
                // Never touches the stack, valid or not.
                let valid = self
                    .stack
                    .last()
                    .is_some_and(|top| valid_parents.contains(&top.block_type));
                if !valid {
                    self.result.misplaced_keywords.push(MisplacedKeyword {
                        location: TagLocation::new(name, tag),
                        valid_parents: valid_parents.to_vec(),
                    });
                }
            }
            TagClass::Opener(block_type) => {
                if block_type == BlockType::Set && is_inline_set(tag) {
                    return;
                }
                let start = tag.start_position();
                self.stack.push(OpenTag {
                    block_type,
                    start_line: start.row,
                    start_character: start.column,
                    location: TagLocation::new(name, tag),
                });
            }
            TagClass::Closer(block_type) => {
                self.close(block_type, TagLocation::new(name, tag), tag.end_position().row);
            }
            TagClass::Other => {}
        }
    }

    fn close(&mut self, block_type: BlockType, closer: TagLocation, end_line: u32) {
        let Some(index) = self
            .stack
            .iter()
            .rposition(|open| open.block_type == block_type)
        else {
            self.result.orphan_closers.push(closer);
            return;
        };

        let matched = &self.stack[index];
        for crossed in self.stack[index + 1..].iter().rev() {
            self.result.nesting_errors.push(NestingError {
                outer: matched.location.clone(),
                inner: crossed.location.clone(),
                closer: closer.clone(),
            });
        }

        // Crossed entries go with the match and are not reported again.
        if let Some(matched) = self.stack.drain(index..).next() {
            self.result.scoped_blocks.push(ScopedBlockInfo {
                block_type: matched.block_type,
                start_line: matched.start_line,
                end_line,
                start_character: matched.start_character,
            });
        }
    }

    fn finish(mut self) -> TagAnalysisResult {
        let end_line = self.max_end_line + UNCLOSED_LINE_PADDING;
        for open in self.stack {
            self.result.scoped_blocks.push(ScopedBlockInfo {
                block_type: open.block_type,
                start_line: open.start_line,
                end_line,
                start_character: open.start_character,
            });
            self.result.unclosed.push(open.location);
        }
        self.result
    }
}
