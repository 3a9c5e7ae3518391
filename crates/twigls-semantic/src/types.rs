use serde::Serialize;
use twigls_syntax::SyntaxNode;

use crate::tags::BlockType;

/// Span of one whole tag (`{% ... %}`), 0-based, together with the keyword
/// that classified it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagLocation {
    pub keyword: String,
    pub line: u32,
    pub character: u32,
    pub end_line: u32,
    pub end_character: u32,
}

impl TagLocation {
    pub(crate) fn new(keyword: &str, tag: &SyntaxNode<'_>) -> Self {
        let start = tag.start_position();
        let end = tag.end_position();
        Self {
            keyword: keyword.to_string(),
            line: start.row,
            character: start.column,
            end_line: end.row,
            end_character: end.column,
        }
    }
}

/// A paired (or assumed-open) block range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScopedBlockInfo {
    pub block_type: BlockType,
    pub start_line: u32,
    pub end_line: u32,
    pub start_character: u32,
}

impl ScopedBlockInfo {
    #[must_use]
    pub fn contains_line(&self, line: u32) -> bool {
        self.start_line <= line && line <= self.end_line
    }
}

/// A closer that matched `outer` while `inner` was still open above it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NestingError {
    pub outer: TagLocation,
    pub inner: TagLocation,
    pub closer: TagLocation,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MisplacedKeyword {
    pub location: TagLocation,
    pub valid_parents: Vec<BlockType>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TagAnalysisResult {
    pub scoped_blocks: Vec<ScopedBlockInfo>,
    pub unclosed: Vec<TagLocation>,
    pub orphan_closers: Vec<TagLocation>,
    pub nesting_errors: Vec<NestingError>,
    pub misplaced_keywords: Vec<MisplacedKeyword>,
}

impl TagAnalysisResult {
    /// Whether the tag structure is free of every error category.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.unclosed.is_empty()
            && self.orphan_closers.is_empty()
            && self.nesting_errors.is_empty()
            && self.misplaced_keywords.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VariableInfo {
    pub name: String,
    pub line: u32,
    pub character: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MacroInfo {
    pub name: String,
    pub parameters: Vec<String>,
    pub line: u32,
    pub character: u32,
}

/// A named `{% block %}` definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlockInfo {
    pub name: String,
    pub line: u32,
    pub character: u32,
    pub end_line: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ForLoopInfo {
    pub variable: String,
    pub key_variable: Option<String>,
    pub start_line: u32,
    pub end_line: u32,
    pub start_character: u32,
}

impl ForLoopInfo {
    #[must_use]
    pub fn contains_line(&self, line: u32) -> bool {
        self.start_line <= line && line <= self.end_line
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScopeEntry {
    pub block_type: BlockType,
    pub start_line: u32,
    pub end_line: u32,
}

/// Blocks enclosing a line, innermost last.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScopeInfo {
    pub block_stack: Vec<ScopeEntry>,
    pub inside_for_loop: bool,
    pub inside_block: bool,
    pub inside_if: bool,
    pub current_for_loop: Option<ForLoopInfo>,
}

impl ScopeInfo {
    #[must_use]
    pub fn contains(&self, block_type: BlockType) -> bool {
        self.block_stack
            .iter()
            .any(|entry| entry.block_type == block_type)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DocumentAnalysis {
    pub variables: Vec<VariableInfo>,
    pub macros: Vec<MacroInfo>,
    pub blocks: Vec<BlockInfo>,
    pub for_loops: Vec<ForLoopInfo>,
}
