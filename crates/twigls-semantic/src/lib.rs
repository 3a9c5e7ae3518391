mod analysis;
mod scope;
mod symbols;
mod tags;
mod types;

pub use analysis::analyze_tags;
pub use analysis::UNCLOSED_LINE_PADDING;
pub use scope::analyze_document;
pub use scope::get_available_variables;
pub use scope::get_scope_at_position;
pub use symbols::extract_blocks;
pub use symbols::extract_for_loops;
pub use symbols::extract_macros;
pub use symbols::extract_set_variables;
pub use tags::classify;
pub use tags::tag_keyword;
pub use tags::BlockType;
pub use tags::TagClass;
pub use types::BlockInfo;
pub use types::DocumentAnalysis;
pub use types::ForLoopInfo;
pub use types::MacroInfo;
pub use types::MisplacedKeyword;
pub use types::NestingError;
pub use types::ScopeEntry;
pub use types::ScopeInfo;
pub use types::ScopedBlockInfo;
pub use types::TagAnalysisResult;
pub use types::TagLocation;
pub use types::VariableInfo;
