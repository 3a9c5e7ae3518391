//! Editor features for Twig templates.
//!
//! Each module turns a parsed [`twigls_syntax::SyntaxTree`] and the semantic
//! analysis over it into LSP types, leaving transport to the server crate.

pub mod builtins;
pub mod completions;
pub mod context;
pub mod diagnostics;
pub mod navigation;
pub mod semantic_tokens;

/// Reported as the `source` of every diagnostic.
pub const SOURCE_NAME: &str = "twigls";

pub use completions::handle_completion;
pub use context::detect_lexical_context;
pub use context::ContextKind;
pub use context::LexicalContext;
pub use diagnostics::collect_diagnostics;
pub use diagnostics::render_diagnostic;
pub use navigation::goto_include_definition;
pub use semantic_tokens::legend;
pub use semantic_tokens::semantic_tokens;
