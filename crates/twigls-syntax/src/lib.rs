mod builder;
mod cursor;
mod kind;
mod parser;
mod provider;
mod stream;
mod tree;

pub use cursor::TreeCursor;
pub use kind::SyntaxKind;
pub use parser::Parser;
pub use provider::InputEdit;
pub use provider::TreeProvider;
pub use stream::TagStream;
pub use tree::Point;
pub use tree::SyntaxNode;
pub use tree::SyntaxTree;
