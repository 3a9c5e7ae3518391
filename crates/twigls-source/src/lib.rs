mod line_index;
mod position;
mod span;

pub use line_index::LineIndex;
pub use position::LineCol;
pub use position::PositionEncoding;
pub use span::Span;
