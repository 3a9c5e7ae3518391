//! Open document text with version tracking.
//!
//! [`TextDocument`] applies LSP content changes and reports each ranged change
//! as an [`InputEdit`] so a tree provider can reuse the previous parse.

use tower_lsp_server::ls_types;
use twigls_source::LineCol;
use twigls_source::LineIndex;
use twigls_source::PositionEncoding;
use twigls_syntax::InputEdit;
use twigls_syntax::Point;

use crate::DocumentError;

#[derive(Clone, Debug)]
pub struct TextDocument {
    content: String,
    version: i32,
    language_id: String,
    line_index: LineIndex,
}

impl TextDocument {
    #[must_use]
    pub fn new(content: String, version: i32, language_id: impl Into<String>) -> Self {
        let line_index = LineIndex::new(&content);
        Self {
            content,
            version,
            language_id: language_id.into(),
            line_index,
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn version(&self) -> i32 {
        self.version
    }

    #[must_use]
    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    #[must_use]
    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Byte offset of an LSP position, clamping columns to the line end.
    #[must_use]
    pub fn offset_at(&self, position: ls_types::Position, encoding: PositionEncoding) -> Option<u32> {
        self.line_index.offset(
            LineCol::new(position.line, position.character),
            &self.content,
            encoding,
        )
    }

    /// Apply `changes` in order and bump the version.
    ///
    /// A change without a range replaces the whole text. Positions on a line
    /// past the last one clamp to the end of the text. Nothing is modified
    /// when any change has a reversed range.
    pub fn apply_changes(
        &mut self,
        changes: Vec<ls_types::TextDocumentContentChangeEvent>,
        version: i32,
        encoding: PositionEncoding,
    ) -> Result<Vec<InputEdit>, DocumentError> {
        let mut content = self.content.clone();
        let mut line_index = self.line_index.clone();
        let mut edits = Vec::with_capacity(changes.len());

        for change in changes {
            let (start, old_end) = match change.range {
                Some(range) => {
                    let start = to_offset(&line_index, &content, range.start, encoding)
                        .ok_or(DocumentError::InvalidRange(range))?;
                    let end = to_offset(&line_index, &content, range.end, encoding)
                        .ok_or(DocumentError::InvalidRange(range))?;
                    if start > end {
                        return Err(DocumentError::InvalidRange(range));
                    }
                    (start, end)
                }
                None => (0, content.len()),
            };

            let start_position = to_point(&line_index, &content, start, encoding);
            let old_end_position = to_point(&line_index, &content, old_end, encoding);

            content.replace_range(start..old_end, &change.text);
            line_index = LineIndex::new(&content);

            let new_end = start + change.text.len();
            edits.push(InputEdit {
                start_byte: start,
                old_end_byte: old_end,
                new_end_byte: new_end,
                start_position,
                old_end_position,
                new_end_position: to_point(&line_index, &content, new_end, encoding),
            });
        }

        self.content = content;
        self.line_index = line_index;
        self.version = version;
        Ok(edits)
    }
}

fn to_offset(
    index: &LineIndex,
    text: &str,
    position: ls_types::Position,
    encoding: PositionEncoding,
) -> Option<usize> {
    if position.line as usize >= index.line_count() {
        return Some(text.len());
    }
    let offset = index.offset(LineCol::new(position.line, position.character), text, encoding)?;
    usize::try_from(offset).ok()
}

fn to_point(index: &LineIndex, text: &str, offset: usize, encoding: PositionEncoding) -> Point {
    let offset = u32::try_from(offset).unwrap_or(u32::MAX);
    let line_col = index.line_col(offset, text, encoding);
    Point::new(line_col.line(), line_col.column())
}
