use crate::LineCol;
use crate::PositionEncoding;

/// Pre-computed line start offsets for position/offset conversion.
///
/// Line starts are byte offsets, so finding the line of an offset is a binary
/// search and only the column walk depends on the encoding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    length: u32,
}

impl LineIndex {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut pos: u32 = 0;

        for c in text.chars() {
            pos += u32::try_from(c.len_utf8()).unwrap_or(0);
            if c == '\n' {
                line_starts.push(pos);
            }
        }

        Self {
            line_starts,
            length: pos,
        }
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    #[must_use]
    pub fn len(&self) -> u32 {
        self.length
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Byte offset where `line` starts.
    #[must_use]
    pub fn line_start(&self, line: u32) -> Option<u32> {
        self.line_starts.get(line as usize).copied()
    }

    /// Byte offset one past the end of `line`, including its line terminator.
    #[must_use]
    pub fn line_end(&self, line: u32) -> Option<u32> {
        self.line_start(line)?;
        Some(
            self.line_starts
                .get(line as usize + 1)
                .copied()
                .unwrap_or(self.length),
        )
    }

    /// Convert a byte offset into a line/column pair.
    ///
    /// Offsets past the end of the text clamp to the end.
    #[must_use]
    pub fn line_col(&self, offset: u32, text: &str, encoding: PositionEncoding) -> LineCol {
        let offset = offset.min(self.length);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };

        let line_start = self.line_starts[line];
        let column = match encoding {
            PositionEncoding::Utf8 => offset - line_start,
            PositionEncoding::Utf16 => text
                .get(line_start as usize..offset as usize)
                .map_or(offset - line_start, |prefix| encoding.str_len(prefix)),
        };

        LineCol::new(u32::try_from(line).unwrap_or(u32::MAX), column)
    }

    /// Convert a line/column pair into a byte offset.
    ///
    /// Columns past the end of the line clamp to the line end (before its
    /// terminator). Returns `None` when the line does not exist.
    #[must_use]
    pub fn offset(&self, position: LineCol, text: &str, encoding: PositionEncoding) -> Option<u32> {
        let line_start = self.line_start(position.line())?;
        let line_end = self.line_end(position.line())?;
        let line_text = text.get(line_start as usize..line_end as usize)?;
        let content = line_text.trim_end_matches(['\n', '\r']);

        let mut units = 0;
        let mut bytes = 0;
        for c in content.chars() {
            if units >= position.column() {
                break;
            }
            units += encoding.char_len(c);
            bytes += u32::try_from(c.len_utf8()).unwrap_or(0);
        }

        Some(line_start + bytes)
    }
}
