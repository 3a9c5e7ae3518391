use serde::Serialize;

/// A line and column position within a text document.
///
/// Both components are 0-based. What a column counts depends on the
/// [`PositionEncoding`] it was produced with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LineCol {
    line: u32,
    column: u32,
}

impl LineCol {
    #[must_use]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[must_use]
    pub fn column(&self) -> u32 {
        self.column
    }
}

/// Unit in which columns are counted.
///
/// LSP clients default to UTF-16 code units; byte columns are what a tree
/// producer sees when it works on raw UTF-8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PositionEncoding {
    Utf8,
    #[default]
    Utf16,
}

impl PositionEncoding {
    /// Width of `ch` in this encoding's units.
    #[must_use]
    pub fn char_len(self, ch: char) -> u32 {
        let len = match self {
            PositionEncoding::Utf8 => ch.len_utf8(),
            PositionEncoding::Utf16 => ch.len_utf16(),
        };
        u32::try_from(len).unwrap_or(0)
    }

    /// Number of units `text` occupies in this encoding.
    #[must_use]
    pub fn str_len(self, text: &str) -> u32 {
        match self {
            PositionEncoding::Utf8 => u32::try_from(text.len()).unwrap_or(u32::MAX),
            PositionEncoding::Utf16 => text.chars().map(|ch| self.char_len(ch)).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_len_by_encoding() {
        let text = "h€llo😀";
        assert_eq!(PositionEncoding::Utf8.str_len(text), 12);
        assert_eq!(PositionEncoding::Utf16.str_len(text), 7);
    }

    #[test]
    fn test_line_col_ordering() {
        assert!(LineCol::new(0, 9) < LineCol::new(1, 0));
        assert!(LineCol::new(2, 3) < LineCol::new(2, 4));
    }
}
