use serde::Serialize;

/// Node kinds produced by the Twig parser.
///
/// Named kinds carry meaning for analysis; anonymous kinds are the delimiter
/// and punctuation tokens between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxKind {
    SourceFile,
    OutputStatement,
    StatementBlock,
    Comment,
    CommentContent,
    RawContent,
    Keyword,
    Identifier,
    PropertyAccess,
    Filter,
    String,
    Number,
    Operator,
    Parenthesized,
    Brackets,
    InlineComment,
    Error,

    OutputStart,
    OutputEnd,
    StatementStart,
    StatementEnd,
    CommentStart,
    CommentEnd,
    Dot,
    Pipe,
    LParen,
    RParen,
    LBracket,
    RBracket,
}

impl SyntaxKind {
    #[must_use]
    pub fn is_named(self) -> bool {
        !matches!(
            self,
            SyntaxKind::OutputStart
                | SyntaxKind::OutputEnd
                | SyntaxKind::StatementStart
                | SyntaxKind::StatementEnd
                | SyntaxKind::CommentStart
                | SyntaxKind::CommentEnd
                | SyntaxKind::Dot
                | SyntaxKind::Pipe
                | SyntaxKind::LParen
                | SyntaxKind::RParen
                | SyntaxKind::LBracket
                | SyntaxKind::RBracket
        )
    }

    /// Closing delimiter of an output statement or statement block.
    #[must_use]
    pub fn is_closing_delimiter(self) -> bool {
        matches!(self, SyntaxKind::OutputEnd | SyntaxKind::StatementEnd)
    }

    /// Grammar name of the kind. Anonymous tokens use their canonical
    /// spelling; whitespace-control variants (`{%-`, `-}}`) share it.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SyntaxKind::SourceFile => "source_file",
            SyntaxKind::OutputStatement => "output_statement",
            SyntaxKind::StatementBlock => "statement_block",
            SyntaxKind::Comment => "comment",
            SyntaxKind::CommentContent => "comment_content",
            SyntaxKind::RawContent => "raw_content",
            SyntaxKind::Keyword => "keyword",
            SyntaxKind::Identifier => "identifier",
            SyntaxKind::PropertyAccess => "property_access",
            SyntaxKind::Filter => "filter",
            SyntaxKind::String => "string",
            SyntaxKind::Number => "number",
            SyntaxKind::Operator => "operator",
            SyntaxKind::Parenthesized => "parenthesized",
            SyntaxKind::Brackets => "brackets",
            SyntaxKind::InlineComment => "inline_comment",
            SyntaxKind::Error => "ERROR",
            SyntaxKind::OutputStart => "{{",
            SyntaxKind::OutputEnd => "}}",
            SyntaxKind::StatementStart => "{%",
            SyntaxKind::StatementEnd => "%}",
            SyntaxKind::CommentStart => "{#",
            SyntaxKind::CommentEnd => "#}",
            SyntaxKind::Dot => ".",
            SyntaxKind::Pipe => "|",
            SyntaxKind::LParen => "(",
            SyntaxKind::RParen => ")",
            SyntaxKind::LBracket => "[",
            SyntaxKind::RBracket => "]",
        }
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
