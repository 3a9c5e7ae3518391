use tracing::debug;
use tracing::warn;

use crate::builder::TreeBuilder;
use crate::kind::SyntaxKind;
use crate::provider::InputEdit;
use crate::provider::TreeProvider;
use crate::tree::SyntaxTree;

const OUTPUT_START: &str = "{{";
const STATEMENT_START: &str = "{%";
const COMMENT_START: &str = "{#";
const COMMENT_END: &str = "#}";

const WORD_OPERATORS: &[&str] = &["and", "or", "not", "is"];
const DOUBLE_OPERATORS: &[&str] = &["==", "!=", "<=", ">=", "..", "??"];
const SINGLE_OPERATORS: &[u8] = b"+-*/%~<>?:=,";

/// The built-in Twig parser.
///
/// Produces a full concrete syntax tree for any input; malformed constructs
/// become `ERROR` nodes or nodes flagged with `has_error` rather than failing.
/// It holds no incremental state, so `reparse` always parses from scratch.
#[derive(Clone, Debug, Default)]
pub struct Parser;

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn parse_text(&self, source: &str) -> SyntaxTree {
        Scanner::new(source).parse()
    }
}

impl TreeProvider for Parser {
    fn parse(&mut self, text: &str) -> Option<SyntaxTree> {
        debug!(len = text.len(), "full parse");
        Some(self.parse_text(text))
    }

    fn reparse(
        &mut self,
        text: &str,
        _old_tree: &SyntaxTree,
        edits: &[InputEdit],
    ) -> Option<SyntaxTree> {
        for edit in edits {
            if let Err(reason) = edit.validate(text.len()) {
                warn!(?edit, reason, "ignoring inconsistent edit");
            }
        }
        debug!(len = text.len(), edits = edits.len(), "reparse");
        Some(self.parse_text(text))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Construct {
    Output,
    Statement,
}

impl Construct {
    /// Length of the closing delimiter at the start of `rest`, if any.
    fn close_len(self, rest: &str) -> Option<usize> {
        let (trimmed, plain) = match self {
            Construct::Output => ("-}}", "}}"),
            Construct::Statement => ("-%}", "%}"),
        };
        if rest.starts_with(trimmed) {
            Some(trimmed.len())
        } else if rest.starts_with(plain) {
            Some(plain.len())
        } else {
            None
        }
    }

    /// Byte position of the first closing delimiter within `line`.
    fn find_close(self, line: &str) -> Option<usize> {
        let plain = match self {
            Construct::Output => "}}",
            Construct::Statement => "%}",
        };
        let at = line.find(plain)?;
        if at > 0 && line.as_bytes()[at - 1] == b'-' {
            Some(at - 1)
        } else {
            Some(at)
        }
    }
}

/// Why an expression run stopped.
enum Stop {
    /// At the construct's closing delimiter, which has this length.
    Delimiter(usize),
    /// At the closing bracket of the enclosing group.
    Group,
    /// At end of input or at the start of another construct.
    Interrupted,
}

struct Scanner<'s> {
    source: &'s str,
    pos: usize,
    last_end: usize,
    builder: TreeBuilder,
}

impl<'s> Scanner<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            pos: 0,
            last_end: 0,
            builder: TreeBuilder::new(),
        }
    }

    fn parse(mut self) -> SyntaxTree {
        self.builder.start_node(SyntaxKind::SourceFile, 0);

        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            if self.at(OUTPUT_START) {
                self.parse_construct(Construct::Output);
            } else if self.at(STATEMENT_START) {
                self.parse_construct(Construct::Statement);
            } else if self.at(COMMENT_START) {
                self.parse_comment();
            } else {
                self.parse_raw_content();
            }
        }

        self.builder.finish_node(self.source.len());
        self.builder.finish(self.source.to_string())
    }

    fn rest(&self) -> &'s str {
        &self.source[self.pos..]
    }

    fn at(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    fn at_construct_start(&self) -> bool {
        self.at(OUTPUT_START) || self.at(STATEMENT_START) || self.at(COMMENT_START)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn leaf(&mut self, kind: SyntaxKind, len: usize) -> crate::tree::NodeId {
        let start = self.pos;
        self.pos += len;
        self.last_end = self.pos;
        self.builder.leaf(kind, start, self.pos)
    }

    fn parse_raw_content(&mut self) {
        let start = self.pos;
        let end = [OUTPUT_START, STATEMENT_START, COMMENT_START]
            .iter()
            .filter_map(|opener| self.rest().find(opener))
            .min()
            .map_or(self.source.len(), |at| self.pos + at);
        let trimmed = self.source[start..end].trim_end().len();
        self.builder
            .leaf(SyntaxKind::RawContent, start, start + trimmed);
        self.pos = end;
        self.last_end = start + trimmed;
    }

    fn parse_comment(&mut self) {
        let start = self.pos;
        let node = self.builder.start_node(SyntaxKind::Comment, start);
        self.leaf(SyntaxKind::CommentStart, COMMENT_START.len());

        let (body_end, closed) = match self.rest().find(COMMENT_END) {
            Some(at) => (self.pos + at, true),
            None => (self.source.len(), false),
        };

        let body = &self.source[self.pos..body_end];
        let content = body.trim();
        if !content.is_empty() {
            let content_start = self.pos + (body.len() - body.trim_start().len());
            self.builder.leaf(
                SyntaxKind::CommentContent,
                content_start,
                content_start + content.len(),
            );
        }
        self.pos = body_end;
        self.last_end = body_end;

        if closed {
            self.leaf(SyntaxKind::CommentEnd, COMMENT_END.len());
        } else {
            self.builder.mark_error(node);
        }
        self.builder.finish_node(self.last_end);
    }

    fn parse_construct(&mut self, construct: Construct) {
        let (kind, open_kind, close_kind) = match construct {
            Construct::Output => (
                SyntaxKind::OutputStatement,
                SyntaxKind::OutputStart,
                SyntaxKind::OutputEnd,
            ),
            Construct::Statement => (
                SyntaxKind::StatementBlock,
                SyntaxKind::StatementStart,
                SyntaxKind::StatementEnd,
            ),
        };

        let node = self.builder.start_node(kind, self.pos);
        let open_len = if self.peek_byte_at(2) == Some(b'-') { 3 } else { 2 };
        self.leaf(open_kind, open_len);

        if construct == Construct::Statement {
            self.skip_whitespace();
            if construct.close_len(self.rest()).is_none() && self.peek().is_some_and(is_word_start) {
                let len = self.word_len();
                self.leaf(SyntaxKind::Keyword, len);
            }
        }

        match self.parse_expression(construct, None) {
            Stop::Delimiter(len) => {
                self.leaf(close_kind, len);
            }
            Stop::Group | Stop::Interrupted => {
                self.builder.mark_error(node);
            }
        }
        self.builder.finish_node(self.last_end);
    }

    fn parse_expression(&mut self, construct: Construct, group_close: Option<u8>) -> Stop {
        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else {
                return Stop::Interrupted;
            };
            if let Some(len) = construct.close_len(self.rest()) {
                return Stop::Delimiter(len);
            }
            if self.at_construct_start() {
                return Stop::Interrupted;
            }
            if group_close.is_some_and(|close| self.peek_byte_at(0) == Some(close)) {
                return Stop::Group;
            }

            match c {
                '#' => self.parse_inline_comment(construct),
                c if is_word_start(c) => {
                    let len = self.word_len();
                    let word = &self.rest()[..len];
                    let kind = if WORD_OPERATORS.contains(&word) {
                        SyntaxKind::Operator
                    } else {
                        SyntaxKind::Identifier
                    };
                    self.leaf(kind, len);
                }
                c if c.is_ascii_digit() => self.parse_number(),
                '\'' | '"' => self.parse_string(c),
                '.' => self.parse_dot(),
                '|' => self.parse_filter(construct),
                '(' => self.parse_group(
                    construct,
                    SyntaxKind::Parenthesized,
                    SyntaxKind::LParen,
                    SyntaxKind::RParen,
                    b')',
                ),
                '[' => self.parse_group(
                    construct,
                    SyntaxKind::Brackets,
                    SyntaxKind::LBracket,
                    SyntaxKind::RBracket,
                    b']',
                ),
                _ => self.parse_operator(c),
            }
        }
    }

    fn word_len(&self) -> usize {
        self.rest()
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count()
    }

    fn parse_number(&mut self) {
        let rest = self.rest().as_bytes();
        let mut len = rest.iter().take_while(|b| b.is_ascii_digit()).count();
        if rest.get(len) == Some(&b'.') && rest.get(len + 1).is_some_and(u8::is_ascii_digit) {
            len += 1;
            len += rest[len..].iter().take_while(|b| b.is_ascii_digit()).count();
        }
        self.leaf(SyntaxKind::Number, len);
    }

    fn parse_string(&mut self, quote: char) {
        let body = &self.rest()[1..];
        match body.find(quote) {
            Some(at) => {
                self.leaf(SyntaxKind::String, at + 2);
            }
            None => {
                // Unterminated strings stop at the end of their line.
                let len = body.find('\n').unwrap_or(body.len()) + 1;
                let id = self.leaf(SyntaxKind::String, len);
                self.builder.mark_error(id);
            }
        }
    }

    fn parse_dot(&mut self) {
        match self.peek_byte_at(1) {
            Some(b'.') => {
                self.leaf(SyntaxKind::Operator, 2);
            }
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => {
                self.builder
                    .start_node(SyntaxKind::PropertyAccess, self.pos);
                self.leaf(SyntaxKind::Dot, 1);
                let len = self.word_len();
                self.leaf(SyntaxKind::Identifier, len);
                self.builder.finish_node(self.last_end);
            }
            _ => {
                self.leaf(SyntaxKind::Error, 1);
            }
        }
    }

    fn parse_filter(&mut self, construct: Construct) {
        let node = self.builder.start_node(SyntaxKind::Filter, self.pos);
        self.leaf(SyntaxKind::Pipe, 1);

        let resume = self.pos;
        self.skip_whitespace();
        if construct.close_len(self.rest()).is_none() && self.peek().is_some_and(is_word_start) {
            let len = self.word_len();
            self.leaf(SyntaxKind::Identifier, len);
        } else {
            self.pos = resume;
            self.builder.mark_error(node);
        }
        self.builder.finish_node(self.last_end);
    }

    fn parse_group(
        &mut self,
        construct: Construct,
        kind: SyntaxKind,
        open: SyntaxKind,
        close: SyntaxKind,
        close_byte: u8,
    ) {
        let node = self.builder.start_node(kind, self.pos);
        self.leaf(open, 1);
        match self.parse_expression(construct, Some(close_byte)) {
            Stop::Group => {
                self.leaf(close, 1);
            }
            Stop::Delimiter(_) | Stop::Interrupted => {
                self.builder.mark_error(node);
            }
        }
        self.builder.finish_node(self.last_end);
    }

    /// `#` inside a construct comments out the rest of the line. The comment
    /// stops short of a closing delimiter on the same line so the construct
    /// still closes; the IDE layer reports that situation.
    fn parse_inline_comment(&mut self, construct: Construct) {
        let rest = self.rest();
        let line_len = rest.find('\n').unwrap_or(rest.len());
        let line = &rest[..line_len];
        let len = construct.find_close(line).unwrap_or(line_len);
        let len = line[..len].trim_end().len();
        self.leaf(SyntaxKind::InlineComment, len);
    }

    fn parse_operator(&mut self, c: char) {
        let rest = self.rest();
        if DOUBLE_OPERATORS.iter().any(|op| rest.starts_with(op)) {
            self.leaf(SyntaxKind::Operator, 2);
        } else if u8::try_from(c).is_ok_and(|b| SINGLE_OPERATORS.contains(&b)) {
            self.leaf(SyntaxKind::Operator, 1);
        } else {
            self.leaf(SyntaxKind::Error, c.len_utf8());
        }
    }
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sexp(source: &str) -> String {
        Parser::new().parse_text(source).root_node().to_sexp()
    }

    mod constructs {
        use super::*;

        #[test]
        fn test_statement_block() {
            insta::assert_snapshot!(
                sexp("{% if user.active and not banned %}"),
                @"(source_file (statement_block (keyword) (identifier) (property_access (identifier)) (operator) (operator) (identifier)))"
            );
        }

        #[test]
        fn test_output_with_filters() {
            insta::assert_snapshot!(
                sexp("{{ name|upper | default('x') }}"),
                @"(source_file (output_statement (identifier) (filter (identifier)) (filter (identifier)) (parenthesized (string))))"
            );
        }

        #[test]
        fn test_comment_and_raw_content() {
            insta::assert_snapshot!(
                sexp("<p>{# note #}</p>"),
                @"(source_file (raw_content) (comment (comment_content)) (raw_content))"
            );
        }

        #[test]
        fn test_set_with_brackets_and_range() {
            insta::assert_snapshot!(
                sexp("{% set xs = [1, 2.5] ~ (0..3) %}"),
                @"(source_file (statement_block (keyword) (identifier) (operator) (brackets (number) (operator) (number)) (operator) (parenthesized (number) (operator) (number))))"
            );
        }

        #[test]
        fn test_for_loop_in_is_identifier() {
            insta::assert_snapshot!(
                sexp("{% for k, v in items %}"),
                @"(source_file (statement_block (keyword) (identifier) (operator) (identifier) (identifier) (identifier)))"
            );
        }

        #[test]
        fn test_unknown_tag_name_is_keyword() {
            let tree = Parser::new().parse_text("{% enddeprecated %}");
            let keyword = tree.root_node().child(0).unwrap().named_child(0).unwrap();
            assert_eq!(keyword.kind(), SyntaxKind::Keyword);
            assert_eq!(keyword.text(), "enddeprecated");
        }

        #[test]
        fn test_whitespace_control_delimiters() {
            let tree = Parser::new().parse_text("{%- endif -%}{{- x -}}");
            let root = tree.root_node();
            assert!(!root.has_error());
            let output = root.child(1).unwrap();
            assert_eq!(output.first_child().unwrap().text(), "{{-");
            assert_eq!(output.last_child().unwrap().text(), "-}}");
        }

        #[test]
        fn test_modulo_is_not_a_delimiter() {
            insta::assert_snapshot!(
                sexp("{% set r = a % b %}"),
                @"(source_file (statement_block (keyword) (identifier) (operator) (identifier) (operator) (identifier)))"
            );
        }
    }

    mod recovery {
        use super::*;

        #[test]
        fn test_unterminated_statement_stops_at_next_tag() {
            let tree = Parser::new().parse_text("{% if a\ntext {% endif %}");
            let root = tree.root_node();
            assert_eq!(root.child_count(), 2);

            let first = root.child(0).unwrap();
            assert!(first.has_error());
            assert_eq!(first.text(), "{% if a\ntext");

            let second = root.child(1).unwrap();
            assert!(!second.has_error());
            assert_eq!(second.named_child(0).unwrap().text(), "endif");
        }

        #[test]
        fn test_unterminated_comment_runs_to_end() {
            let tree = Parser::new().parse_text("{# open {% if %}");
            let comment = tree.root_node().child(0).unwrap();
            assert_eq!(comment.kind(), SyntaxKind::Comment);
            assert!(comment.has_error());
            assert_eq!(comment.end_byte(), 16);
        }

        #[test]
        fn test_unexpected_character_is_error_node() {
            insta::assert_snapshot!(
                sexp("{{ a @ b }}"),
                @"(source_file (output_statement (identifier) (ERROR) (identifier)))"
            );
            let tree = Parser::new().parse_text("{{ a @ b }}");
            assert!(tree.root_node().has_error());
        }

        #[test]
        fn test_unclosed_group() {
            let tree = Parser::new().parse_text("{{ f(a }}");
            let output = tree.root_node().child(0).unwrap();
            assert_eq!(output.last_child().unwrap().kind(), SyntaxKind::OutputEnd);
            let group = output.named_child(1).unwrap();
            assert_eq!(group.kind(), SyntaxKind::Parenthesized);
            assert!(group.has_error());
            assert_eq!(group.text(), "(a");
        }

        #[test]
        fn test_unterminated_string_stops_at_line_end() {
            let tree = Parser::new().parse_text("{% include 'a.twig %}\n{% endif %}");
            let root = tree.root_node();
            let first = root.child(0).unwrap();
            let string = first.named_child(1).unwrap();
            assert_eq!(string.kind(), SyntaxKind::String);
            assert_eq!(string.text(), "'a.twig %}");
            assert!(first.has_error());
            assert_eq!(root.child(1).unwrap().named_child(0).unwrap().text(), "endif");
        }
    }

    mod inline_comments {
        use super::*;

        #[test]
        fn test_inline_comment_before_delimiter() {
            let tree = Parser::new().parse_text("{{ x # note }}");
            let output = tree.root_node().child(0).unwrap();
            let comment = output.named_child(1).unwrap();
            assert_eq!(comment.kind(), SyntaxKind::InlineComment);
            assert_eq!(comment.text(), "# note");
            assert_eq!(output.last_child().unwrap().kind(), SyntaxKind::OutputEnd);
        }

        #[test]
        fn test_inline_comment_to_line_end() {
            let tree = Parser::new().parse_text("{% set x = 1 # one\n%}");
            let block = tree.root_node().child(0).unwrap();
            let comment = block.child_of_kind(SyntaxKind::InlineComment).unwrap();
            assert_eq!(comment.text(), "# one");
            assert_eq!(block.last_child().unwrap().start_position().row, 1);
        }
    }

    mod provider {
        use super::*;
        use crate::Point;

        #[test]
        fn test_reparse_matches_full_parse() {
            let mut parser = Parser::new();
            let old = parser.parse("{% if a %}").unwrap();
            let edit = InputEdit {
                start_byte: 6,
                old_end_byte: 7,
                new_end_byte: 8,
                start_position: Point::new(0, 6),
                old_end_position: Point::new(0, 7),
                new_end_position: Point::new(0, 8),
            };
            let new = parser.reparse("{% if ab %}", &old, &[edit]).unwrap();
            assert_eq!(new.root_node().to_sexp(), sexp("{% if ab %}"));
            assert_eq!(new.source(), "{% if ab %}");
        }
    }
}
