use tower_lsp_server::ls_types;
use twigls_source::PositionEncoding;
use twigls_syntax::SyntaxKind;
use twigls_syntax::SyntaxNode;
use twigls_syntax::SyntaxTree;

/// Token types in legend order; the index is the encoded token type.
const TOKEN_TYPES: [ls_types::SemanticTokenType; 8] = [
    ls_types::SemanticTokenType::VARIABLE,
    ls_types::SemanticTokenType::PROPERTY,
    ls_types::SemanticTokenType::FUNCTION,
    ls_types::SemanticTokenType::KEYWORD,
    ls_types::SemanticTokenType::OPERATOR,
    ls_types::SemanticTokenType::STRING,
    ls_types::SemanticTokenType::NUMBER,
    ls_types::SemanticTokenType::COMMENT,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
enum TokenType {
    Variable = 0,
    Property,
    Function,
    Keyword,
    Operator,
    String,
    Number,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Token {
    line: u32,
    start: u32,
    length: u32,
    token_type: u32,
}

#[must_use]
pub fn legend() -> ls_types::SemanticTokensLegend {
    ls_types::SemanticTokensLegend {
        token_types: TOKEN_TYPES.to_vec(),
        token_modifiers: Vec::new(),
    }
}

/// Delta-encoded tokens for every classified node inside a Twig construct.
///
/// Nodes with errors are skipped, as is everything outside `{{ }}`, `{% %}`
/// and `{# #}`.
#[must_use]
pub fn semantic_tokens(tree: &SyntaxTree) -> Vec<ls_types::SemanticToken> {
    let mut tokens = Vec::new();
    collect(tree.root_node(), false, &mut tokens);
    tokens.sort_unstable();
    encode(&tokens)
}

fn collect(node: SyntaxNode<'_>, inside_construct: bool, tokens: &mut Vec<Token>) {
    let inside = inside_construct
        || matches!(
            node.kind(),
            SyntaxKind::OutputStatement | SyntaxKind::StatementBlock | SyntaxKind::Comment
        );

    if inside && !node.has_error() {
        if let Some(token_type) = token_type(&node) {
            push_lines(&node, token_type, tokens);
        }
    }

    for child in node.children() {
        collect(child, inside, tokens);
    }
}

/// One token per line the node covers, since tokens cannot span lines.
fn push_lines(node: &SyntaxNode<'_>, token_type: TokenType, tokens: &mut Vec<Token>) {
    let start = node.start_position();
    for (index, line) in node.text().split('\n').enumerate() {
        let length = PositionEncoding::Utf16.str_len(line.trim_end_matches('\r'));
        if length == 0 {
            continue;
        }
        let offset = u32::try_from(index).unwrap_or(u32::MAX);
        tokens.push(Token {
            line: start.row + offset,
            start: if index == 0 { start.column } else { 0 },
            length,
            token_type: token_type as u32,
        });
    }
}

fn token_type(node: &SyntaxNode<'_>) -> Option<TokenType> {
    let token_type = match node.kind() {
        SyntaxKind::Keyword => TokenType::Keyword,
        SyntaxKind::Operator => TokenType::Operator,
        SyntaxKind::String => TokenType::String,
        SyntaxKind::Number => TokenType::Number,
        SyntaxKind::CommentContent => TokenType::Comment,
        SyntaxKind::Identifier => match node.parent().map(|parent| parent.kind()) {
            Some(SyntaxKind::PropertyAccess) => TokenType::Property,
            Some(SyntaxKind::Filter) => TokenType::Function,
            _ => TokenType::Variable,
        },
        _ => return None,
    };
    Some(token_type)
}

fn encode(tokens: &[Token]) -> Vec<ls_types::SemanticToken> {
    let mut previous_line = 0;
    let mut previous_start = 0;

    tokens
        .iter()
        .map(|token| {
            let delta_line = token.line - previous_line;
            let delta_start = if delta_line == 0 {
                token.start - previous_start
            } else {
                token.start
            };
            previous_line = token.line;
            previous_start = token.start;

            ls_types::SemanticToken {
                delta_line,
                delta_start,
                length: token.length,
                token_type: token.token_type,
                token_modifiers_bitset: 0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use twigls_syntax::Parser;

    use super::*;

    /// `line:col len type` per token, with absolute positions.
    fn render(source: &str) -> String {
        let tree = Parser::new().parse_text(source);
        let mut line = 0;
        let mut col = 0;
        semantic_tokens(&tree)
            .iter()
            .map(|token| {
                if token.delta_line == 0 {
                    col += token.delta_start;
                } else {
                    line += token.delta_line;
                    col = token.delta_start;
                }
                let token_types = TOKEN_TYPES;
                let name = token_types[token.token_type as usize].as_str();
                format!("{line}:{col} {} {name}", token.length)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_legend_order() {
        let legend = legend();
        assert_eq!(legend.token_types.len(), 8);
        assert_eq!(legend.token_types[0], ls_types::SemanticTokenType::VARIABLE);
        assert_eq!(legend.token_types[7], ls_types::SemanticTokenType::COMMENT);
        assert!(legend.token_modifiers.is_empty());
    }

    #[test]
    fn test_output_statement() {
        insta::assert_snapshot!(render("{{ user.name|upper }}"), @r"
        0:3 4 variable
        0:8 4 property
        0:13 5 function
        ");
    }

    #[test]
    fn test_statement_block() {
        insta::assert_snapshot!(render("{% set total = 1 + 'a' %}"), @r"
        0:3 3 keyword
        0:7 5 variable
        0:13 1 operator
        0:15 1 number
        0:17 1 operator
        0:19 3 string
        ");
    }

    #[test]
    fn test_comment_and_lines() {
        insta::assert_snapshot!(render("<p>\n{# note #}\n  {{ x }}"), @r"
        1:3 4 comment
        2:5 1 variable
        ");
    }

    #[test]
    fn test_multiline_comment_is_split_per_line() {
        insta::assert_snapshot!(render("{# first\r\n\n  second #}"), @r"
        0:3 5 comment
        2:0 8 comment
        ");
    }

    #[test]
    fn test_text_outside_constructs_is_ignored() {
        assert_eq!(render("if user.name is set"), "");
    }

    #[test]
    fn test_erroneous_nodes_are_skipped() {
        assert_eq!(render("{{ 'unterminated"), "");
    }

    #[test]
    fn test_delta_encoding() {
        let tree = Parser::new().parse_text("{{ a }}\n{{ b }}{{ c }}");
        let tokens: Vec<_> = semantic_tokens(&tree)
            .iter()
            .map(|t| (t.delta_line, t.delta_start, t.length))
            .collect();
        assert_eq!(tokens, vec![(0, 3, 1), (1, 3, 1), (0, 7, 1)]);
    }
}
