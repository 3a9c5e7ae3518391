use tower_lsp_server::ls_types;
use twigls_conf::DiagnosticsSettings;
use twigls_semantic::analyze_tags;
use twigls_semantic::MisplacedKeyword;
use twigls_semantic::NestingError;
use twigls_semantic::TagAnalysisResult;
use twigls_semantic::TagLocation;
use twigls_syntax::SyntaxKind;
use twigls_syntax::SyntaxNode;
use twigls_syntax::SyntaxTree;

const INLINE_COMMENT_MESSAGE: &str =
    "Inline comment extends to end of line. Move closing delimiter to next line.";

/// A problem that can be reported to the client.
trait DiagnosticError {
    fn range(&self) -> ls_types::Range;
    fn diagnostic_code(&self) -> &'static str;
    fn message(&self) -> String;

    fn as_diagnostic(&self) -> ls_types::Diagnostic {
        ls_types::Diagnostic {
            range: self.range(),
            severity: Some(ls_types::DiagnosticSeverity::WARNING),
            code: Some(ls_types::NumberOrString::String(
                self.diagnostic_code().to_string(),
            )),
            code_description: None,
            source: Some(crate::SOURCE_NAME.to_string()),
            message: self.message(),
            related_information: None,
            tags: None,
            data: None,
        }
    }
}

fn location_range(location: &TagLocation) -> ls_types::Range {
    ls_types::Range::new(
        ls_types::Position::new(location.line, location.character),
        ls_types::Position::new(location.end_line, location.end_character),
    )
}

fn node_range(node: &SyntaxNode<'_>) -> ls_types::Range {
    let start = node.start_position();
    let end = node.end_position();
    ls_types::Range::new(
        ls_types::Position::new(start.row, start.column),
        ls_types::Position::new(end.row, end.column),
    )
}

enum BlockTagError<'a> {
    Unclosed(&'a TagLocation),
    OrphanCloser(&'a TagLocation),
    Nesting(&'a NestingError),
    Misplaced(&'a MisplacedKeyword),
}

impl DiagnosticError for BlockTagError<'_> {
    fn range(&self) -> ls_types::Range {
        match self {
            BlockTagError::Unclosed(tag) | BlockTagError::OrphanCloser(tag) => location_range(tag),
            BlockTagError::Nesting(error) => location_range(&error.closer),
            BlockTagError::Misplaced(misplaced) => location_range(&misplaced.location),
        }
    }

    fn diagnostic_code(&self) -> &'static str {
        match self {
            BlockTagError::Unclosed(_) => "T100",
            BlockTagError::OrphanCloser(_) => "T101",
            BlockTagError::Nesting(_) => "T102",
            BlockTagError::Misplaced(_) => "T103",
        }
    }

    fn message(&self) -> String {
        match self {
            BlockTagError::Unclosed(tag) => {
                format!(
                    "Unclosed {{% {kw} %}} — expected {{% end{kw} %}}",
                    kw = tag.keyword
                )
            }
            BlockTagError::OrphanCloser(tag) => {
                let opener = tag.keyword.strip_prefix("end").unwrap_or(&tag.keyword);
                format!(
                    "Unexpected {{% {} %}} — no matching {{% {opener} %}}",
                    tag.keyword
                )
            }
            BlockTagError::Nesting(error) => format!(
                "{{% {} %}} at line {} was closed while {{% {} %}} at line {} was still open",
                error.outer.keyword,
                error.outer.line + 1,
                error.inner.keyword,
                error.inner.line + 1
            ),
            BlockTagError::Misplaced(misplaced) => {
                let parents = misplaced
                    .valid_parents
                    .iter()
                    .map(|parent| format!("{{% {parent} %}}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "{{% {} %}} is only valid inside {parents}",
                    misplaced.location.keyword
                )
            }
        }
    }
}

struct InlineCommentError<'t> {
    comment: SyntaxNode<'t>,
}

impl DiagnosticError for InlineCommentError<'_> {
    fn range(&self) -> ls_types::Range {
        node_range(&self.comment)
    }

    fn diagnostic_code(&self) -> &'static str {
        "T200"
    }

    fn message(&self) -> String {
        INLINE_COMMENT_MESSAGE.to_string()
    }
}

/// Map the pairing automaton's four error categories to diagnostics, in
/// category order.
#[must_use]
pub fn block_tag_diagnostics(result: &TagAnalysisResult) -> Vec<ls_types::Diagnostic> {
    let unclosed = result.unclosed.iter().map(BlockTagError::Unclosed);
    let orphans = result.orphan_closers.iter().map(BlockTagError::OrphanCloser);
    let nesting = result.nesting_errors.iter().map(BlockTagError::Nesting);
    let misplaced = result.misplaced_keywords.iter().map(BlockTagError::Misplaced);

    unclosed
        .chain(orphans)
        .chain(nesting)
        .chain(misplaced)
        .map(|error| error.as_diagnostic())
        .collect()
}

#[must_use]
pub fn validate_block_tags(tree: &SyntaxTree) -> Vec<ls_types::Diagnostic> {
    block_tag_diagnostics(&analyze_tags(tree))
}

/// Flag `#` comments sharing a line with their construct's closing
/// delimiter; Twig would treat the delimiter as part of the comment.
#[must_use]
pub fn validate_inline_comments(tree: &SyntaxTree) -> Vec<ls_types::Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut cursor = tree.walk();

    loop {
        let node = cursor.node();
        if matches!(
            node.kind(),
            SyntaxKind::OutputStatement | SyntaxKind::StatementBlock
        ) {
            check_construct(&node, &mut diagnostics);
        }

        if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return diagnostics;
            }
        }
    }
}

fn check_construct(construct: &SyntaxNode<'_>, diagnostics: &mut Vec<ls_types::Diagnostic>) {
    let Some(delimiter) = construct
        .last_child()
        .filter(|last| last.kind().is_closing_delimiter())
    else {
        return;
    };
    let delimiter_row = delimiter.start_position().row;

    let mut stack: Vec<SyntaxNode<'_>> = construct.children().collect();
    while let Some(node) = stack.pop() {
        if node.kind() == SyntaxKind::InlineComment {
            if node.start_position().row == delimiter_row {
                diagnostics.push(InlineCommentError { comment: node }.as_diagnostic());
            }
        } else {
            stack.extend(node.children());
        }
    }
}

/// All diagnostics for a tree, honouring the enabled producers.
#[must_use]
pub fn collect_diagnostics(
    tree: &SyntaxTree,
    settings: &DiagnosticsSettings,
) -> Vec<ls_types::Diagnostic> {
    let mut diagnostics = Vec::new();

    if settings.block_tags_enabled() {
        diagnostics.extend(validate_block_tags(tree));
    }
    if settings.inline_comments_enabled() {
        diagnostics.extend(validate_inline_comments(tree));
    }

    diagnostics
}

/// One-line rendering used by the command line: `path:line:col: warning[CODE]: message`
/// with 1-based line and column.
#[must_use]
pub fn render_diagnostic(path: &str, diagnostic: &ls_types::Diagnostic) -> String {
    let severity = match diagnostic.severity {
        Some(ls_types::DiagnosticSeverity::ERROR) => "error",
        Some(ls_types::DiagnosticSeverity::INFORMATION) => "info",
        Some(ls_types::DiagnosticSeverity::HINT) => "hint",
        _ => "warning",
    };
    let code = match &diagnostic.code {
        Some(ls_types::NumberOrString::String(code)) => format!("[{code}]"),
        Some(ls_types::NumberOrString::Number(code)) => format!("[{code}]"),
        None => String::new(),
    };
    format!(
        "{path}:{}:{}: {severity}{code}: {}",
        diagnostic.range.start.line + 1,
        diagnostic.range.start.character + 1,
        diagnostic.message
    )
}

#[cfg(test)]
mod tests {
    use twigls_syntax::Parser;

    use super::*;

    fn diagnostics(source: &str) -> Vec<ls_types::Diagnostic> {
        collect_diagnostics(
            &Parser::new().parse_text(source),
            &DiagnosticsSettings::default(),
        )
    }

    fn render(source: &str) -> String {
        diagnostics(source)
            .iter()
            .map(|d| render_diagnostic("t.twig", d))
            .collect::<Vec<_>>()
            .join("\n")
    }

    mod block_tags {
        use super::*;

        #[test]
        fn test_unclosed() {
            insta::assert_snapshot!(
                render("{% if c %}text"),
                @"t.twig:1:1: warning[T100]: Unclosed {% if %} — expected {% endif %}"
            );
        }

        #[test]
        fn test_orphan() {
            insta::assert_snapshot!(
                render("\n  {% endfor %}"),
                @"t.twig:2:3: warning[T101]: Unexpected {% endfor %} — no matching {% for %}"
            );
        }

        #[test]
        fn test_nesting() {
            insta::assert_snapshot!(
                render("{% for i in x %}\n{% if c %}\n{{i}}\n{% endfor %}"),
                @"t.twig:4:1: warning[T102]: {% for %} at line 1 was closed while {% if %} at line 2 was still open"
            );
        }

        #[test]
        fn test_misplaced() {
            insta::assert_snapshot!(
                render("{% else %}\n{% elseif x %}"),
                @r"
            t.twig:1:1: warning[T103]: {% else %} is only valid inside {% if %}, {% for %}
            t.twig:2:1: warning[T103]: {% elseif %} is only valid inside {% if %}
            "
            );
        }

        #[test]
        fn test_category_order() {
            let codes: Vec<_> = diagnostics("{% else %}{% for a in b %}{% if c %}{% endfor %}{% endblock %}{% with %}")
                .into_iter()
                .map(|d| d.code)
                .collect();
            let expected: Vec<_> = ["T100", "T101", "T102", "T103"]
                .into_iter()
                .map(|code| Some(ls_types::NumberOrString::String(code.to_string())))
                .collect();
            assert_eq!(codes, expected);
        }

        #[test]
        fn test_fixed_severity_and_source() {
            let all = diagnostics("{% else %}{% endif %}{% block a %}");
            assert_eq!(all.len(), 3);
            for diagnostic in all {
                assert_eq!(
                    diagnostic.severity,
                    Some(ls_types::DiagnosticSeverity::WARNING)
                );
                assert_eq!(diagnostic.source.as_deref(), Some("twigls"));
            }
        }

        #[test]
        fn test_range_spans_whole_tag() {
            let all = diagnostics("ab {%- endif -%}");
            assert_eq!(
                all[0].range,
                ls_types::Range::new(
                    ls_types::Position::new(0, 3),
                    ls_types::Position::new(0, 16)
                )
            );
        }

        #[test]
        fn test_well_formed_document_is_clean() {
            assert!(diagnostics(
                "{% block a %}{% for x in y %}{% if x %}{% else %}{% endif %}{% endfor %}{% endblock %}"
            )
            .is_empty());
        }
    }

    mod inline_comments {
        use super::*;

        #[test]
        fn test_comment_on_delimiter_line() {
            insta::assert_snapshot!(
                render("{{ name # the name }}"),
                @"t.twig:1:9: warning[T200]: Inline comment extends to end of line. Move closing delimiter to next line."
            );
        }

        #[test]
        fn test_comment_with_delimiter_on_next_line() {
            assert!(diagnostics("{% set x = 1 # one\n%}").is_empty());
        }

        #[test]
        fn test_unterminated_construct_is_skipped() {
            assert!(diagnostics("{{ a # note").is_empty());
        }
    }

    mod settings {
        use super::*;

        #[test]
        fn test_toggles() {
            let tree = Parser::new().parse_text("{% if a %}{{ b # c }}");

            let all = collect_diagnostics(&tree, &DiagnosticsSettings::default());
            assert_eq!(all.len(), 2);

            let no_tags = DiagnosticsSettings {
                block_tags: false,
                ..Default::default()
            };
            assert_eq!(collect_diagnostics(&tree, &no_tags).len(), 1);

            let no_comments = DiagnosticsSettings {
                inline_comments: false,
                ..Default::default()
            };
            assert_eq!(collect_diagnostics(&tree, &no_comments).len(), 1);

            let off = DiagnosticsSettings {
                enabled: false,
                ..Default::default()
            };
            assert!(collect_diagnostics(&tree, &off).is_empty());
        }
    }
}
