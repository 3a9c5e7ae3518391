//! Completion items for a cursor position.
//!
//! The lexical context picks a strategy; scope information from the tree
//! then narrows keywords and adds document symbols.

use tower_lsp_server::ls_types;
use twigls_semantic::classify;
use twigls_semantic::extract_blocks;
use twigls_semantic::extract_macros;
use twigls_semantic::get_available_variables;
use twigls_semantic::get_scope_at_position;
use twigls_semantic::ScopeInfo;
use twigls_semantic::TagClass;
use twigls_source::LineCol;
use twigls_source::LineIndex;
use twigls_source::PositionEncoding;
use twigls_syntax::SyntaxTree;

use crate::builtins;
use crate::builtins::Builtin;
use crate::context::detect_lexical_context;
use crate::context::ContextKind;
use crate::context::LexicalContext;

/// Main entry point for completion requests.
///
/// `tree` is the latest parse of `text`, if there is one. Without a tree only
/// the static tables are offered.
#[must_use]
pub fn handle_completion(
    text: &str,
    tree: Option<&SyntaxTree>,
    position: ls_types::Position,
    encoding: PositionEncoding,
) -> Vec<ls_types::CompletionItem> {
    let line_index = LineIndex::new(text);
    let offset = line_index
        .offset(
            LineCol::new(position.line, position.character),
            text,
            encoding,
        )
        .unwrap_or(line_index.len());

    let context = detect_lexical_context(text, offset);
    let Some(tree) = tree else {
        return static_completions(&context);
    };

    let scope = get_scope_at_position(tree, position.line, position.character);

    if context.is_after_loop_dot {
        if scope.inside_for_loop {
            return builtins::LOOP_PROPERTIES
                .iter()
                .map(|b| builtin_item(b, ls_types::CompletionItemKind::PROPERTY))
                .collect();
        }
        return Vec::new();
    }

    if context.is_in_block_function || context.is_after_block_keyword {
        return block_name_completions(tree);
    }

    let mut completions = match context.kind {
        ContextKind::None => return Vec::new(),
        ContextKind::Filter => return filter_completions(),
        ContextKind::Block | ContextKind::Output if context.is_after_is_keyword => {
            return test_completions();
        }
        ContextKind::Block => {
            let mut items = keyword_completions(Some(&scope));
            items.extend(function_completions());
            items
        }
        ContextKind::Output => function_completions(),
    };

    completions.extend(variable_completions(tree, position));
    completions.extend(macro_completions(tree));
    if scope.inside_for_loop {
        completions.push(loop_variable_completion());
    }

    prioritize_parent(completions, scope.inside_block)
}

fn static_completions(context: &LexicalContext) -> Vec<ls_types::CompletionItem> {
    match context.kind {
        ContextKind::None => Vec::new(),
        ContextKind::Filter => filter_completions(),
        ContextKind::Block | ContextKind::Output if context.is_after_is_keyword => {
            test_completions()
        }
        ContextKind::Block => {
            let mut items = keyword_completions(None);
            items.extend(function_completions());
            items
        }
        ContextKind::Output => function_completions(),
    }
}

fn builtin_item(builtin: &Builtin, kind: ls_types::CompletionItemKind) -> ls_types::CompletionItem {
    ls_types::CompletionItem {
        label: builtin.label.to_string(),
        kind: Some(kind),
        detail: Some(builtin.detail.to_string()),
        insert_text: builtin.snippet.map(str::to_string),
        insert_text_format: builtin
            .snippet
            .map(|_| ls_types::InsertTextFormat::SNIPPET),
        ..Default::default()
    }
}

fn markdown(value: String) -> ls_types::Documentation {
    ls_types::Documentation::MarkupContent(ls_types::MarkupContent {
        kind: ls_types::MarkupKind::Markdown,
        value,
    })
}

fn filter_completions() -> Vec<ls_types::CompletionItem> {
    builtins::FILTERS
        .iter()
        .map(|b| builtin_item(b, ls_types::CompletionItemKind::FUNCTION))
        .collect()
}

fn test_completions() -> Vec<ls_types::CompletionItem> {
    builtins::TESTS
        .iter()
        .map(|b| builtin_item(b, ls_types::CompletionItemKind::KEYWORD))
        .collect()
}

fn function_completions() -> Vec<ls_types::CompletionItem> {
    builtins::FUNCTIONS
        .iter()
        .map(|b| builtin_item(b, ls_types::CompletionItemKind::FUNCTION))
        .collect()
}

fn keyword_completions(scope: Option<&ScopeInfo>) -> Vec<ls_types::CompletionItem> {
    builtins::KEYWORDS
        .iter()
        .filter(|b| scope.is_none_or(|scope| keyword_in_scope(b.label, scope)))
        .map(|b| builtin_item(b, ls_types::CompletionItemKind::KEYWORD))
        .collect()
}

/// Closers only inside their block, `else` only inside `if` or `for`,
/// `elseif` only inside `if`.
fn keyword_in_scope(keyword: &str, scope: &ScopeInfo) -> bool {
    match keyword {
        "else" => scope.inside_if || scope.inside_for_loop,
        "elseif" => scope.inside_if,
        _ => match classify(keyword) {
            TagClass::Closer(block_type) => scope.contains(block_type),
            _ => true,
        },
    }
}

fn variable_completions(
    tree: &SyntaxTree,
    position: ls_types::Position,
) -> impl Iterator<Item = ls_types::CompletionItem> {
    get_available_variables(tree, position.line, position.character)
        .into_iter()
        .map(|variable| ls_types::CompletionItem {
            label: variable.name,
            kind: Some(ls_types::CompletionItemKind::VARIABLE),
            detail: Some("Variable".to_string()),
            documentation: Some(markdown(format!(
                "Variable defined at line {}",
                variable.line + 1
            ))),
            ..Default::default()
        })
}

fn macro_completions(tree: &SyntaxTree) -> impl Iterator<Item = ls_types::CompletionItem> {
    extract_macros(tree).into_iter().map(|m| {
        let insert_text = if m.parameters.is_empty() {
            format!("{}()", m.name)
        } else {
            let placeholders = m
                .parameters
                .iter()
                .enumerate()
                .map(|(i, param)| format!("${{{}:{param}}}", i + 1))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}({placeholders})", m.name)
        };
        let parameters = m.parameters.join(", ");
        let documented = if parameters.is_empty() {
            "none"
        } else {
            parameters.as_str()
        };

        ls_types::CompletionItem {
            documentation: Some(markdown(format!(
                "Macro defined at line {}\n\n**Parameters:** {documented}",
                m.line + 1
            ))),
            detail: Some(format!("Macro({parameters})")),
            label: m.name,
            kind: Some(ls_types::CompletionItemKind::FUNCTION),
            insert_text: Some(insert_text),
            insert_text_format: Some(ls_types::InsertTextFormat::SNIPPET),
            ..Default::default()
        }
    })
}

fn block_name_completions(tree: &SyntaxTree) -> Vec<ls_types::CompletionItem> {
    extract_blocks(tree)
        .into_iter()
        .map(|block| ls_types::CompletionItem {
            label: block.name,
            kind: Some(ls_types::CompletionItemKind::CLASS),
            detail: Some("Block".to_string()),
            documentation: Some(markdown(format!(
                "Block defined at line {}",
                block.line + 1
            ))),
            ..Default::default()
        })
        .collect()
}

fn loop_variable_completion() -> ls_types::CompletionItem {
    ls_types::CompletionItem {
        label: "loop".to_string(),
        kind: Some(ls_types::CompletionItemKind::VARIABLE),
        detail: Some("Loop variable".to_string()),
        documentation: Some(markdown(
            "Access loop information like `loop.index`, `loop.first`, `loop.last`, etc."
                .to_string(),
        )),
        ..Default::default()
    }
}

/// Inside `{% block %}`, move `parent` to the front and preselect it.
fn prioritize_parent(
    mut completions: Vec<ls_types::CompletionItem>,
    inside_block: bool,
) -> Vec<ls_types::CompletionItem> {
    if !inside_block {
        return completions;
    }

    if let Some(index) = completions
        .iter()
        .position(|item| item.label == "parent")
        .filter(|&index| index > 0)
    {
        let mut parent = completions.remove(index);
        parent.sort_text = Some("0000parent".to_string());
        parent.preselect = Some(true);
        completions.insert(0, parent);
    }

    completions
}
