//! Declaration-site symbol extraction.
//!
//! Each extractor makes its own pass over the tag stream, independent of the
//! pairing automaton, so they still produce results for malformed documents.

use twigls_syntax::SyntaxKind;
use twigls_syntax::SyntaxNode;
use twigls_syntax::SyntaxTree;

use crate::types::BlockInfo;
use crate::types::ForLoopInfo;
use crate::types::MacroInfo;
use crate::types::VariableInfo;

/// Named children of `tag` starting at its keyword, paired with the keyword
/// text.
fn keyword_and_operands<'t>(tag: &SyntaxNode<'t>) -> Option<(&'t str, Vec<SyntaxNode<'t>>)> {
    let named: Vec<_> = tag.named_children().collect();
    let index = named
        .iter()
        .position(|child| child.kind() == SyntaxKind::Keyword)?;
    let keyword = named[index].text();
    Some((keyword, named[index + 1..].to_vec()))
}

fn identifier_text<'t>(node: Option<&SyntaxNode<'t>>) -> Option<&'t str> {
    node.filter(|node| node.kind() == SyntaxKind::Identifier)
        .map(SyntaxNode::text)
}

fn is_operator(node: Option<&SyntaxNode<'_>>, op: &str) -> bool {
    node.is_some_and(|node| node.kind() == SyntaxKind::Operator && node.text() == op)
}

/// Variables declared by `{% set name ... %}`, inline or block form.
#[must_use]
pub fn extract_set_variables(tree: &SyntaxTree) -> Vec<VariableInfo> {
    let mut variables = Vec::new();

    for tag in tree.tags() {
        let Some(("set", operands)) = keyword_and_operands(&tag) else {
            continue;
        };
        if let Some(name) = operands.first().filter(|n| n.kind() == SyntaxKind::Identifier) {
            let start = name.start_position();
            variables.push(VariableInfo {
                name: name.text().to_string(),
                line: start.row,
                character: start.column,
            });
        }
    }

    variables
}

struct OpenLoop {
    variable: String,
    key_variable: Option<String>,
    start_line: u32,
    start_character: u32,
}

/// Loop bindings of every `{% for %}` closed by an `{% endfor %}`.
///
/// Loops are matched with their own stack: each `endfor` pops the nearest
/// open loop regardless of how the rest of the tags pair up.
#[must_use]
pub fn extract_for_loops(tree: &SyntaxTree) -> Vec<ForLoopInfo> {
    let mut loops = Vec::new();
    let mut stack: Vec<OpenLoop> = Vec::new();

    for tag in tree.tags() {
        let Some((keyword, operands)) = keyword_and_operands(&tag) else {
            continue;
        };

        match keyword {
            "for" => {
                let Some(first) = identifier_text(operands.first()) else {
                    continue;
                };
                let (variable, key_variable) = if is_operator(operands.get(1), ",") {
                    let value = identifier_text(operands.get(2)).unwrap_or_default();
                    (value, Some(first.to_string()))
                } else {
                    (first, None)
                };
                if variable.is_empty() {
                    continue;
                }

                let start = tag.start_position();
                stack.push(OpenLoop {
                    variable: variable.to_string(),
                    key_variable,
                    start_line: start.row,
                    start_character: start.column,
                });
            }
            "endfor" => {
                if let Some(open) = stack.pop() {
                    loops.push(ForLoopInfo {
                        variable: open.variable,
                        key_variable: open.key_variable,
                        start_line: open.start_line,
                        end_line: tag.end_position().row,
                        start_character: open.start_character,
                    });
                }
            }
            _ => {}
        }
    }

    loops
}

/// Macro definitions with their parameter names.
///
/// Default values are skipped: after an `=` nothing counts as a parameter
/// until the next `,`.
#[must_use]
pub fn extract_macros(tree: &SyntaxTree) -> Vec<MacroInfo> {
    let mut macros = Vec::new();

    for tag in tree.tags() {
        let Some(("macro", operands)) = keyword_and_operands(&tag) else {
            continue;
        };
        let Some(name) = operands.first().filter(|n| n.kind() == SyntaxKind::Identifier) else {
            continue;
        };

        let parameters = operands
            .get(1)
            .filter(|n| n.kind() == SyntaxKind::Parenthesized)
            .map(parameter_names)
            .unwrap_or_default();

        let start = name.start_position();
        macros.push(MacroInfo {
            name: name.text().to_string(),
            parameters,
            line: start.row,
            character: start.column,
        });
    }

    macros
}

fn parameter_names(list: &SyntaxNode<'_>) -> Vec<String> {
    let mut names = Vec::new();
    let mut in_default = false;

    for child in list.named_children() {
        match child.kind() {
            SyntaxKind::Identifier if !in_default => names.push(child.text().to_string()),
            SyntaxKind::Operator if child.text() == "=" => in_default = true,
            SyntaxKind::Operator if child.text() == "," => in_default = false,
            _ => {}
        }
    }

    names
}

/// Named `{% block %}` definitions closed by an `{% endblock %}`. The name
/// after `endblock` is not checked against the opener.
#[must_use]
pub fn extract_blocks(tree: &SyntaxTree) -> Vec<BlockInfo> {
    let mut blocks = Vec::new();
    let mut stack: Vec<(String, u32, u32)> = Vec::new();

    for tag in tree.tags() {
        let Some((keyword, operands)) = keyword_and_operands(&tag) else {
            continue;
        };

        match keyword {
            "block" => {
                if let Some(name) = operands.first().filter(|n| n.kind() == SyntaxKind::Identifier) {
                    let start = name.start_position();
                    stack.push((name.text().to_string(), start.row, start.column));
                }
            }
            "endblock" => {
                if let Some((name, line, character)) = stack.pop() {
                    blocks.push(BlockInfo {
                        name,
                        line,
                        character,
                        end_line: tag.end_position().row,
                    });
                }
            }
            _ => {}
        }
    }

    blocks
}
