use twigls_syntax::SyntaxTree;

use crate::analysis::analyze_tags;
use crate::symbols::extract_blocks;
use crate::symbols::extract_for_loops;
use crate::symbols::extract_macros;
use crate::symbols::extract_set_variables;
use crate::tags::BlockType;
use crate::types::DocumentAnalysis;
use crate::types::ForLoopInfo;
use crate::types::ScopeEntry;
use crate::types::ScopeInfo;
use crate::types::ScopedBlockInfo;
use crate::types::VariableInfo;

#[must_use]
pub fn analyze_document(tree: &SyntaxTree) -> DocumentAnalysis {
    DocumentAnalysis {
        variables: extract_set_variables(tree),
        macros: extract_macros(tree),
        blocks: extract_blocks(tree),
        for_loops: extract_for_loops(tree),
    }
}

/// Blocks whose line range contains `line`.
///
/// Only the line is considered: a position earlier on the same line as an
/// opening tag already counts as inside it.
#[must_use]
pub fn get_scope_at_position(tree: &SyntaxTree, line: u32, _character: u32) -> ScopeInfo {
    let tags = analyze_tags(tree);
    let for_loops = extract_for_loops(tree);
    resolve_scope(&tags.scoped_blocks, &for_loops, line)
}

fn resolve_scope(scoped_blocks: &[ScopedBlockInfo], for_loops: &[ForLoopInfo], line: u32) -> ScopeInfo {
    let mut scope = ScopeInfo::default();

    for block in scoped_blocks.iter().filter(|block| block.contains_line(line)) {
        scope.block_stack.push(ScopeEntry {
            block_type: block.block_type,
            start_line: block.start_line,
            end_line: block.end_line,
        });
        match block.block_type {
            BlockType::For => scope.inside_for_loop = true,
            BlockType::Block => scope.inside_block = true,
            BlockType::If => scope.inside_if = true,
            _ => {}
        }
    }

    // First match, not necessarily the innermost loop.
    if scope.inside_for_loop {
        scope.current_for_loop = for_loops
            .iter()
            .find(|for_loop| for_loop.contains_line(line))
            .cloned();
    }

    scope.block_stack.sort_by_key(|entry| entry.start_line);
    scope
}

/// Names visible at a position: every `set` declared strictly before it in
/// document order, then the enclosing loop's value and key variables.
///
/// Visibility is purely textual; a variable set inside an already closed
/// block stays visible.
#[must_use]
pub fn get_available_variables(tree: &SyntaxTree, line: u32, character: u32) -> Vec<VariableInfo> {
    let scope = get_scope_at_position(tree, line, character);

    let mut available: Vec<_> = extract_set_variables(tree)
        .into_iter()
        .filter(|var| (var.line, var.character) < (line, character))
        .collect();

    if let Some(for_loop) = scope.current_for_loop.filter(|_| scope.inside_for_loop) {
        available.push(VariableInfo {
            name: for_loop.variable,
            line: for_loop.start_line,
            character: for_loop.start_character,
        });
        if let Some(key) = for_loop.key_variable {
            available.push(VariableInfo {
                name: key,
                line: for_loop.start_line,
                character: for_loop.start_character,
            });
        }
    }

    available
}

#[cfg(test)]
mod tests {
    use twigls_syntax::Parser;

    use super::*;

    fn tree(source: &str) -> SyntaxTree {
        Parser::new().parse_text(source)
    }

    fn names(variables: &[VariableInfo]) -> Vec<&str> {
        variables.iter().map(|v| v.name.as_str()).collect()
    }

    mod scope {
        use super::*;

        #[test]
        fn test_block_stack_sorted_outermost_first() {
            let tree = tree("{% block body %}\n{% for a in b %}\n{% if a %}\nx\n{% endif %}\n{% endfor %}\n{% endblock %}");
            let scope = get_scope_at_position(&tree, 3, 0);
            let types: Vec<_> = scope.block_stack.iter().map(|e| e.block_type).collect();
            assert_eq!(types, vec![BlockType::Block, BlockType::For, BlockType::If]);
            assert!(scope.inside_block && scope.inside_for_loop && scope.inside_if);
            assert_eq!(scope.current_for_loop.unwrap().variable, "a");
        }

        #[test]
        fn test_line_bounds_are_inclusive_and_ignore_column() {
            let tree = tree("x {% if a %}\ny\n{% endif %} z\nw");
            assert!(get_scope_at_position(&tree, 0, 0).inside_if);
            assert!(get_scope_at_position(&tree, 2, 12).inside_if);
            assert!(!get_scope_at_position(&tree, 3, 0).inside_if);
        }

        #[test]
        fn test_unclosed_block_extends_to_end() {
            let tree = tree("{% for a in b %}\n\n\n\nx");
            let scope = get_scope_at_position(&tree, 4, 0);
            assert!(scope.inside_for_loop);
            assert!(scope.current_for_loop.is_none());
        }

        #[test]
        fn test_current_loop_is_first_match() {
            let tree = tree("{% for a in b %}\n{% for c in d %}\nx\n{% endfor %}\n{% endfor %}");
            let scope = get_scope_at_position(&tree, 2, 0);
            // the inner loop closes first, so it is found first
            assert_eq!(scope.current_for_loop.unwrap().variable, "c");
        }

        #[test]
        fn test_outside_everything() {
            let scope = get_scope_at_position(&tree("{% if a %}{% endif %}\nx"), 1, 0);
            assert_eq!(scope, ScopeInfo::default());
        }
    }

    mod availability {
        use super::*;

        #[test]
        fn test_declaration_order() {
            let before = tree("{{ name }}\n{% set name = 'x' %}");
            assert!(get_available_variables(&before, 0, 3).is_empty());

            let after = tree("{% set name = 'x' %}\n{{ name }}");
            assert_eq!(names(&get_available_variables(&after, 1, 3)), vec!["name"]);
        }

        #[test]
        fn test_same_line_uses_character() {
            let tree = tree("{% set a = 1 %}{{ a }}");
            assert!(get_available_variables(&tree, 0, 7).is_empty());
            assert_eq!(names(&get_available_variables(&tree, 0, 8)), vec!["a"]);
        }

        #[test]
        fn test_closed_block_does_not_hide_variables() {
            let tree = tree("{% if c %}\n{% set inner = 1 %}\n{% endif %}\n{{ inner }}");
            assert_eq!(names(&get_available_variables(&tree, 3, 3)), vec!["inner"]);
        }

        #[test]
        fn test_loop_variables_value_then_key() {
            let tree = tree("{% set total = 0 %}\n{% for k, v in items %}\n{{ v }}\n{% endfor %}");
            let available = get_available_variables(&tree, 2, 3);
            assert_eq!(names(&available), vec!["total", "v", "k"]);
            assert_eq!((available[1].line, available[1].character), (1, 0));
            assert_eq!((available[2].line, available[2].character), (1, 0));
        }

        #[test]
        fn test_loop_variables_gone_after_loop() {
            let tree = tree("{% for v in items %}\n{% endfor %}\n{{ x }}");
            assert!(get_available_variables(&tree, 2, 3).is_empty());
        }
    }

    #[test]
    fn test_analyze_document() {
        let analysis = analyze_document(&tree(
            "{% set a = 1 %}{% macro m(x) %}{% endmacro %}{% block b %}{% for i in a %}{% endfor %}{% endblock %}",
        ));
        assert_eq!(analysis.variables.len(), 1);
        assert_eq!(analysis.macros.len(), 1);
        assert_eq!(analysis.blocks.len(), 1);
        assert_eq!(analysis.for_loops.len(), 1);
    }
}
