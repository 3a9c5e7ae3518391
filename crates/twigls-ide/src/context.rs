//! Classify a cursor offset by scanning the raw text before it.
//!
//! This runs without a syntax tree so it keeps working while the user is in
//! the middle of typing a construct. Callers refine the result with scope
//! information from the tree.

/// Which kind of Twig construct the cursor sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextKind {
    /// Inside `{{ ... }}`.
    Output,
    /// Inside `{% ... %}`.
    Block,
    /// Right after a `|` inside either construct.
    Filter,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LexicalContext {
    pub kind: ContextKind,
    pub is_after_is_keyword: bool,
    pub is_after_loop_dot: bool,
    pub is_in_block_function: bool,
    pub is_after_block_keyword: bool,
}

/// Detect the context at byte `offset` of `text`.
///
/// Offsets past the end are clamped, as are offsets falling inside a
/// multi-byte character.
#[must_use]
pub fn detect_lexical_context(text: &str, offset: u32) -> LexicalContext {
    let prefix = prefix_at(text, offset);

    LexicalContext {
        kind: context_kind(prefix),
        is_after_is_keyword: is_after_is_keyword(prefix),
        is_after_loop_dot: is_after_loop_dot(prefix),
        is_in_block_function: is_in_block_function(prefix),
        is_after_block_keyword: is_after_block_keyword(prefix),
    }
}

fn prefix_at(text: &str, offset: u32) -> &str {
    let mut end = usize::try_from(offset).unwrap_or(usize::MAX).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Whether `open` appears after the last `close`, or without any `close`.
fn is_open(prefix: &str, open: &str, close: &str) -> bool {
    match (prefix.rfind(open), prefix.rfind(close)) {
        (Some(open), Some(close)) => open > close,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

fn context_kind(prefix: &str) -> ContextKind {
    let in_output = is_open(prefix, "{{", "}}");
    let in_block = is_open(prefix, "{%", "%}");

    if let Some(pipe) = prefix.rfind('|') {
        let after_pipe = prefix[pipe + 1..].trim_start();
        if after_pipe.chars().all(is_ident_char) && (in_output || in_block) {
            return ContextKind::Filter;
        }
    }

    if in_block {
        ContextKind::Block
    } else if in_output {
        ContextKind::Output
    } else {
        ContextKind::None
    }
}

/// `text` ends with `word` and `word` starts on a word boundary.
fn ends_with_word(text: &str, word: &str) -> bool {
    text.strip_suffix(word)
        .is_some_and(|before| !before.chars().next_back().is_some_and(is_word_char))
}

/// `text` with its trailing run of identifier characters removed.
fn strip_ident_suffix(text: &str) -> &str {
    text.trim_end_matches(is_ident_char)
}

/// `is` followed by whitespace and an optional partial test name, within the
/// innermost opened construct.
fn is_after_is_keyword(prefix: &str) -> bool {
    let opener = match (prefix.rfind("{{"), prefix.rfind("{%")) {
        (Some(output), Some(block)) => output.max(block),
        (Some(pos), None) | (None, Some(pos)) => pos,
        (None, None) => return false,
    };

    let rest = strip_ident_suffix(&prefix[opener..]);
    let trimmed = rest.trim_end();
    trimmed.len() < rest.len() && ends_with_word(trimmed, "is")
}

/// `loop.` followed by an optional partial property name.
fn is_after_loop_dot(prefix: &str) -> bool {
    let rest = strip_ident_suffix(prefix).trim_end();
    ends_with_word(rest, "loop.")
}

/// Inside the still-open string argument of `block(`.
fn is_in_block_function(prefix: &str) -> bool {
    let Some(quote) = prefix.rfind(['\'', '"']) else {
        return false;
    };

    let Some(call) = prefix[..quote].trim_end().strip_suffix('(') else {
        return false;
    };
    ends_with_word(call.trim_end(), "block")
}

/// `{% block ` followed by an optional partial block name.
fn is_after_block_keyword(prefix: &str) -> bool {
    let Some(opener) = prefix.rfind("{%") else {
        return false;
    };

    let tag = &prefix[opener + 2..];
    let tag = tag.strip_prefix('-').unwrap_or(tag).trim_start();
    let Some(after) = tag.strip_prefix("block") else {
        return false;
    };
    let name = after.trim_start();
    name.len() < after.len() && name.chars().all(is_ident_char)
}
