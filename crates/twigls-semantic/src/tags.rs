use serde::Serialize;
use twigls_syntax::SyntaxKind;
use twigls_syntax::SyntaxNode;

/// Constructs that open a scope and must be closed by a matching `end` tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    If,
    For,
    Block,
    Macro,
    Apply,
    Autoescape,
    Embed,
    Sandbox,
    Verbatim,
    Cache,
    Set,
    With,
}

impl BlockType {
    pub const ALL: [BlockType; 12] = [
        BlockType::If,
        BlockType::For,
        BlockType::Block,
        BlockType::Macro,
        BlockType::Apply,
        BlockType::Autoescape,
        BlockType::Embed,
        BlockType::Sandbox,
        BlockType::Verbatim,
        BlockType::Cache,
        BlockType::Set,
        BlockType::With,
    ];

    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == keyword)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::If => "if",
            BlockType::For => "for",
            BlockType::Block => "block",
            BlockType::Macro => "macro",
            BlockType::Apply => "apply",
            BlockType::Autoescape => "autoescape",
            BlockType::Embed => "embed",
            BlockType::Sandbox => "sandbox",
            BlockType::Verbatim => "verbatim",
            BlockType::Cache => "cache",
            BlockType::Set => "set",
            BlockType::With => "with",
        }
    }

    /// The keyword that closes this block, e.g. `endif`.
    #[must_use]
    pub fn closing_keyword(self) -> String {
        format!("end{}", self.as_str())
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role a tag plays in block pairing, decided by its keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagClass {
    /// `else`/`elseif`: only valid directly inside one of these blocks
    MidBlock { valid_parents: &'static [BlockType] },
    Opener(BlockType),
    Closer(BlockType),
    /// Anything else, including `end*` keywords with no known opener
    Other,
}

const ELSE_PARENTS: &[BlockType] = &[BlockType::If, BlockType::For];
const ELSEIF_PARENTS: &[BlockType] = &[BlockType::If];

#[must_use]
pub fn classify(keyword: &str) -> TagClass {
    match keyword {
        "else" => TagClass::MidBlock {
            valid_parents: ELSE_PARENTS,
        },
        "elseif" => TagClass::MidBlock {
            valid_parents: ELSEIF_PARENTS,
        },
        _ => {
            if let Some(ty) = BlockType::from_keyword(keyword) {
                TagClass::Opener(ty)
            } else if let Some(ty) = keyword.strip_prefix("end").and_then(BlockType::from_keyword) {
                TagClass::Closer(ty)
            } else {
                TagClass::Other
            }
        }
    }
}

/// The keyword node that classifies a `statement_block`.
#[must_use]
pub fn tag_keyword<'t>(tag: &SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
    tag.named_children()
        .find(|child| child.kind() == SyntaxKind::Keyword)
}

/// A `set` tag is an inline assignment when an `=` operator is one of its
/// direct children; otherwise it is the block form closed by `endset`.
#[must_use]
pub fn is_inline_set(tag: &SyntaxNode<'_>) -> bool {
    tag.named_children()
        .any(|child| child.kind() == SyntaxKind::Operator && child.text() == "=")
}
