//! Token tree produced by a tokenizer and consumed read-only by the parser.
//!
//! ```text
//! Statement
//! ├── Keyword        "create or replace"
//! ├── Whitespace     " "
//! ├── Keyword        "table"
//! ├── Whitespace     " "
//! └── Identifier
//!     ├── Name       "out"
//!     ├── ...        " as "
//!     └── Parenthesis
//!         ├── Punctuation "("
//!         ├── ...
//!         └── Punctuation ")"
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Leaf token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Keyword,
    Name,
    StringLiteral,
    Number,
    Wildcard,
    Operator,
    Whitespace,
    Newline,
    Comment,
    Punctuation,
    /// Unrecognized input, kept verbatim so rendering is lossless.
    Error,
}

/// Group node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    Identifier,
    IdentifierList,
    /// Always exactly two children: a `Name` leaf and a `Parenthesis` group.
    FunctionCall,
    Parenthesis,
    Statement,
}

/// A node in the token tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenNode {
    Leaf { kind: TokenKind, value: String },
    Group { kind: GroupKind, children: Vec<TokenNode> },
}

impl TokenNode {
    pub fn leaf(kind: TokenKind, value: impl Into<String>) -> Self {
        TokenNode::Leaf {
            kind,
            value: value.into(),
        }
    }

    pub fn group(kind: GroupKind, children: Vec<TokenNode>) -> Self {
        TokenNode::Group { kind, children }
    }

    pub fn leaf_kind(&self) -> Option<TokenKind> {
        match self {
            TokenNode::Leaf { kind, .. } => Some(*kind),
            TokenNode::Group { .. } => None,
        }
    }

    pub fn group_kind(&self) -> Option<GroupKind> {
        match self {
            TokenNode::Leaf { .. } => None,
            TokenNode::Group { kind, .. } => Some(*kind),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, TokenNode::Group { .. })
    }

    /// Children of a group; empty for leaves.
    pub fn children(&self) -> &[TokenNode] {
        match self {
            TokenNode::Leaf { .. } => &[],
            TokenNode::Group { children, .. } => children,
        }
    }

    /// Raw value of a leaf.
    pub fn value(&self) -> Option<&str> {
        match self {
            TokenNode::Leaf { value, .. } => Some(value),
            TokenNode::Group { .. } => None,
        }
    }

    /// Exact source text covered by this node.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) {
        match self {
            TokenNode::Leaf { value, .. } => out.push_str(value),
            TokenNode::Group { children, .. } => {
                for child in children {
                    child.write_text(out);
                }
            }
        }
    }

    /// All leaves below this node in document order.
    pub fn flatten(&self) -> Vec<&TokenNode> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a TokenNode>) {
        match self {
            TokenNode::Leaf { .. } => leaves.push(self),
            TokenNode::Group { children, .. } => {
                for child in children {
                    child.collect_leaves(leaves);
                }
            }
        }
    }

    /// Source text with whitespace and comment runs collapsed to one space.
    pub fn compact_text(&self) -> String {
        self.render_compact(false)
    }

    pub(crate) fn render_compact(&self, lowercase_keywords: bool) -> String {
        let mut out = String::new();
        for leaf in self.flatten() {
            if leaf.is_whitespace() {
                if !out.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
                continue;
            }
            match leaf {
                TokenNode::Leaf {
                    kind: TokenKind::Keyword,
                    value,
                } if lowercase_keywords => out.push_str(&normalize_keyword(value)),
                TokenNode::Leaf { value, .. } => out.push_str(value),
                TokenNode::Group { .. } => {}
            }
        }
        let len = out.trim_end().len();
        out.truncate(len);
        out
    }

    /// Keyword comparison ignoring case and inner whitespace width,
    /// so `CREATE  OR\nREPLACE` equals `create or replace`.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        match self {
            TokenNode::Leaf {
                kind: TokenKind::Keyword,
                value,
            } => normalize_keyword(value) == normalize_keyword(keyword),
            _ => false,
        }
    }

    /// Whitespace, newlines and comments.
    pub fn is_whitespace(&self) -> bool {
        matches!(
            self.leaf_kind(),
            Some(TokenKind::Whitespace | TokenKind::Newline | TokenKind::Comment)
        )
    }

    /// Tokens with no structural meaning: whitespace plus punctuation.
    pub fn is_noise(&self) -> bool {
        self.is_whitespace() || self.leaf_kind() == Some(TokenKind::Punctuation)
    }

    /// Indented, one-node-per-line dump of the tree.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 0);
        out
    }

    fn write_pretty(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            TokenNode::Leaf { kind, value } => {
                out.push_str(&format!("{}{:?} {:?}\n", indent, kind, value));
            }
            TokenNode::Group { kind, children } => {
                out.push_str(&format!("{}{:?}\n", indent, kind));
                for child in children {
                    child.write_pretty(out, depth + 1);
                }
            }
        }
    }
}

impl fmt::Display for TokenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

/// Lowercase a keyword and collapse inner whitespace to single spaces.
pub fn normalize_keyword(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
