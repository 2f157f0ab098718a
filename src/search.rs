//! Generic search primitives over the token tree.
//!
//! Everything here takes caller-supplied predicates so the shape matcher
//! can describe what it wants without hand-written index juggling.
//! Slice-level helpers accept both `&[TokenNode]` and `&[&TokenNode]`.

use std::borrow::Borrow;

use crate::token::{GroupKind, TokenKind, TokenNode};

/// A borrowed node predicate, for heterogeneous predicate lists.
pub type Predicate<'p> = &'p dyn Fn(&TokenNode) -> bool;

fn as_node<N: Borrow<TokenNode>>(node: &N) -> &TokenNode {
    node.borrow()
}

/// Leftmost depth-first match. A matching node is returned as-is; its
/// children are not searched.
pub fn find_first<'a, F>(nodes: &'a [TokenNode], pred: F) -> Option<&'a TokenNode>
where
    F: Fn(&TokenNode) -> bool,
{
    find_first_with(nodes, &pred)
}

fn find_first_with<'a>(nodes: &'a [TokenNode], pred: &dyn Fn(&TokenNode) -> bool) -> Option<&'a TokenNode> {
    for node in nodes {
        if pred(node) {
            return Some(node);
        }
        if let Some(found) = find_first_with(node.children(), pred) {
            return Some(found);
        }
    }
    None
}

/// Every match in document order. Children of a match are not searched.
pub fn find_all<'a, F>(nodes: &'a [TokenNode], pred: F) -> Vec<&'a TokenNode>
where
    F: Fn(&TokenNode) -> bool,
{
    let mut found = Vec::new();
    collect_matches(nodes, &pred, &mut found);
    found
}

fn collect_matches<'a>(
    nodes: &'a [TokenNode],
    pred: &dyn Fn(&TokenNode) -> bool,
    found: &mut Vec<&'a TokenNode>,
) {
    for node in nodes {
        if pred(node) {
            found.push(node);
        } else {
            collect_matches(node.children(), pred, found);
        }
    }
}

/// Drop every node matching `pred`. Does not recurse.
pub fn remove_matching<'a, N, F>(nodes: &'a [N], pred: F) -> Vec<&'a TokenNode>
where
    N: Borrow<TokenNode>,
    F: Fn(&TokenNode) -> bool,
{
    let mut kept = Vec::with_capacity(nodes.len());
    for node in nodes {
        let node = as_node(node);
        if !pred(node) {
            kept.push(node);
        }
    }
    kept
}

/// From the first node matching `start` up to, not including, the first
/// later node matching `end`.
pub fn slice_between<'a, N, S, E>(nodes: &'a [N], start: S, end: E) -> Option<&'a [N]>
where
    N: Borrow<TokenNode>,
    S: Fn(&TokenNode) -> bool,
    E: Fn(&TokenNode) -> bool,
{
    let from = nodes.iter().position(|n| start(as_node(n)))?;
    let len = nodes[from + 1..].iter().position(|n| end(as_node(n)))?;
    Some(&nodes[from..from + 1 + len])
}

/// Match `preds` in order, each strictly after the previous match, skipping
/// whatever lies between. Returns the tail starting at the last match.
pub fn expect_sequence<'a, N>(nodes: &'a [N], preds: &[Predicate<'_>]) -> Option<&'a [N]>
where
    N: Borrow<TokenNode>,
{
    let (first, rest) = preds.split_first()?;
    let at = nodes.iter().position(|n| first(as_node(n)))?;
    if rest.is_empty() {
        return Some(&nodes[at..]);
    }
    expect_sequence(&nodes[at + 1..], rest)
}

/// Matches a keyword, ignoring case and inner whitespace.
pub fn keyword(value: &str) -> impl Fn(&TokenNode) -> bool + '_ {
    move |node| node.is_keyword(value)
}

pub fn is_kind(kind: TokenKind) -> impl Fn(&TokenNode) -> bool {
    move |node| node.leaf_kind() == Some(kind)
}

pub fn is_group(kind: GroupKind) -> impl Fn(&TokenNode) -> bool {
    move |node| node.group_kind() == Some(kind)
}

pub fn is_any_group() -> impl Fn(&TokenNode) -> bool {
    |node| node.is_group()
}

pub fn is_name() -> impl Fn(&TokenNode) -> bool {
    is_kind(TokenKind::Name)
}

pub fn is_newline() -> impl Fn(&TokenNode) -> bool {
    is_kind(TokenKind::Newline)
}

/// Whitespace, newlines and comments.
pub fn is_whitespace() -> impl Fn(&TokenNode) -> bool {
    |node| node.is_whitespace()
}

/// Whitespace plus punctuation.
pub fn is_noise() -> impl Fn(&TokenNode) -> bool {
    |node| node.is_noise()
}

/// Exact text match on the rendered node.
pub fn text_eq(text: &str) -> impl Fn(&TokenNode) -> bool + '_ {
    move |node| node.text() == text
}
