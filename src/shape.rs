//! Statement shape matching.
//!
//! ```text
//! CREATE [OR REPLACE] TABLE <target> AS ( SELECT <items> FROM <source> [suffix] )
//!                           ───┬────     ─────────────────┬────────────────────
//!                              │                          └── re-tokenized inner statement
//!                              └── target name: first name up to whitespace
//! ```
//!
//! Any mismatch is `Ok(None)`: most SQL is simply not annotated.

use tracing::debug;

use crate::error::LayerSqlResult;
use crate::search::{
    expect_sequence, find_first, is_any_group, is_group, is_name, is_noise, is_whitespace,
    keyword, remove_matching, slice_between,
};
use crate::token::{GroupKind, TokenKind, TokenNode};
use crate::tokenizer::Tokenize;

/// The parts of a matched statement the extractor needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementShape {
    pub target_name: String,
    pub source_name: String,
    /// Select-list items in written order, separators removed
    pub select_items: Vec<TokenNode>,
    /// Everything after the source relation, verbatim
    pub suffix: Vec<TokenNode>,
}

/// Match the outer CTAS statement and its inner select.
///
/// The inner parenthesis is rendered back to text and run through
/// `tokenizer` again, so the select is grouped as a statement of its own.
pub fn match_statement<T>(tree: &TokenNode, tokenizer: &T) -> LayerSqlResult<Option<StatementShape>>
where
    T: Tokenize + ?Sized,
{
    let top = remove_matching(tree.children(), is_noise());
    let create = |n: &TokenNode| n.is_keyword("create or replace") || n.is_keyword("create");
    let Some(target) = expect_sequence(&top, &[&create, &keyword("table"), &is_any_group()])
        .and_then(|tail| tail.first().copied())
    else {
        debug!("statement is not CREATE TABLE ... AS");
        return Ok(None);
    };

    let Some(target_name) = target_name(target) else {
        debug!("no target name in '{}'", target);
        return Ok(None);
    };

    let Some(paren) = find_first(target.children(), is_group(GroupKind::Parenthesis)) else {
        debug!("no AS (...) clause for target '{}'", target_name);
        return Ok(None);
    };

    let inner = tokenizer.tokenize(&parenthesis_contents(paren))?;
    let Some(select) = match_select(&inner) else {
        debug!("parenthesis under '{}' is not a SELECT ... FROM", target_name);
        return Ok(None);
    };

    Ok(Some(StatementShape {
        target_name,
        source_name: select.source_name,
        select_items: select.select_items,
        suffix: select.suffix,
    }))
}

/// Concatenated text from the first name token to the next whitespace or
/// newline, so `schema.tbl` is kept whole.
fn target_name(target: &TokenNode) -> Option<String> {
    let leaves = target.flatten();
    let name = slice_between(&leaves, is_name(), is_whitespace())?;
    Some(name.iter().map(|n| n.text()).collect())
}

/// Text between the outer `(` and `)`.
fn parenthesis_contents(paren: &TokenNode) -> String {
    let children = paren.children();
    let is_paren = |n: Option<&TokenNode>, p: &str| {
        n.is_some_and(|n| n.leaf_kind() == Some(TokenKind::Punctuation) && n.value() == Some(p))
    };
    let start = usize::from(is_paren(children.first(), "("));
    let end = if children.len() > start && is_paren(children.last(), ")") {
        children.len() - 1
    } else {
        children.len()
    };
    children[start..end].iter().map(TokenNode::text).collect()
}

struct SelectShape {
    source_name: String,
    select_items: Vec<TokenNode>,
    suffix: Vec<TokenNode>,
}

fn match_select(inner: &TokenNode) -> Option<SelectShape> {
    let clean = remove_matching(inner.children(), is_whitespace());
    if !clean.first()?.is_keyword("select") {
        return None;
    }

    // FROM must be followed directly by the source identifier.
    let from_tail = expect_sequence(&clean, &[&keyword("from")])?;
    let source = from_tail
        .get(1)
        .copied()
        .filter(|n| n.group_kind() == Some(GroupKind::Identifier))?;
    let source_name: String = source
        .children()
        .iter()
        .take_while(|c| !c.is_whitespace())
        .map(TokenNode::text)
        .collect();

    let between = slice_between(&clean, keyword("select"), keyword("from"))?;
    let select_items = select_items(&between[1..])?;

    let source_at = inner
        .children()
        .iter()
        .position(|n| std::ptr::eq(n, source))?;

    Some(SelectShape {
        source_name,
        select_items,
        suffix: inner.children()[source_at + 1..].to_vec(),
    })
}

/// Items of the select list. Keywords such as `distinct` are skipped. What
/// remains must be a single identifier list or lone items; a list that
/// covers only part of the select clause is rejected.
fn select_items(nodes: &[&TokenNode]) -> Option<Vec<TokenNode>> {
    let items: Vec<&TokenNode> = nodes
        .iter()
        .copied()
        .filter(|n| n.leaf_kind() != Some(TokenKind::Keyword))
        .collect();

    match items.as_slice() {
        [] => None,
        [list] if list.group_kind() == Some(GroupKind::IdentifierList) => Some(
            remove_matching(list.children(), is_noise())
                .into_iter()
                .cloned()
                .collect(),
        ),
        [item] => Some(vec![(*item).clone()]),
        _ => {
            debug!("select list is not a plain column list");
            None
        }
    }
}
