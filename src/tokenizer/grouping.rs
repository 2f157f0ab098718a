//! Structural grouping of a flat token stream.
//!
//! Passes run per nesting level, innermost first:
//!
//! 1. balanced parentheses become `Parenthesis` groups
//! 2. `name(...)` becomes a `FunctionCall`
//! 3. dotted chains (and their aliases) become `Identifier`s
//! 4. operator-joined operands (`a + 1 as x`, `b::int`) become `Identifier`s
//! 5. comma-separated items become an `IdentifierList`

use std::mem;

use crate::token::{GroupKind, TokenKind, TokenNode};

/// Group a flat leaf stream into a `Statement` tree.
pub fn group_statement(tokens: Vec<TokenNode>) -> TokenNode {
    TokenNode::group(GroupKind::Statement, group_parentheses(tokens))
}

fn is_punct(token: &TokenNode, punct: &str) -> bool {
    token.leaf_kind() == Some(TokenKind::Punctuation) && token.value() == Some(punct)
}

fn is_name(token: &TokenNode) -> bool {
    token.leaf_kind() == Some(TokenKind::Name)
}

/// Build parenthesis groups with an explicit stack of enclosing levels.
/// An unclosed `(` leaves its level spliced back into the parent ungrouped.
fn group_parentheses(tokens: Vec<TokenNode>) -> Vec<TokenNode> {
    let mut enclosing: Vec<Vec<TokenNode>> = Vec::new();
    let mut current: Vec<TokenNode> = Vec::new();

    for token in tokens {
        if is_punct(&token, "(") {
            enclosing.push(mem::take(&mut current));
            current.push(token);
        } else if is_punct(&token, ")") && !enclosing.is_empty() {
            current.push(token);
            let paren = build_parenthesis(mem::take(&mut current));
            if let Some(parent) = enclosing.pop() {
                current = parent;
            }
            current.push(paren);
        } else {
            current.push(token);
        }
    }

    while let Some(mut parent) = enclosing.pop() {
        parent.append(&mut current);
        current = parent;
    }

    group_level(current)
}

/// `tokens` starts with `(` and ends with `)`.
fn build_parenthesis(mut tokens: Vec<TokenNode>) -> TokenNode {
    let close = tokens.pop();
    let inner: Vec<TokenNode> = tokens.drain(1..).collect();

    let mut children = tokens;
    children.extend(group_level(inner));
    children.extend(close);
    TokenNode::group(GroupKind::Parenthesis, children)
}

fn group_level(tokens: Vec<TokenNode>) -> Vec<TokenNode> {
    group_identifier_lists(group_expressions(group_identifiers(group_functions(tokens))))
}

fn group_functions(tokens: Vec<TokenNode>) -> Vec<TokenNode> {
    let mut out: Vec<TokenNode> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.group_kind() == Some(GroupKind::Parenthesis) && out.last().is_some_and(is_name) {
            if let Some(name) = out.pop() {
                out.push(TokenNode::group(GroupKind::FunctionCall, vec![name, token]));
                continue;
            }
        }
        out.push(token);
    }
    out
}

/// Can this token be a link in a dotted chain like `a.b.f(x)`?
fn is_chain_part(token: &TokenNode) -> bool {
    is_name(token) || token.group_kind() == Some(GroupKind::FunctionCall)
}

fn next_non_whitespace(tokens: &[TokenNode], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&i| !tokens[i].is_whitespace())
}

/// Length of the alias that follows `tokens[start..]`, if any:
/// `AS name`, `AS (...)`, or whitespace followed by a bare name.
fn alias_len(tokens: &[TokenNode], start: usize) -> Option<usize> {
    let next = next_non_whitespace(tokens, start)?;
    let token = &tokens[next];

    if token.is_keyword("as") {
        let target = next_non_whitespace(tokens, next + 1)?;
        let aliased = &tokens[target];
        if is_name(aliased) || aliased.group_kind() == Some(GroupKind::Parenthesis) {
            return Some(target + 1 - start);
        }
        return None;
    }

    if next > start && is_name(token) {
        return Some(next + 1 - start);
    }
    None
}

fn group_identifiers(tokens: Vec<TokenNode>) -> Vec<TokenNode> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        if !is_chain_part(&tokens[i]) {
            out.push(tokens[i].clone());
            i += 1;
            continue;
        }

        let mut end = i + 1;
        while end + 1 < tokens.len()
            && is_punct(&tokens[end], ".")
            && (is_chain_part(&tokens[end + 1])
                || tokens[end + 1].leaf_kind() == Some(TokenKind::Wildcard))
        {
            end += 2;
        }
        let chain_len = end - i;
        let alias = alias_len(&tokens, end);
        if let Some(len) = alias {
            end += len;
        }

        let is_bare_call = chain_len == 1
            && alias.is_none()
            && tokens[i].group_kind() == Some(GroupKind::FunctionCall);
        if is_bare_call {
            out.push(tokens[i].clone());
        } else {
            out.push(TokenNode::group(
                GroupKind::Identifier,
                tokens[i..end].to_vec(),
            ));
        }
        i = end;
    }

    out
}

fn is_operand(token: &TokenNode) -> bool {
    match token {
        TokenNode::Leaf { kind, .. } => {
            matches!(kind, TokenKind::StringLiteral | TokenKind::Number)
        }
        TokenNode::Group { kind, .. } => matches!(
            kind,
            GroupKind::Identifier | GroupKind::FunctionCall | GroupKind::Parenthesis
        ),
    }
}

/// `*` between two operands is multiplication.
fn is_operator(token: &TokenNode) -> bool {
    matches!(
        token.leaf_kind(),
        Some(TokenKind::Operator | TokenKind::Wildcard)
    )
}

/// An identifier made of a single name, usable as an alias.
fn is_bare_name(token: &TokenNode) -> bool {
    is_name(token)
        || (token.group_kind() == Some(GroupKind::Identifier)
            && matches!(token.children(), [only] if is_name(only)))
}

/// Alias after an expression ending at `start`. Same forms as [`alias_len`],
/// but the name has already been grouped into an identifier.
fn expression_alias_len(tokens: &[TokenNode], start: usize) -> Option<usize> {
    let next = next_non_whitespace(tokens, start)?;
    if tokens[next].is_keyword("as") {
        let target = next_non_whitespace(tokens, next + 1)?;
        return is_bare_name(&tokens[target]).then(|| target + 1 - start);
    }
    (next > start && is_bare_name(&tokens[next])).then(|| next + 1 - start)
}

fn group_expressions(tokens: Vec<TokenNode>) -> Vec<TokenNode> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        if !is_operand(&tokens[i]) {
            out.push(tokens[i].clone());
            i += 1;
            continue;
        }

        // Extend over `<op> operand` pairs; `end` is one past the last operand.
        let mut end = i + 1;
        while let Some(op) = next_non_whitespace(&tokens, end) {
            if !is_operator(&tokens[op]) {
                break;
            }
            match next_non_whitespace(&tokens, op + 1) {
                Some(operand) if is_operand(&tokens[operand]) => end = operand + 1,
                _ => break,
            }
        }

        if end == i + 1 {
            out.push(tokens[i].clone());
            i += 1;
            continue;
        }

        if let Some(len) = expression_alias_len(&tokens, end) {
            end += len;
        }
        out.push(TokenNode::group(
            GroupKind::Identifier,
            tokens[i..end].to_vec(),
        ));
        i = end;
    }

    out
}

fn is_list_item(token: &TokenNode) -> bool {
    match token {
        TokenNode::Leaf { kind, .. } => matches!(
            kind,
            TokenKind::StringLiteral | TokenKind::Number | TokenKind::Wildcard
        ),
        TokenNode::Group { kind, .. } => matches!(
            kind,
            GroupKind::Identifier | GroupKind::FunctionCall | GroupKind::Parenthesis
        ),
    }
}

fn group_identifier_lists(tokens: Vec<TokenNode>) -> Vec<TokenNode> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        if !is_list_item(&tokens[i]) {
            out.push(tokens[i].clone());
            i += 1;
            continue;
        }

        // Extend over `, item` pairs; `end` is one past the last item.
        let mut end = i + 1;
        while let Some(comma) = next_non_whitespace(&tokens, end) {
            if !is_punct(&tokens[comma], ",") {
                break;
            }
            match next_non_whitespace(&tokens, comma + 1) {
                Some(item) if is_list_item(&tokens[item]) => end = item + 1,
                _ => break,
            }
        }

        if end == i + 1 {
            out.push(tokens[i].clone());
        } else {
            out.push(TokenNode::group(
                GroupKind::IdentifierList,
                tokens[i..end].to_vec(),
            ));
        }
        i = end;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::lexer::lex;

    fn group(sql: &str) -> TokenNode {
        group_statement(lex(sql))
    }

    fn kinds(nodes: &[TokenNode]) -> Vec<Option<GroupKind>> {
        nodes
            .iter()
            .filter(|n| !n.is_whitespace())
            .map(TokenNode::group_kind)
            .collect()
    }

    #[test]
    fn test_grouping_is_lossless() {
        let sql = "create table t as (select a, f(b, (c)) x from s where (d";
        assert_eq!(group(sql).text(), sql);
    }

    #[test]
    fn test_function_inside_dotted_identifier() {
        let tree = group("layer.predict('m1', c)");
        let ident = &tree.children()[0];
        assert_eq!(ident.group_kind(), Some(GroupKind::Identifier));
        assert_eq!(ident.children()[0].value(), Some("layer"));
        let call = &ident.children()[2];
        assert_eq!(call.group_kind(), Some(GroupKind::FunctionCall));
        assert_eq!(call.children().len(), 2);
        assert_eq!(call.children()[0].value(), Some("predict"));
        assert_eq!(call.children()[1].group_kind(), Some(GroupKind::Parenthesis));
    }

    #[test]
    fn test_select_list_grouping() {
        let tree = group("select a, b as x, count(c) from s");
        assert_eq!(
            kinds(tree.children()),
            vec![None, Some(GroupKind::IdentifierList), None, Some(GroupKind::Identifier)]
        );
        let list = &tree.children()[2];
        assert_eq!(
            kinds(list.children()),
            vec![
                Some(GroupKind::Identifier),
                None,
                Some(GroupKind::Identifier),
                None,
                Some(GroupKind::FunctionCall),
            ]
        );
    }

    #[test]
    fn test_as_parenthesis_is_absorbed_into_identifier() {
        let tree = group("create or replace table out as (select a from s)");
        let target = tree.children().last().map(TokenNode::group_kind);
        assert_eq!(target, Some(Some(GroupKind::Identifier)));
        let ident = &tree.children()[tree.children().len() - 1];
        assert_eq!(
            ident.children().last().and_then(TokenNode::group_kind),
            Some(GroupKind::Parenthesis)
        );
    }

    #[test]
    fn test_implicit_alias_stops_at_keyword() {
        let tree = group("from src s where x");
        let source = &tree.children()[2];
        assert_eq!(source.text(), "src s");
        assert!(tree.children()[4].is_keyword("where"));
    }

    #[test]
    fn test_unbalanced_paren_stays_punctuation() {
        let tree = group("f(a");
        assert!(tree.children().iter().all(|n| n.group_kind() != Some(GroupKind::FunctionCall)));
        assert_eq!(tree.text(), "f(a");
    }

    #[test]
    fn test_expressions_join_the_select_list() {
        let tree = group("select a + 1 as x, b::int, c * 2 total, d from s");
        let list = &tree.children()[2];
        assert_eq!(list.group_kind(), Some(GroupKind::IdentifierList));
        let items: Vec<String> = list
            .children()
            .iter()
            .filter(|n| n.is_group())
            .map(TokenNode::text)
            .collect();
        assert_eq!(items, vec!["a + 1 as x", "b::int", "c * 2 total", "d"]);
    }

    #[test]
    fn test_dangling_operator_is_left_alone() {
        let tree = group("a = -1");
        assert_eq!(tree.children()[0].group_kind(), Some(GroupKind::Identifier));
        assert_eq!(tree.children()[0].text(), "a");
        assert_eq!(tree.text(), "a = -1");
    }
}
