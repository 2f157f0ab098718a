//! Finds the namespace-qualified call, e.g. `layer.predict(...)`.

use crate::function::FunctionKind;
use crate::token::{GroupKind, TokenKind, TokenNode};

/// A function call qualified by the reserved namespace.
#[derive(Debug, Clone, Copy)]
pub struct LocatedFunction<'a> {
    /// The `FunctionCall` group
    pub call: &'a TokenNode,
    /// The `Identifier` whose first token is the namespace
    pub parent: &'a TokenNode,
}

impl<'a> LocatedFunction<'a> {
    /// The bare function name, e.g. `predict`.
    pub fn name(&self) -> &'a str {
        self.call
            .children()
            .first()
            .and_then(TokenNode::value)
            .unwrap_or_default()
    }

    /// `None` for names other than train/predict.
    pub fn kind(&self) -> Option<FunctionKind> {
        FunctionKind::from_name(self.name())
    }

    /// The argument parenthesis.
    pub fn arguments(&self) -> Option<&'a TokenNode> {
        self.call
            .children()
            .get(1)
            .filter(|n| n.group_kind() == Some(GroupKind::Parenthesis))
    }

    /// Source text from the namespace through the closing paren, without alias.
    pub fn rendered(&self) -> String {
        let mut out = String::new();
        for child in self.parent.children() {
            out.push_str(&child.text());
            if std::ptr::eq(child, self.call) {
                break;
            }
        }
        out
    }

    /// Alias given to the call, as in `layer.predict(...) as score`.
    pub fn alias(&self) -> Option<String> {
        let children = self.parent.children();
        let call_at = children.iter().position(|c| std::ptr::eq(c, self.call))?;
        children[call_at + 1..]
            .iter()
            .rev()
            .find(|c| c.leaf_kind() == Some(TokenKind::Name))
            .map(TokenNode::text)
    }
}

/// Find the first call in document order whose parent identifier starts with
/// `namespace` (ASCII case-insensitive). Arguments of calls are not searched.
pub fn locate<'a>(tree: &'a TokenNode, namespace: &str) -> Option<LocatedFunction<'a>> {
    let mut candidates = Vec::new();
    collect_calls(tree, None, &mut candidates);
    candidates
        .into_iter()
        .find(|candidate| is_qualified(candidate.parent, namespace))
}

/// True if `node` contains a namespace-qualified call.
pub fn contains_call(node: &TokenNode, namespace: &str) -> bool {
    locate(node, namespace).is_some()
}

fn collect_calls<'a>(
    node: &'a TokenNode,
    parent: Option<&'a TokenNode>,
    found: &mut Vec<LocatedFunction<'a>>,
) {
    let Some(kind) = node.group_kind() else {
        return;
    };
    match kind {
        GroupKind::FunctionCall => {
            if let Some(parent) = parent {
                found.push(LocatedFunction { call: node, parent });
            }
        }
        GroupKind::Statement
        | GroupKind::IdentifierList
        | GroupKind::Identifier
        | GroupKind::Parenthesis => {
            for child in node.children() {
                collect_calls(child, Some(node), found);
            }
        }
    }
}

fn is_qualified(parent: &TokenNode, namespace: &str) -> bool {
    parent.group_kind() == Some(GroupKind::Identifier)
        && parent.children().first().is_some_and(|first| {
            first.leaf_kind() == Some(TokenKind::Name)
                && first
                    .value()
                    .is_some_and(|v| v.eq_ignore_ascii_case(namespace))
        })
}
