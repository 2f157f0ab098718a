//! Argument extraction for recognized annotation calls.
//!
//! Once the namespace call is found, a bad argument list is a hard error
//! rather than "not matched": the user clearly meant to annotate.

use crate::error::{LayerSqlError, LayerSqlResult};
use crate::function::WILDCARD;
use crate::locator::{contains_call, LocatedFunction};
use crate::search::{is_noise, remove_matching};
use crate::token::{GroupKind, TokenKind, TokenNode};

/// Arguments of `predict('<model>', col, ...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictArguments {
    pub model_name: String,
    pub predict_columns: Vec<String>,
}

/// Columns named by a train call: `["*"]` or the listed identifiers.
pub fn train_columns(function: &LocatedFunction<'_>) -> LayerSqlResult<Vec<String>> {
    let args = argument_nodes(function)?;

    match args.as_slice() {
        [] => Err(LayerSqlError::malformed(
            function.rendered(),
            "expected '*' or a column list",
        )),
        [only] if only.leaf_kind() == Some(TokenKind::Wildcard) => Ok(vec![WILDCARD.to_string()]),
        columns => column_names(function, columns),
    }
}

/// Model name and feature columns of a predict call.
pub fn predict_arguments(function: &LocatedFunction<'_>) -> LayerSqlResult<PredictArguments> {
    let args = argument_nodes(function)?;

    let Some((model, columns)) = args.split_first() else {
        return Err(LayerSqlError::malformed(
            function.rendered(),
            "expected a quoted model name and at least one column",
        ));
    };
    if model.leaf_kind() != Some(TokenKind::StringLiteral) {
        return Err(LayerSqlError::malformed(
            function.rendered(),
            format!("first argument must be a quoted model name, got '{}'", model),
        ));
    }
    if columns.is_empty() {
        return Err(LayerSqlError::malformed(
            function.rendered(),
            "expected at least one column after the model name",
        ));
    }

    Ok(PredictArguments {
        model_name: unquote(&model.text()),
        predict_columns: column_names(function, columns)?,
    })
}

/// Select-list items that are not the annotation call, in written order.
pub fn select_columns(items: &[TokenNode], namespace: &str) -> Vec<String> {
    items
        .iter()
        .filter(|item| !contains_call(item, namespace))
        .map(TokenNode::compact_text)
        .collect()
}

/// Alias of the call, or `default` when it has none.
pub fn prediction_column(function: &LocatedFunction<'_>, default: &str) -> String {
    function.alias().unwrap_or_else(|| default.to_string())
}

/// The call's arguments with separators removed. A single identifier list
/// is expanded into its members.
fn argument_nodes<'a>(function: &LocatedFunction<'a>) -> LayerSqlResult<Vec<&'a TokenNode>> {
    let parens = function
        .arguments()
        .ok_or_else(|| LayerSqlError::malformed(function.rendered(), "missing argument list"))?;

    let args = remove_matching(parens.children(), is_noise());
    match args.as_slice() {
        [list] if list.group_kind() == Some(GroupKind::IdentifierList) => {
            Ok(remove_matching(list.children(), is_noise()))
        }
        _ => Ok(args),
    }
}

fn column_names(function: &LocatedFunction<'_>, nodes: &[&TokenNode]) -> LayerSqlResult<Vec<String>> {
    nodes
        .iter()
        .map(|node| {
            if node.group_kind() == Some(GroupKind::Identifier) {
                Ok(node.compact_text())
            } else {
                Err(LayerSqlError::malformed(
                    function.rendered(),
                    format!("expected a column name, got '{}'", node),
                ))
            }
        })
        .collect()
}

/// Strip surrounding single quotes and undo `''` escapes.
fn unquote(literal: &str) -> String {
    let inner = literal
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(literal);
    inner.replace("''", "'")
}
