//! Tokenizer collaborator.
//!
//! The parser never lexes SQL itself; it asks a [`Tokenize`] implementation
//! for a grouped token tree. [`SqlTokenizer`] is the built-in one.

pub mod grouping;
pub mod lexer;

use crate::error::LayerSqlResult;
use crate::token::TokenNode;

/// Turns SQL text into a grouped token tree rooted at a `Statement` node.
pub trait Tokenize {
    fn tokenize(&self, sql: &str) -> LayerSqlResult<TokenNode>;
}

impl<T: Tokenize + ?Sized> Tokenize for &T {
    fn tokenize(&self, sql: &str) -> LayerSqlResult<TokenNode> {
        (**self).tokenize(sql)
    }
}

/// Default tokenizer: nom lexer plus the grouping passes.
///
/// Never fails; unrecognized input is kept as `Error` leaves.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlTokenizer;

impl Tokenize for SqlTokenizer {
    fn tokenize(&self, sql: &str) -> LayerSqlResult<TokenNode> {
        Ok(grouping::group_statement(lexer::lex(sql)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::GroupKind;

    #[test]
    fn test_tokenize_returns_statement_root() {
        let tree = SqlTokenizer.tokenize("select a from b").unwrap();
        assert_eq!(tree.group_kind(), Some(GroupKind::Statement));
        assert_eq!(tree.text(), "select a from b");
    }

    #[test]
    fn test_empty_input() {
        let tree = SqlTokenizer.tokenize("").unwrap();
        assert!(tree.children().is_empty());
    }
}
