//! Rebuilds a plain, executable query from a predict annotation.

use std::collections::HashSet;

use crate::error::LayerSqlResult;
use crate::token::TokenNode;
use crate::tokenizer::Tokenize;

/// Trait for converting values to a SQL string.
pub trait ToSql {
    /// Convert this value to a SQL string.
    fn to_sql(&self) -> String;
}

/// `select <columns> from <source> <suffix>` with the annotation removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuiltQuery {
    pub columns: Vec<String>,
    pub source_name: String,
    pub suffix: String,
}

impl RebuiltQuery {
    /// Select columns first, then predict columns not already selected.
    /// `suffix` is the verbatim span after the source relation.
    pub fn new(
        select_columns: &[String],
        predict_columns: &[String],
        source_name: impl Into<String>,
        suffix: &[TokenNode],
    ) -> Self {
        Self {
            columns: merge_columns(select_columns, predict_columns),
            source_name: source_name.into(),
            suffix: suffix
                .iter()
                .map(TokenNode::text)
                .collect::<String>()
                .trim()
                .to_string(),
        }
    }

    /// Render and normalize through `tokenizer`: keywords lowercased,
    /// whitespace collapsed, comments dropped.
    pub fn to_normalized_sql<T>(&self, tokenizer: &T) -> LayerSqlResult<String>
    where
        T: Tokenize + ?Sized,
    {
        let tree = tokenizer.tokenize(&self.to_sql())?;
        Ok(tree.render_compact(true))
    }
}

impl ToSql for RebuiltQuery {
    fn to_sql(&self) -> String {
        let mut sql = String::from("select ");
        sql.push_str(&self.columns.join(", "));
        sql.push_str(" from ");
        sql.push_str(&self.source_name);
        if !self.suffix.is_empty() {
            sql.push(' ');
            sql.push_str(&self.suffix);
        }
        sql
    }
}

/// Stable union: `first` then `second`, keeping only the first occurrence
/// of each column.
pub fn merge_columns(first: &[String], second: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    first
        .iter()
        .chain(second)
        .filter(|column| seen.insert(column.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::SqlTokenizer;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn suffix(sql: &str) -> Vec<TokenNode> {
        SqlTokenizer.tokenize(sql).unwrap().children().to_vec()
    }

    #[test]
    fn test_merge_columns_first_occurrence_wins() {
        let merged = merge_columns(&cols(&["a", "b", "a"]), &cols(&["c", "b", "d"]));
        assert_eq!(merged, cols(&["a", "b", "c", "d"]));
    }

    #[test]
    fn test_merge_columns_is_idempotent() {
        let once = merge_columns(&cols(&["x", "y"]), &cols(&["y", "z", "x"]));
        let twice = merge_columns(&once, &cols(&["y", "z", "x"]));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_to_sql_without_suffix() {
        let q = RebuiltQuery::new(&cols(&["a", "b"]), &cols(&["c", "d"]), "src", &[]);
        assert_eq!(q.to_sql(), "select a, b, c, d from src");
    }

    #[test]
    fn test_normalized_sql_lowercases_keywords() {
        let q = RebuiltQuery::new(
            &cols(&["a"]),
            &cols(&["a", "c"]),
            "src",
            &suffix("WHERE   x > 1\n GROUP BY a LIMIT 10"),
        );
        assert_eq!(
            q.to_normalized_sql(&SqlTokenizer).unwrap(),
            "select a, c from src where x > 1 group by a limit 10"
        );
    }

    #[test]
    fn test_normalized_sql_keeps_literals_and_names() {
        let q = RebuiltQuery::new(
            &cols(&["\"Mixed Case\""]),
            &cols(&["c"]),
            "src",
            &suffix("WHERE label = 'SELECT  X'"),
        );
        assert_eq!(
            q.to_normalized_sql(&SqlTokenizer).unwrap(),
            "select \"Mixed Case\", c from src where label = 'SELECT  X'"
        );
    }

    #[test]
    fn test_numeric_literals_survive_normalization() {
        let q = RebuiltQuery::new(
            &cols(&["a"]),
            &cols(&["c"]),
            "src",
            &suffix(" where score > .5 and n < 1e5 -- tail\n"),
        );
        assert_eq!(q.suffix, "where score > .5 and n < 1e5 -- tail");
        assert_eq!(
            q.to_normalized_sql(&SqlTokenizer).unwrap(),
            "select a, c from src where score > .5 and n < 1e5"
        );
    }
}
