//! # layer-sql: annotated SQL for in-database ML
//!
//! > **Train and predict without leaving SQL.**
//!
//! layer-sql recognizes `layer.train(...)` and `layer.predict(...)` calls
//! embedded in `CREATE TABLE ... AS (SELECT ...)` statements and extracts
//! what the execution layer needs to run them.
//!
//! ## Quick Example
//!
//! ```rust
//! use layer_sql::prelude::*;
//!
//! let sql = "create or replace table scored as \
//!            (select id, layer.predict('churn', age, plan) from customers)";
//!
//! let parsed = layer_sql::parse(sql).unwrap().unwrap();
//! let predict = parsed.as_predict().unwrap();
//! assert_eq!(predict.model_name, "churn");
//! assert_eq!(predict.rebuilt_sql, "select id, age, plan from customers");
//! ```
//!
//! ## Annotations
//!
//! | Call                            | Result            |
//! |---------------------------------|-------------------|
//! | `layer.train(*)`                | train on all columns |
//! | `layer.train(a, b)`             | train on `a`, `b`    |
//! | `layer.predict('model', a, b)`  | predict with `model` over `a`, `b` |
//!
//! Plain SQL parses to `Ok(None)`. A recognized call with bad arguments is
//! an error.

pub mod arguments;
pub mod config;
pub mod error;
pub mod function;
pub mod locator;
pub mod parser;
pub mod rebuild;
pub mod search;
pub mod shape;
pub mod token;
pub mod tokenizer;

pub use parser::LayerSqlParser;

pub mod prelude {
    pub use crate::config::LayerSqlConfig;
    pub use crate::error::*;
    pub use crate::function::*;
    pub use crate::parser::LayerSqlParser;
    pub use crate::rebuild::ToSql;
    pub use crate::token::{GroupKind, TokenKind, TokenNode};
    pub use crate::tokenizer::{SqlTokenizer, Tokenize};
}

/// Parse one statement with the default configuration.
///
/// # Example
///
/// ```
/// use layer_sql::parse;
///
/// let f = parse("create or replace table m as (select layer.train(a, b) from src)")
///     .unwrap()
///     .unwrap();
/// assert_eq!(f.target_name(), "m");
/// ```
pub fn parse(sql: &str) -> error::LayerSqlResult<Option<function::AnnotationFunction>> {
    LayerSqlParser::new().parse(sql)
}
