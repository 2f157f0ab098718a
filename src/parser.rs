//! Annotated SQL parser.
//!
//! Recognizes a train or predict call embedded in a CTAS statement:
//!
//! ```text
//! create or replace table out as (select a, b, layer.predict('m1', c, d) from src)
//! ─────────────┬─────────────── ──────────────────┬─────────────────────────────────
//!              │                                  └── select list, source, suffix
//!              └── target table
//! ```
//!
//! Steps: tokenize, locate the namespace call, match the statement shape,
//! classify the call, extract arguments, and for predict rebuild plain SQL.
//! Anything that falls out before argument extraction is `Ok(None)`.

use tracing::{debug, trace};

use crate::arguments;
use crate::config::LayerSqlConfig;
use crate::error::LayerSqlResult;
use crate::function::{AnnotationFunction, FunctionKind, PredictFunction, TrainFunction};
use crate::locator::{contains_call, locate, LocatedFunction};
use crate::rebuild::RebuiltQuery;
use crate::shape::{match_statement, StatementShape};
use crate::token::TokenNode;
use crate::tokenizer::{SqlTokenizer, Tokenize};

/// Parser for annotated SQL statements.
#[derive(Debug, Clone, Default)]
pub struct LayerSqlParser<T = SqlTokenizer> {
    config: LayerSqlConfig,
    tokenizer: T,
}

impl LayerSqlParser<SqlTokenizer> {
    /// Parser with the default config and tokenizer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayerSqlConfig) -> Self {
        Self {
            config,
            tokenizer: SqlTokenizer,
        }
    }
}

impl<T: Tokenize> LayerSqlParser<T> {
    /// Parser backed by a custom tokenizer.
    pub fn with_tokenizer(config: LayerSqlConfig, tokenizer: T) -> Self {
        Self { config, tokenizer }
    }

    pub fn config(&self) -> &LayerSqlConfig {
        &self.config
    }

    /// The raw token tree, for diagnostics.
    pub fn tokenize(&self, sql: &str) -> LayerSqlResult<TokenNode> {
        self.tokenizer.tokenize(sql)
    }

    /// Parse one statement.
    ///
    /// Returns `Ok(None)` if it is not annotated SQL, and an error only when
    /// a train/predict call was found but its arguments are malformed.
    ///
    /// # Example
    ///
    /// ```
    /// use layer_sql::LayerSqlParser;
    ///
    /// let parser = LayerSqlParser::new();
    /// let f = parser
    ///     .parse("create or replace table out as (select layer.train(*) from src)")
    ///     .unwrap()
    ///     .unwrap();
    /// assert_eq!(f.source_name(), "src");
    /// assert!(parser.parse("select * from src").unwrap().is_none());
    /// ```
    pub fn parse(&self, sql: &str) -> LayerSqlResult<Option<AnnotationFunction>> {
        let namespace = self.config.namespace.as_str();
        let tree = self.tokenizer.tokenize(sql)?;
        trace!("token tree:\n{}", tree.pretty());

        let Some(function) = locate(&tree, namespace) else {
            debug!("no {}.* call found", namespace);
            return Ok(None);
        };

        let Some(shape) = match_statement(&tree, &self.tokenizer)? else {
            return Ok(None);
        };

        if !shape
            .select_items
            .iter()
            .any(|item| contains_call(item, namespace))
        {
            debug!("{} is not part of the select list", function.rendered());
            return Ok(None);
        }

        let Some(kind) = function.kind() else {
            debug!("unsupported function {}.{}", namespace, function.name());
            return Ok(None);
        };

        let parsed = match kind {
            FunctionKind::Train => AnnotationFunction::Train(self.build_train(&function, shape)?),
            FunctionKind::Predict => {
                AnnotationFunction::Predict(self.build_predict(&function, shape)?)
            }
        };
        debug!("parsed {}", parsed);
        Ok(Some(parsed))
    }

    fn build_train(
        &self,
        function: &LocatedFunction<'_>,
        shape: StatementShape,
    ) -> LayerSqlResult<TrainFunction> {
        Ok(TrainFunction {
            train_columns: arguments::train_columns(function)?,
            source_name: shape.source_name,
            target_name: shape.target_name,
        })
    }

    fn build_predict(
        &self,
        function: &LocatedFunction<'_>,
        shape: StatementShape,
    ) -> LayerSqlResult<PredictFunction> {
        let args = arguments::predict_arguments(function)?;
        let select_columns = arguments::select_columns(&shape.select_items, &self.config.namespace);
        let prediction_column =
            arguments::prediction_column(function, &self.config.default_prediction_column);

        let query = RebuiltQuery::new(
            &select_columns,
            &args.predict_columns,
            shape.source_name.as_str(),
            &shape.suffix,
        );
        let rebuilt_sql = query.to_normalized_sql(&self.tokenizer)?;

        Ok(PredictFunction {
            source_name: shape.source_name,
            target_name: shape.target_name,
            model_name: args.model_name,
            select_columns,
            predict_columns: args.predict_columns,
            prediction_column,
            rebuilt_sql,
        })
    }
}
