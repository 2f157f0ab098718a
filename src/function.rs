//! Parsed annotation functions.
//!
//! These are the values handed back to callers. They own all their data and
//! keep no reference into the token tree they were extracted from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel column list entry meaning "train on every column".
pub const WILDCARD: &str = "*";

/// The supported annotation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Train,
    Predict,
}

impl FunctionKind {
    /// Case-insensitive lookup by function name. Unknown names give `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("train") {
            Some(FunctionKind::Train)
        } else if name.eq_ignore_ascii_case("predict") {
            Some(FunctionKind::Predict)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionKind::Train => "train",
            FunctionKind::Predict => "predict",
        }
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `layer.train(...)` inside a CTAS statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainFunction {
    /// Relation the training data is selected from
    pub source_name: String,
    /// Table being created
    pub target_name: String,
    /// Either `["*"]` or the listed columns in written order
    pub train_columns: Vec<String>,
}

impl TrainFunction {
    /// True when training on all columns.
    pub fn is_wildcard(&self) -> bool {
        self.train_columns.len() == 1 && self.train_columns[0] == WILDCARD
    }
}

/// `layer.predict('model', ...)` inside a CTAS statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictFunction {
    pub source_name: String,
    pub target_name: String,
    /// Unquoted model name from the first argument
    pub model_name: String,
    /// Plain select-list columns, excluding the annotation call
    pub select_columns: Vec<String>,
    /// Columns passed to the model
    pub predict_columns: Vec<String>,
    /// Output column for predictions: the call's alias or the configured default
    pub prediction_column: String,
    /// Executable SQL with the annotation removed
    pub rebuilt_sql: String,
}

/// A recognized annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "function", rename_all = "lowercase")]
pub enum AnnotationFunction {
    Train(TrainFunction),
    Predict(PredictFunction),
}

impl AnnotationFunction {
    pub fn kind(&self) -> FunctionKind {
        match self {
            AnnotationFunction::Train(_) => FunctionKind::Train,
            AnnotationFunction::Predict(_) => FunctionKind::Predict,
        }
    }

    pub fn source_name(&self) -> &str {
        match self {
            AnnotationFunction::Train(f) => &f.source_name,
            AnnotationFunction::Predict(f) => &f.source_name,
        }
    }

    pub fn target_name(&self) -> &str {
        match self {
            AnnotationFunction::Train(f) => &f.target_name,
            AnnotationFunction::Predict(f) => &f.target_name,
        }
    }

    pub fn as_train(&self) -> Option<&TrainFunction> {
        match self {
            AnnotationFunction::Train(f) => Some(f),
            AnnotationFunction::Predict(_) => None,
        }
    }

    pub fn as_predict(&self) -> Option<&PredictFunction> {
        match self {
            AnnotationFunction::Train(_) => None,
            AnnotationFunction::Predict(f) => Some(f),
        }
    }
}

impl fmt::Display for AnnotationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}",
            self.kind(),
            self.source_name(),
            self.target_name()
        )
    }
}
