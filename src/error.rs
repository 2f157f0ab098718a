//! Error types for layer-sql.

use thiserror::Error;

/// The main error type for layer-sql operations.
///
/// A statement that simply isn't annotated SQL is not an error; the parser
/// returns `Ok(None)` for it. These variants cover the cases where the
/// annotation was recognized but can't be honoured.
#[derive(Debug, Error)]
pub enum LayerSqlError {
    /// The namespace call was found but its arguments have the wrong shape.
    #[error("Malformed arguments in '{function}': {reason}")]
    MalformedAnnotationArguments { function: String, reason: String },

    /// A tokenizer collaborator failed on the input text.
    #[error("Tokenize error at position {position}: {message}")]
    Tokenize { position: usize, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LayerSqlError {
    /// Create a malformed-arguments error for the given rendered call.
    pub fn malformed(function: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedAnnotationArguments {
            function: function.into(),
            reason: reason.into(),
        }
    }

    /// Create a tokenize error at the given position.
    pub fn tokenize(position: usize, message: impl Into<String>) -> Self {
        Self::Tokenize {
            position,
            message: message.into(),
        }
    }
}

/// Result type alias for layer-sql operations.
pub type LayerSqlResult<T> = Result<T, LayerSqlError>;
