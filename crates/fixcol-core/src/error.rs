//! Error types for the conversion engine.

use thiserror::Error;

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Main error type for the conversion engine.
///
/// The pipeline's fault-tolerance policy only applies to the structured
/// parse variants (`ShortRow`, `ParseValue`); everything else aborts the
/// run unconditionally.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Line {line}: row has {actual} characters, schema requires {expected}")]
    ShortRow {
        line: usize,
        actual: usize,
        expected: usize,
    },

    #[error("Line {line}, column '{column}': cannot parse {raw:?} as {expected}")]
    ParseValue {
        line: usize,
        column: String,
        raw: String,
        expected: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

impl ConvertError {
    /// Create a schema validation error.
    pub fn schema(msg: impl Into<String>) -> Self {
        ConvertError::Schema(msg.into())
    }

    /// True for structured row-level parse failures, the only class the
    /// fault-tolerant policy may downgrade to a soft stop.
    pub fn is_parse(&self) -> bool {
        matches!(self, ConvertError::ShortRow { .. } | ConvertError::ParseValue { .. })
    }
}
