//! Error types for the descriptive statistics engine.
//!
//! Data irregularities (blank cells, unparseable numbers, bad dates, non-positive
//! weights) are never errors: they are classified as missing and excluded from the
//! accumulators. `StatsError` is reserved for contract violations by the caller.

use thiserror::Error;

/// Result type for statistics operations.
pub type StatsResult<T> = Result<T, StatsError>;

/// Errors that can occur when a caller violates the engine's input contract.
#[derive(Error, Debug)]
pub enum StatsError {
    /// The weight column does not line up with the value column.
    #[error("Weight column has {weights} rows but value column has {column}")]
    LengthMismatch {
        /// Rows in the value column.
        column: usize,
        /// Rows in the weight column.
        weights: usize,
    },

    /// The variable descriptor is malformed.
    #[error("Invalid variable descriptor: {0}")]
    InvalidDescriptor(String),

    /// Invalid options or runner configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An Arrow column whose data type has no cell representation.
    #[error("Unsupported Arrow data type for column '{column}': {data_type}")]
    UnsupportedArrowType { column: String, data_type: String },

    /// A requested column is not present in the record batch.
    #[error("Column '{column}' not found in record batch")]
    ColumnNotFound { column: String },

    /// Arrow computation error.
    #[error("Arrow computation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A runner task failed to complete.
    #[error("Execution error: {0}")]
    Execution(String),
}

impl StatsError {
    /// Creates an invalid descriptor error with the given message.
    pub fn invalid_descriptor(msg: impl Into<String>) -> Self {
        Self::InvalidDescriptor(msg.into())
    }

    /// Creates an invalid configuration error with the given message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates an execution error with the given message.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Creates an unsupported Arrow type error.
    pub fn unsupported_arrow_type(column: impl Into<String>, data_type: impl ToString) -> Self {
        Self::UnsupportedArrowType {
            column: column.into(),
            data_type: data_type.to_string(),
        }
    }
}

/// Converts serde_json errors to StatsError.
impl From<serde_json::Error> for StatsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Converts join errors from the blocking pool to StatsError.
impl From<tokio::task::JoinError> for StatsError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Execution(err.to_string())
    }
}
