use crate::row::Column;
use crate::value::ValueKind;

/// Error types for sqlx-named-params
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A quoted literal was still open when the template ended
    #[error("Unterminated quoted literal starting at byte offset {offset}")]
    UnterminatedQuote { offset: usize },

    /// A parameter prefix was not followed by any name characters
    #[error("Empty parameter name at byte offset {offset}")]
    EmptyParameterName { offset: usize },

    /// A column marked as required is absent from the mapped row
    #[error("required column {0} not found")]
    MissingRequiredColumn(Column),

    /// The row value cannot be narrowed to the type the binder expects
    #[error("column {column} has a type of {actual} and does not match asserted type: {expected}")]
    TypeMismatch {
        column: Column,
        actual: ValueKind,
        expected: ValueKind,
    },

    /// The driver could not decode a column value
    #[error("Failed to decode column {column}: {source}")]
    Decode {
        column: Column,
        #[source]
        source: sqlx::error::BoxDynError,
    },

    /// A parameter binder or field extraction closure rejected its value
    #[error("Binding failed: {0}")]
    Bind(String),

    /// Error from SQLx database operations
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type alias for sqlx-named-params operations
pub type Result<T> = std::result::Result<T, Error>;
