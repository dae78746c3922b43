use thiserror::Error;

/// Result type for model construction.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Validation failures raised when building model values at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} '{value}' contains an invalid sequence: {reason}")]
    InvalidCharacters {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("unsupported file format '{0}' (supported: csv, parquet)")]
    UnsupportedFormat(String),

    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}
