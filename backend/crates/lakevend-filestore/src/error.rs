use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReadError>;

/// The dataframe representation a read targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    /// Single-process table (Polars `DataFrame`).
    InMemory,
    /// Partitioned table (DataFusion record batch partitions).
    Partitioned,
}

impl Representation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Representation::InMemory => "in-memory",
            Representation::Partitioned => "partitioned",
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while reading permitted data.
#[derive(Error, Debug)]
pub enum ReadError {
    /// Credentials expired, were revoked, or do not cover the path.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid storage location: {0}")]
    InvalidLocation(String),

    #[error("No {format} data files under {path}")]
    NoDataFiles { path: String, format: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Column '{column}' not found in {representation} result")]
    MissingColumn {
        representation: Representation,
        column: String,
    },

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReadError {
    /// Whether the failure came from the storage layer refusing the credentials.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, ReadError::AccessDenied(_))
    }
}

impl From<object_store::Error> for ReadError {
    fn from(e: object_store::Error) -> Self {
        match e {
            object_store::Error::PermissionDenied { .. }
            | object_store::Error::Unauthenticated { .. } => ReadError::AccessDenied(e.to_string()),
            other => ReadError::Storage(other.to_string()),
        }
    }
}

impl From<datafusion::error::DataFusionError> for ReadError {
    fn from(e: datafusion::error::DataFusionError) -> Self {
        use datafusion::error::DataFusionError;

        match e.find_root() {
            DataFusionError::ObjectStore(inner) => store_error_ref(inner),
            DataFusionError::ArrowError(..) => ReadError::Parse(e.to_string()),
            _ => ReadError::Engine(e.to_string()),
        }
    }
}

impl From<polars::error::PolarsError> for ReadError {
    fn from(e: polars::error::PolarsError) -> Self {
        ReadError::Parse(e.to_string())
    }
}

fn store_error_ref(e: &object_store::Error) -> ReadError {
    match e {
        object_store::Error::PermissionDenied { .. }
        | object_store::Error::Unauthenticated { .. } => ReadError::AccessDenied(e.to_string()),
        other => ReadError::Storage(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_maps_to_access_denied() {
        let err: ReadError = object_store::Error::PermissionDenied {
            path: "db/t/part-0.csv".into(),
            source: "expired token".into(),
        }
        .into();
        assert!(err.is_access_denied());

        let err: ReadError = object_store::Error::NotFound {
            path: "db/t/part-0.csv".into(),
            source: "missing".into(),
        }
        .into();
        assert!(matches!(err, ReadError::Storage(_)));
    }

    #[test]
    fn test_wrapped_store_error_keeps_access_denied() {
        let inner = object_store::Error::Unauthenticated {
            path: "db/t".into(),
            source: "no token".into(),
        };
        let df_err = datafusion::error::DataFusionError::from(inner);
        let err: ReadError = df_err.into();
        assert!(err.is_access_denied(), "{err}");
    }

    #[test]
    fn test_missing_column_message() {
        let err = ReadError::MissingColumn {
            representation: Representation::Partitioned,
            column: "region".into(),
        };
        assert_eq!(err.to_string(), "Column 'region' not found in partitioned result");
    }
}
