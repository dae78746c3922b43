use lakevend_commons::ModelError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SandboxError>;

/// Errors raised by the sandbox setup helpers.
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("Database '{0}' already exists")]
    DatabaseExists(String),

    #[error("Database '{0}' does not exist")]
    UnknownDatabase(String),

    #[error("Table '{0}' already exists")]
    TableExists(String),

    #[error("Table '{0}' needs at least one data file")]
    EmptyTable(String),

    #[error("Data files of table '{0}' have different schemas")]
    SchemaMismatch(String),

    #[error("Role '{0}' already exists")]
    RoleExists(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
