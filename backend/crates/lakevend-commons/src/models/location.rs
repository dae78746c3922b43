use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// File format of the objects backing a table, from the catalog's
/// `classification` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Delimited text with a header row.
    Csv,
    Parquet,
}

impl FileFormat {
    /// Object-key suffix of data files in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => ".csv",
            FileFormat::Parquet => ".parquet",
        }
    }
}

impl FromStr for FileFormat {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "parquet" => Ok(FileFormat::Parquet),
            _ => Err(ModelError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Csv => f.write_str("csv"),
            FileFormat::Parquet => f.write_str("parquet"),
        }
    }
}

/// Where and how to read permitted data once credentials are held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLocation {
    /// Table root, e.g. `s3://bucket/sample_db/sample_table`.
    pub storage_path: String,
    pub file_format: FileFormat,
    /// Columns to keep after parsing, in output order.
    pub columns: Vec<String>,
}

impl DataLocation {
    pub fn new(storage_path: impl Into<String>, file_format: FileFormat, columns: Vec<String>) -> Self {
        Self {
            storage_path: storage_path.into(),
            file_format,
            columns,
        }
    }

    /// Same location restricted to a different column list.
    pub fn with_columns<I, S>(&self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            storage_path: self.storage_path.clone(),
            file_format: self.file_format,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}
