//! Type-safe reference to a table registered in the data catalog.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::validate_identifier;
use crate::errors::{ModelError, Result};

/// Identifies a registered tabular dataset: `{catalog_id, database_name, table_name}`.
///
/// Immutable once built; every part is validated so it can be embedded in a
/// table ARN without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TableReferenceParts")]
pub struct TableReference {
    catalog_id: String,
    database_name: String,
    table_name: String,
}

#[derive(Deserialize)]
struct TableReferenceParts {
    catalog_id: String,
    database_name: String,
    table_name: String,
}

impl TryFrom<TableReferenceParts> for TableReference {
    type Error = ModelError;

    fn try_from(parts: TableReferenceParts) -> Result<Self> {
        Self::try_new(parts.catalog_id, parts.database_name, parts.table_name)
    }
}

impl TableReference {
    /// Build a reference, validating each component.
    pub fn try_new(
        catalog_id: impl Into<String>,
        database_name: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Result<Self> {
        let catalog_id = catalog_id.into();
        let database_name = database_name.into();
        let table_name = table_name.into();

        validate_identifier("catalog_id", &catalog_id)?;
        validate_identifier("database_name", &database_name)?;
        validate_identifier("table_name", &table_name)?;

        Ok(Self {
            catalog_id,
            database_name,
            table_name,
        })
    }

    pub fn catalog_id(&self) -> &str {
        &self.catalog_id
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Glue table ARN used when requesting temporary table credentials.
    pub fn table_arn(&self, region: &str) -> String {
        format!(
            "arn:aws:glue:{}:{}:table/{}/{}",
            region, self.catalog_id, self.database_name, self.table_name
        )
    }
}

impl fmt::Display for TableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database_name, self.table_name)
    }
}
