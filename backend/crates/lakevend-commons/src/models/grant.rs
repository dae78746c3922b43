use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{ColumnSet, GranteeIdentity, TableReference};
use crate::errors::ModelError;

/// Data permission requested in a grant and when vending credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    Select,
    Describe,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Select => "SELECT",
            Permission::Describe => "DESCRIBE",
        }
    }
}

impl FromStr for Permission {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SELECT" => Ok(Permission::Select),
            "DESCRIBE" => Ok(Permission::Describe),
            _ => Err(ModelError::UnknownVariant {
                kind: "permission",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of fine-grained permission the reading engine can enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionType {
    ColumnPermission,
    CellFilterPermission,
}

impl PermissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionType::ColumnPermission => "COLUMN_PERMISSION",
            PermissionType::CellFilterPermission => "CELL_FILTER_PERMISSION",
        }
    }
}

impl FromStr for PermissionType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COLUMN_PERMISSION" => Ok(PermissionType::ColumnPermission),
            "CELL_FILTER_PERMISSION" => Ok(PermissionType::CellFilterPermission),
            _ => Err(ModelError::UnknownVariant {
                kind: "permission type",
                value: s.to_string(),
            }),
        }
    }
}

/// Permission record written to the permissions service on every vend call.
///
/// Owned by the external service once written; lakevend never revokes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnGrant {
    pub table: TableReference,
    pub grantee: GranteeIdentity,
    pub columns: ColumnSet,
    pub permissions: Vec<Permission>,
}

impl ColumnGrant {
    /// SELECT grant on `columns`.
    pub fn select(table: TableReference, grantee: GranteeIdentity, columns: ColumnSet) -> Self {
        Self {
            table,
            grantee,
            columns,
            permissions: vec![Permission::Select],
        }
    }
}
