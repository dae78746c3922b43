use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{ModelError, Result};

/// Non-empty, duplicate-free list of column names.
///
/// Order is preserved as given; callers that need schema order use
/// [`ColumnSet::ordered_by`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ColumnSet(Vec<String>);

impl ColumnSet {
    pub fn try_new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for column in columns {
            let column: String = column.into();
            let trimmed = column.trim();
            if trimmed.is_empty() {
                return Err(ModelError::Empty { field: "column name" });
            }
            if !seen.insert(trimmed.to_string()) {
                return Err(ModelError::DuplicateColumn(trimmed.to_string()));
            }
            out.push(trimmed.to_string());
        }
        if out.is_empty() {
            return Err(ModelError::Empty { field: "columns" });
        }
        Ok(Self(out))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.iter().any(|c| c == column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Members of `self` that also appear in `ordered`, in `ordered`'s order.
    ///
    /// The result is always a subset of `self`.
    pub fn ordered_by<S: AsRef<str>>(&self, ordered: &[S]) -> Vec<String> {
        ordered
            .iter()
            .map(AsRef::as_ref)
            .filter(|c| self.contains(c))
            .map(str::to_string)
            .collect()
    }
}

impl TryFrom<Vec<String>> for ColumnSet {
    type Error = ModelError;

    fn try_from(value: Vec<String>) -> Result<Self> {
        Self::try_new(value)
    }
}

impl From<ColumnSet> for Vec<String> {
    fn from(value: ColumnSet) -> Self {
        value.0
    }
}
