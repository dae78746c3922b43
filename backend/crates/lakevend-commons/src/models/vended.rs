use chrono::{DateTime, Utc};

use super::{DataLocation, FileFormat, TableReference, TemporaryCredentialBundle};

/// Output of one vend call: credentials plus everything needed to read the
/// permitted slice of the table.
///
/// `authorized_columns` is authoritative; it may be narrower than what the
/// caller asked for but is never wider.
#[derive(Debug, Clone)]
pub struct VendedAccess {
    pub table: TableReference,
    pub credentials: TemporaryCredentialBundle,
    pub storage_path: String,
    pub file_format: FileFormat,
    pub authorized_columns: Vec<String>,
}

impl VendedAccess {
    /// Location restricted to the authorized columns.
    pub fn data_location(&self) -> DataLocation {
        DataLocation::new(
            self.storage_path.clone(),
            self.file_format,
            self.authorized_columns.clone(),
        )
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.credentials.is_expired_at(now)
    }
}
