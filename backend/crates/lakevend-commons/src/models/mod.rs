pub mod columns;
pub mod credentials;
pub mod grant;
pub mod identity;
pub mod location;
pub mod table_reference;
pub mod vended;

pub use columns::ColumnSet;
pub use credentials::TemporaryCredentialBundle;
pub use grant::{ColumnGrant, Permission, PermissionType};
pub use identity::{GranteeIdentity, SessionTag};
pub use location::{DataLocation, FileFormat};
pub use table_reference::TableReference;
pub use vended::VendedAccess;

use crate::errors::{ModelError, Result};

/// Shared identifier check: non-empty, no path traversal, no separators, no NUL.
///
/// Identifiers end up inside ARNs and object-store keys, so anything that can
/// change the shape of a path is rejected here.
pub(crate) fn validate_identifier(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ModelError::Empty { field });
    }
    let reason = if value.contains("..") {
        Some("'..' (path traversal)")
    } else if value.contains('/') || value.contains('\\') {
        Some("directory separator")
    } else if value.contains('\0') {
        Some("null byte")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(ModelError::InvalidCharacters {
            field,
            value: value.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
