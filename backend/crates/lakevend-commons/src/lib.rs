//! # lakevend-commons
//!
//! Shared model types used by every lakevend crate.
//!
//! ## Type-Safe Wrappers
//!
//! - `TableReference`: catalog id + database + table name of a registered dataset
//! - `GranteeIdentity`: role assumed on behalf of the consuming application
//! - `SessionTag`: correlation tag checked by the grantee role's trust policy
//! - `ColumnSet`: non-empty, duplicate-free ordered column list
//!
//! ## Credential Flow Models
//!
//! - `ColumnGrant`: the permission record written by the vendor
//! - `TemporaryCredentialBundle`: short-lived access key / secret / session token
//! - `DataLocation`: where and how to read the permitted data
//! - `VendedAccess`: everything a reader needs, produced by one vend call
//!
//! ```rust
//! use lakevend_commons::{ColumnSet, TableReference};
//!
//! let table = TableReference::try_new("123456789012", "sample_db", "sample_table").unwrap();
//! let columns = ColumnSet::try_new(["name", "amount"]).unwrap();
//! assert_eq!(table.to_string(), "sample_db.sample_table");
//! assert_eq!(columns.len(), 2);
//! ```

pub mod constants;
pub mod errors;
pub mod models;

pub use constants::VendingConstants;
pub use errors::{ModelError, Result};
pub use models::{
    ColumnGrant, ColumnSet, DataLocation, FileFormat, GranteeIdentity, Permission,
    PermissionType, SessionTag, TableReference, TemporaryCredentialBundle, VendedAccess,
};
