//! # lakevend-vending
//!
//! Turns a table + column list + grantee role into a temporary credential
//! bundle scoped to exactly that column grant.
//!
//! The coordinating identity that runs the vendor only needs permission-service
//! administration rights; it never reads storage itself.
//!
//! ## Flow
//!
//! 1. **Grant**: record a column-level SELECT grant for the grantee
//! 2. **Assume**: assume the grantee role with the correlating session tag
//! 3. **Credentialize**: as the assumed session, request temporary table
//!    credentials and the table's storage location and authorized columns
//!
//! The external services sit behind the traits in [`services`]; [`aws`] talks
//! to Lake Formation, Glue and STS.

pub mod aws;
pub mod error;
pub mod services;
pub mod vendor;

pub use error::{classify_service_error, Result, VendError, VendStep};
pub use services::{
    AssumeRoleRequest, AssumedSession, CallerIdentity, DataAccessService, IdentityService,
    PermissionsService, TableCredentialsRequest, TableMetadata,
};
pub use vendor::{CredentialVendor, RetryPolicy, VendOptions, VendRequest};
