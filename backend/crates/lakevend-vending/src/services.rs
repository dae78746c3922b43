//! Interfaces of the external services the vendor talks to.
//!
//! Implementations: [`crate::aws`] for Lake Formation / Glue / STS, and the
//! in-memory lake in `lakevend-sandbox`.

use std::sync::Arc;

use lakevend_commons::{
    ColumnGrant, GranteeIdentity, Permission, PermissionType, SessionTag, TableReference,
    TemporaryCredentialBundle,
};

use crate::error::Result;

/// Identity of the coordinating caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub account_id: String,
    pub arn: String,
}

#[derive(Debug, Clone)]
pub struct AssumeRoleRequest {
    pub role: GranteeIdentity,
    pub session_name: String,
    pub tag: SessionTag,
}

/// Short-lived session acting as the grantee role.
///
/// Its credentials only authorize permission-service calls; table data is
/// read with the separate bundle vended in the credentialize step.
#[derive(Debug, Clone)]
pub struct AssumedSession {
    pub role: GranteeIdentity,
    pub session_name: String,
    pub credentials: TemporaryCredentialBundle,
}

#[derive(Debug, Clone)]
pub struct TableCredentialsRequest {
    pub table: TableReference,
    pub table_arn: String,
    pub permissions: Vec<Permission>,
    /// Empty = request full-table credentials.
    pub supported_permission_types: Vec<PermissionType>,
    pub duration_secs: u32,
}

/// Catalog view of a table as seen by the assumed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    /// Storage root, e.g. `s3://bucket/db/table`
    pub storage_location: String,
    /// `classification` table parameter (csv, parquet, ...)
    pub classification: Option<String>,
    /// Every column of the table in schema order
    pub columns: Vec<String>,
    /// Columns the session is entitled to read
    pub authorized_columns: Vec<String>,
}

/// Permission administration, performed as the coordinating identity.
#[async_trait::async_trait]
pub trait PermissionsService: Send + Sync {
    /// Record a column-level grant for the grantee.
    async fn grant_column_permission(&self, grant: &ColumnGrant) -> Result<()>;

    /// Data-access client that acts as `session` instead of the caller.
    async fn for_session(&self, session: &AssumedSession) -> Result<Arc<dyn DataAccessService>>;
}

/// Identity/token service.
#[async_trait::async_trait]
pub trait IdentityService: Send + Sync {
    async fn caller_identity(&self) -> Result<CallerIdentity>;

    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<AssumedSession>;
}

/// Data-access calls made as an assumed grantee session.
#[async_trait::async_trait]
pub trait DataAccessService: Send + Sync {
    /// Region the session's catalog lives in; used for the table ARN.
    fn region(&self) -> &str;

    async fn get_temporary_table_credentials(
        &self,
        request: &TableCredentialsRequest,
    ) -> Result<TemporaryCredentialBundle>;

    async fn get_unfiltered_table_metadata(
        &self,
        table: &TableReference,
        supported_permission_types: &[PermissionType],
    ) -> Result<TableMetadata>;
}
