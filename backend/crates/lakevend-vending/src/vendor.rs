//! Credential vendor: grant → assume → credentialize.

use std::sync::Arc;
use std::time::Duration;

use lakevend_commons::{
    ColumnGrant, ColumnSet, FileFormat, GranteeIdentity, Permission, PermissionType, SessionTag,
    TableReference, VendedAccess, VendingConstants,
};
use log::{debug, info, warn};
use rand::Rng;

use crate::error::{Result, VendError, VendStep};
use crate::services::{
    AssumeRoleRequest, DataAccessService, IdentityService, PermissionsService,
    TableCredentialsRequest, TableMetadata,
};

/// Bounded exponential backoff for the credentialize step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure. 0 = no retry.
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
        }
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Settings applied to every vend call.
#[derive(Debug, Clone)]
pub struct VendOptions {
    pub session_tag: SessionTag,
    pub permissions: Vec<Permission>,
    pub supported_permission_types: Vec<PermissionType>,
    pub duration_secs: u32,
    /// Ask for full-table credentials instead of column-filtered ones.
    pub full_table_access: bool,
    pub retry: RetryPolicy,
}

impl VendOptions {
    /// SELECT on column-filtered credentials for one hour, no retry.
    pub fn new(session_tag: SessionTag) -> Self {
        Self {
            session_tag,
            permissions: vec![Permission::Select],
            supported_permission_types: vec![PermissionType::ColumnPermission],
            duration_secs: VendingConstants::DEFAULT_CREDENTIAL_DURATION_SECS,
            full_table_access: false,
            retry: RetryPolicy::none(),
        }
    }

    fn credential_permission_types(&self) -> Vec<PermissionType> {
        if self.full_table_access {
            Vec::new()
        } else {
            self.supported_permission_types.clone()
        }
    }

    fn metadata_permission_types(&self) -> Vec<PermissionType> {
        if self.supported_permission_types.is_empty() {
            vec![PermissionType::ColumnPermission]
        } else {
            self.supported_permission_types.clone()
        }
    }
}

/// One vend call's inputs.
#[derive(Debug, Clone)]
pub struct VendRequest {
    pub table: TableReference,
    pub grantee: GranteeIdentity,
    pub columns: ColumnSet,
}

/// Vends temporary, column-scoped table credentials on behalf of a grantee.
///
/// Stateless between calls: every `vend` re-runs all three steps.
pub struct CredentialVendor {
    permissions: Arc<dyn PermissionsService>,
    identity: Arc<dyn IdentityService>,
    options: VendOptions,
}

impl CredentialVendor {
    pub fn new(
        permissions: Arc<dyn PermissionsService>,
        identity: Arc<dyn IdentityService>,
        options: VendOptions,
    ) -> Self {
        Self {
            permissions,
            identity,
            options,
        }
    }

    /// Grant, assume and credentialize.
    ///
    /// The returned `authorized_columns` are the service's authorized columns
    /// restricted to the request, in table schema order.
    pub async fn vend(&self, request: &VendRequest) -> Result<VendedAccess> {
        if self.options.permissions.is_empty() {
            return Err(VendError::Validation("at least one permission is required".into()));
        }

        // Step 1: grant as the coordinating identity
        let grant = ColumnGrant {
            table: request.table.clone(),
            grantee: request.grantee.clone(),
            columns: request.columns.clone(),
            permissions: self.options.permissions.clone(),
        };
        self.permissions.grant_column_permission(&grant).await?;
        info!(
            "Fine grained permissions on {} have been authorized for {:?} columns of {}",
            request.grantee,
            request.columns.as_slice(),
            request.table
        );

        // Step 2: assume the grantee with the correlating session tag
        let caller = self.identity.caller_identity().await?;
        let session_name = session_name_for(&caller.account_id);
        let session = self
            .identity
            .assume_role(&AssumeRoleRequest {
                role: request.grantee.clone(),
                session_name,
                tag: self.options.session_tag.clone(),
            })
            .await?;
        info!(
            "Session '{}' with assumed role {} is created",
            session.session_name, session.role
        );

        // Step 3: credentialize as the assumed session
        let data_access = self.permissions.for_session(&session).await?;
        let credentials_request = TableCredentialsRequest {
            table: request.table.clone(),
            table_arn: request.table.table_arn(data_access.region()),
            permissions: self.options.permissions.clone(),
            supported_permission_types: self.options.credential_permission_types(),
            duration_secs: self.options.duration_secs,
        };
        let credentials = self
            .request_credentials(data_access.as_ref(), &credentials_request)
            .await?;

        let metadata = data_access
            .get_unfiltered_table_metadata(
                &request.table,
                &self.options.metadata_permission_types(),
            )
            .await?;

        let access = build_access(request, credentials, metadata)?;
        info!(
            "Vended credentials for {} (columns={:?}, expires={})",
            access.table, access.authorized_columns, access.credentials.expiration()
        );
        Ok(access)
    }

    async fn request_credentials(
        &self,
        data_access: &dyn DataAccessService,
        request: &TableCredentialsRequest,
    ) -> Result<lakevend_commons::TemporaryCredentialBundle> {
        let retry = self.options.retry;
        let mut attempt = 0;
        loop {
            match data_access.get_temporary_table_credentials(request).await {
                Ok(credentials) => return Ok(credentials),
                Err(e) if e.is_retryable() && attempt < retry.max_retries => {
                    attempt += 1;
                    let delay = retry.backoff_for(attempt);
                    warn!(
                        "Credential request for {} failed ({}); retry {}/{} in {:?}",
                        request.table, e, attempt, retry.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Session name: caller account followed by a small random suffix.
fn session_name_for(account_id: &str) -> String {
    let suffix: u32 = rand::rng().random_range(0..100);
    format!("{}{}", account_id, suffix)
}

fn build_access(
    request: &VendRequest,
    credentials: lakevend_commons::TemporaryCredentialBundle,
    metadata: TableMetadata,
) -> Result<VendedAccess> {
    let classification = metadata.classification.as_deref().ok_or_else(|| {
        VendError::Validation(format!("table {} has no classification parameter", request.table))
    })?;
    let file_format: FileFormat = classification.parse()?;

    // Schema order when the catalog reports the schema, otherwise the service's order
    let ordered = if metadata.columns.is_empty() {
        metadata.authorized_columns.clone()
    } else {
        metadata
            .columns
            .iter()
            .filter(|c| metadata.authorized_columns.contains(c))
            .cloned()
            .collect()
    };
    let authorized_columns = request.columns.ordered_by(&ordered);
    debug!(
        "Authorized columns for {}: service={:?}, effective={:?}",
        request.table, metadata.authorized_columns, authorized_columns
    );

    if authorized_columns.is_empty() {
        return Err(VendError::authorization(
            VendStep::Metadata,
            format!(
                "none of the requested columns {:?} are authorized for {}",
                request.columns.as_slice(),
                request.grantee
            ),
        ));
    }

    if metadata.storage_location.trim().is_empty() {
        return Err(VendError::Validation(format!(
            "table {} has no storage location",
            request.table
        )));
    }

    Ok(VendedAccess {
        table: request.table.clone(),
        credentials,
        storage_path: metadata.storage_location,
        file_format,
        authorized_columns,
    })
}
