//! Permission, identity and data-access services backed by the sandbox lake.
//!
//! Failures carry the same error codes the real services use and go through
//! the vending crate's classifier, so callers see identical error kinds.

use std::sync::Arc;

use chrono::Duration;
use lakevend_commons::{
    ColumnGrant, PermissionType, TableReference, TemporaryCredentialBundle, VendingConstants,
};
use lakevend_vending::{
    classify_service_error, AssumeRoleRequest, AssumedSession, CallerIdentity, DataAccessService,
    IdentityService, PermissionsService, TableCredentialsRequest, TableMetadata, VendError,
    VendStep,
};

use crate::lake::{
    role_key, table_key, GrantSemantics, IssuedSession, IssuedTableCredentials, LakeState,
    SandboxLake,
};

const SESSION_LIFETIME_SECS: i64 = 3600;

fn service_error(step: VendStep, code: &str, message: impl Into<String>) -> VendError {
    classify_service_error(step, Some(code), message)
}

fn issue_bundle(
    state: &mut LakeState,
    prefix: &str,
    lifetime: Duration,
) -> Result<TemporaryCredentialBundle, VendError> {
    let access_key_id = state.next_key(prefix);
    let secret = format!("secret-{}", state.next_key(""));
    let token = format!("token-{}", state.next_key(""));
    TemporaryCredentialBundle::try_new(access_key_id, secret, token, state.now() + lifetime)
        .map_err(VendError::from)
}

#[async_trait::async_trait]
impl PermissionsService for SandboxLake {
    async fn grant_column_permission(&self, grant: &ColumnGrant) -> Result<(), VendError> {
        let step = VendStep::Grant;
        let mut state = self.state.lock();

        if !state.coordinator_is_admin {
            return Err(service_error(
                step,
                "AccessDeniedException",
                "caller is not a data lake administrator",
            ));
        }

        let key = table_key(&grant.table);
        let table = state.tables.get(&key).ok_or_else(|| {
            service_error(step, "EntityNotFoundException", format!("table {} not found", grant.table))
        })?;
        let schema_columns = table.column_names();
        if let Some(unknown) = grant.columns.iter().find(|c| !schema_columns.iter().any(|s| s == *c)) {
            return Err(service_error(
                step,
                "InvalidInputException",
                format!("column {} does not exist in {}", unknown, grant.table),
            ));
        }

        let role = role_key(&grant.grantee);
        if !state.roles.contains_key(&role) {
            return Err(service_error(
                step,
                "InvalidInputException",
                format!("principal {} does not exist", grant.grantee),
            ));
        }

        let grant_key = (role, key);
        let mut granted: Vec<String> = match state.grant_semantics {
            GrantSemantics::Replace => Vec::new(),
            GrantSemantics::Union => {
                state.grants.get(&grant_key).cloned().unwrap_or_default()
            },
        };
        granted.extend(grant.columns.iter().map(str::to_string));
        let ordered: Vec<String> = schema_columns
            .into_iter()
            .filter(|c| granted.contains(c))
            .collect();

        log::debug!(
            "Sandbox grant {:?} on {} to {}",
            ordered,
            grant.table,
            grant.grantee
        );
        state.grants.insert(grant_key, ordered);
        state.pending_propagation = state.propagation_delay;
        Ok(())
    }

    async fn for_session(
        &self,
        session: &AssumedSession,
    ) -> Result<Arc<dyn DataAccessService>, VendError> {
        let state = self.state.lock();
        let issued = state
            .sessions
            .get(session.credentials.access_key_id())
            .filter(|s| {
                s.secret_access_key == session.credentials.secret_access_key()
                    && s.session_token == session.credentials.session_token()
            })
            .ok_or_else(|| {
                service_error(VendStep::Credentialize, "UnrecognizedClientException", "unknown session")
            })?;
        if state.now() >= issued.expiration {
            return Err(service_error(
                VendStep::Credentialize,
                "ExpiredTokenException",
                "session credentials expired",
            ));
        }

        Ok(Arc::new(SandboxSession {
            lake: self.clone(),
            role: issued.role.clone(),
            region: state.region.clone(),
        }))
    }
}

#[async_trait::async_trait]
impl IdentityService for SandboxLake {
    async fn caller_identity(&self) -> Result<CallerIdentity, VendError> {
        let state = self.state.lock();
        Ok(CallerIdentity {
            account_id: state.account_id.clone(),
            arn: format!("arn:aws:iam::{}:user/coordinator", state.account_id),
        })
    }

    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<AssumedSession, VendError> {
        let step = VendStep::Assume;
        let mut state = self.state.lock();

        let role = role_key(&request.role);
        let required = state
            .roles
            .get(&role)
            .map(|r| r.required_tag.clone())
            .ok_or_else(|| {
                service_error(step, "AccessDenied", format!("role {} cannot be assumed", request.role))
            })?;
        if required != request.tag {
            return Err(service_error(
                step,
                "AccessDenied",
                format!(
                    "trust policy of {} requires session tag {}",
                    request.role, required.key()
                ),
            ));
        }

        let credentials = issue_bundle(&mut state, "ASIASESSION", Duration::seconds(SESSION_LIFETIME_SECS))?;
        state.sessions.insert(
            credentials.access_key_id().to_string(),
            IssuedSession {
                role: role.clone(),
                secret_access_key: credentials.secret_access_key().to_string(),
                session_token: credentials.session_token().to_string(),
                expiration: credentials.expiration(),
            },
        );

        let arn = state.roles.get(&role).map(|r| r.arn.clone()).unwrap_or_default();
        log::debug!("Sandbox session {} assumed {}", request.session_name, arn);
        Ok(AssumedSession {
            role: request.role.clone(),
            session_name: request.session_name.clone(),
            credentials,
        })
    }
}

/// Data-access calls made as one assumed role.
pub struct SandboxSession {
    lake: SandboxLake,
    role: String,
    region: String,
}

#[async_trait::async_trait]
impl DataAccessService for SandboxSession {
    fn region(&self) -> &str {
        &self.region
    }

    async fn get_temporary_table_credentials(
        &self,
        request: &TableCredentialsRequest,
    ) -> Result<TemporaryCredentialBundle, VendError> {
        let step = VendStep::Credentialize;
        let mut state = self.lake.state.lock();

        if request.table_arn != request.table.table_arn(&state.region) {
            return Err(service_error(
                step,
                "InvalidInputException",
                format!("unknown table ARN {}", request.table_arn),
            ));
        }
        if !(VendingConstants::MIN_CREDENTIAL_DURATION_SECS
            ..=VendingConstants::MAX_CREDENTIAL_DURATION_SECS)
            .contains(&request.duration_secs)
        {
            return Err(service_error(
                step,
                "InvalidInputException",
                format!("duration {} out of range", request.duration_secs),
            ));
        }

        let key = table_key(&request.table);
        let all_columns = state
            .tables
            .get(&key)
            .map(|t| t.column_names())
            .ok_or_else(|| {
                service_error(step, "EntityNotFoundException", format!("table {} not found", request.table))
            })?;

        if state.pending_propagation > 0 {
            state.pending_propagation -= 1;
            return Err(service_error(
                step,
                "AccessDeniedException",
                "insufficient Lake Formation permission(s)",
            ));
        }

        let columns = state
            .grants
            .get(&(self.role.clone(), key.clone()))
            .cloned()
            .unwrap_or_default();
        if columns.is_empty() {
            return Err(service_error(
                step,
                "AccessDeniedException",
                format!("no permissions on {}", request.table),
            ));
        }
        if request.supported_permission_types.is_empty() && columns != all_columns {
            return Err(service_error(
                step,
                "PermissionTypeMismatchException",
                "full-table credentials require access to every column",
            ));
        }

        let lifetime = Duration::seconds(i64::from(request.duration_secs));
        let credentials = issue_bundle(&mut state, "ASIATABLE", lifetime)?;
        state.issued.insert(
            credentials.access_key_id().to_string(),
            IssuedTableCredentials {
                table: key,
                columns,
                secret_access_key: credentials.secret_access_key().to_string(),
                session_token: credentials.session_token().to_string(),
                expiration: credentials.expiration(),
            },
        );
        Ok(credentials)
    }

    async fn get_unfiltered_table_metadata(
        &self,
        table: &TableReference,
        supported_permission_types: &[PermissionType],
    ) -> Result<TableMetadata, VendError> {
        let step = VendStep::Metadata;
        if supported_permission_types.is_empty() {
            return Err(service_error(
                step,
                "InvalidInputException",
                "SupportedPermissionTypes must not be empty",
            ));
        }

        let state = self.lake.state.lock();
        let key = table_key(table);
        let stored = state.tables.get(&key).ok_or_else(|| {
            service_error(step, "EntityNotFoundException", format!("table {} not found", table))
        })?;
        let authorized_columns = state
            .grants
            .get(&(self.role.clone(), key))
            .cloned()
            .unwrap_or_default();

        Ok(TableMetadata {
            storage_location: stored.storage_path.clone(),
            classification: Some(stored.file_format.to_string()),
            columns: stored.column_names(),
            authorized_columns,
        })
    }
}
