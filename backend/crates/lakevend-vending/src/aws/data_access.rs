use std::time::SystemTime;

use aws_config::SdkConfig;
use aws_sdk_glue::Client as GlueClient;
use aws_sdk_lakeformation::config::Credentials;
use aws_sdk_lakeformation::Client as LakeFormationClient;
use lakevend_commons::{PermissionType, TableReference, TemporaryCredentialBundle, VendingConstants};

use super::convert::{bundle, glue_permission_type, lf_permission, lf_permission_type, sdk_error};
use crate::error::{Result, VendError, VendStep};
use crate::services::{AssumedSession, DataAccessService, TableCredentialsRequest, TableMetadata};

const PROVIDER_NAME: &str = "lakevend-assumed-role";

/// Lake Formation + Glue clients signed with an assumed session's credentials.
pub struct AwsDataAccessService {
    region: String,
    lakeformation: LakeFormationClient,
    glue: GlueClient,
}

impl AwsDataAccessService {
    pub fn for_session(sdk_config: &SdkConfig, session: &AssumedSession) -> Result<Self> {
        let region = sdk_config
            .region()
            .map(|r| r.as_ref().to_string())
            .ok_or_else(|| VendError::Validation("no AWS region configured".into()))?;

        let creds = &session.credentials;
        let provider = Credentials::new(
            creds.access_key_id(),
            creds.secret_access_key(),
            Some(creds.session_token().to_string()),
            Some(SystemTime::from(creds.expiration())),
            PROVIDER_NAME,
        );

        let lf_config = aws_sdk_lakeformation::config::Builder::from(sdk_config)
            .credentials_provider(provider.clone())
            .build();
        let glue_config = aws_sdk_glue::config::Builder::from(sdk_config)
            .credentials_provider(provider)
            .build();

        Ok(Self {
            region,
            lakeformation: LakeFormationClient::from_conf(lf_config),
            glue: GlueClient::from_conf(glue_config),
        })
    }
}

#[async_trait::async_trait]
impl DataAccessService for AwsDataAccessService {
    fn region(&self) -> &str {
        &self.region
    }

    async fn get_temporary_table_credentials(
        &self,
        request: &TableCredentialsRequest,
    ) -> Result<TemporaryCredentialBundle> {
        let duration = i32::try_from(request.duration_secs)
            .map_err(|_| VendError::Validation("credential duration out of range".into()))?;

        let mut call = self
            .lakeformation
            .get_temporary_glue_table_credentials()
            .table_arn(&request.table_arn)
            .set_permissions(Some(
                request.permissions.iter().copied().map(lf_permission).collect(),
            ))
            .duration_seconds(duration);
        for permission_type in &request.supported_permission_types {
            call = call.supported_permission_types(lf_permission_type(*permission_type));
        }

        let out = call
            .send()
            .await
            .map_err(|e| sdk_error(VendStep::Credentialize, e))?;

        bundle(
            VendStep::Credentialize,
            out.access_key_id(),
            out.secret_access_key(),
            out.session_token(),
            out.expiration(),
        )
    }

    async fn get_unfiltered_table_metadata(
        &self,
        table: &TableReference,
        supported_permission_types: &[PermissionType],
    ) -> Result<TableMetadata> {
        let out = self
            .glue
            .get_unfiltered_table_metadata()
            .catalog_id(table.catalog_id())
            .database_name(table.database_name())
            .name(table.table_name())
            .set_supported_permission_types(Some(
                supported_permission_types
                    .iter()
                    .copied()
                    .map(glue_permission_type)
                    .collect(),
            ))
            .send()
            .await
            .map_err(|e| sdk_error(VendStep::Metadata, e))?;

        let glue_table = out
            .table()
            .ok_or_else(|| VendError::service(VendStep::Metadata, "response has no table"))?;
        let sd = glue_table.storage_descriptor();

        let storage_location = sd
            .and_then(|sd| sd.location())
            .ok_or_else(|| {
                VendError::Validation(format!("table {} has no storage location", table))
            })?
            .to_string();

        let mut columns: Vec<String> = sd
            .map(|sd| sd.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();
        columns.extend(glue_table.partition_keys().iter().map(|c| c.name().to_string()));

        let classification = glue_table
            .parameters()
            .and_then(|p| p.get(VendingConstants::CLASSIFICATION_PARAMETER))
            .cloned();

        Ok(TableMetadata {
            storage_location,
            classification,
            columns,
            authorized_columns: out.authorized_columns().to_vec(),
        })
    }
}
