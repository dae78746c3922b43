use std::sync::Arc;

use aws_config::SdkConfig;
use aws_sdk_lakeformation::types::{DataLakePrincipal, Resource, TableWithColumnsResource};
use aws_sdk_lakeformation::Client as LakeFormationClient;
use lakevend_commons::ColumnGrant;

use super::convert::{lf_permission, sdk_error};
use super::data_access::AwsDataAccessService;
use crate::error::{Result, VendError, VendStep};
use crate::services::{AssumedSession, DataAccessService, PermissionsService};

/// Lake Formation administration as the coordinating identity.
#[derive(Clone)]
pub struct AwsPermissionsService {
    sdk_config: SdkConfig,
    client: LakeFormationClient,
}

impl AwsPermissionsService {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            sdk_config: sdk_config.clone(),
            client: LakeFormationClient::new(sdk_config),
        }
    }
}

#[async_trait::async_trait]
impl PermissionsService for AwsPermissionsService {
    async fn grant_column_permission(&self, grant: &ColumnGrant) -> Result<()> {
        let table = TableWithColumnsResource::builder()
            .catalog_id(grant.table.catalog_id())
            .database_name(grant.table.database_name())
            .name(grant.table.table_name())
            .set_column_names(Some(grant.columns.as_slice().to_vec()))
            .build()
            .map_err(|e| VendError::Validation(format!("grant resource: {}", e)))?;

        let principal = DataLakePrincipal::builder()
            .data_lake_principal_identifier(grant.grantee.as_str())
            .build();

        self.client
            .grant_permissions()
            .catalog_id(grant.table.catalog_id())
            .principal(principal)
            .resource(Resource::builder().table_with_columns(table).build())
            .set_permissions(Some(
                grant.permissions.iter().copied().map(lf_permission).collect(),
            ))
            .send()
            .await
            .map_err(|e| sdk_error(VendStep::Grant, e))?;

        Ok(())
    }

    async fn for_session(&self, session: &AssumedSession) -> Result<Arc<dyn DataAccessService>> {
        let service = AwsDataAccessService::for_session(&self.sdk_config, session)?;
        Ok(Arc::new(service))
    }
}
