use aws_config::SdkConfig;
use aws_sdk_sts::types::Tag;
use aws_sdk_sts::Client as StsClient;

use super::convert::{bundle, sdk_error};
use crate::error::{Result, VendError, VendStep};
use crate::services::{AssumeRoleRequest, AssumedSession, CallerIdentity, IdentityService};

/// STS-backed identity service acting as the coordinating identity.
#[derive(Clone)]
pub struct AwsIdentityService {
    client: StsClient,
}

impl AwsIdentityService {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: StsClient::new(config),
        }
    }
}

#[async_trait::async_trait]
impl IdentityService for AwsIdentityService {
    async fn caller_identity(&self) -> Result<CallerIdentity> {
        let out = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| sdk_error(VendStep::Identify, e))?;

        let account_id = out
            .account()
            .ok_or_else(|| VendError::service(VendStep::Identify, "caller identity has no account"))?
            .to_string();
        Ok(CallerIdentity {
            account_id,
            arn: out.arn().unwrap_or_default().to_string(),
        })
    }

    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<AssumedSession> {
        let tag = Tag::builder()
            .key(request.tag.key())
            .value(request.tag.value())
            .build()
            .map_err(|e| VendError::Validation(format!("session tag: {}", e)))?;

        let out = self
            .client
            .assume_role()
            .role_arn(request.role.as_str())
            .role_session_name(&request.session_name)
            .tags(tag)
            .send()
            .await
            .map_err(|e| sdk_error(VendStep::Assume, e))?;

        let creds = out
            .credentials()
            .ok_or_else(|| VendError::service(VendStep::Assume, "response has no credentials"))?;
        let credentials = bundle(
            VendStep::Assume,
            Some(creds.access_key_id()),
            Some(creds.secret_access_key()),
            Some(creds.session_token()),
            Some(creds.expiration()),
        )?;

        Ok(AssumedSession {
            role: request.role.clone(),
            session_name: request.session_name.clone(),
            credentials,
        })
    }
}
