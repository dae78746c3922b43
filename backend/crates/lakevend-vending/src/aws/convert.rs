//! Conversions between lakevend models and AWS SDK types.

use std::error::Error as StdError;
use std::fmt::Debug;

use aws_sdk_sts::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_sts::primitives::DateTime as SmithyDateTime;
use chrono::{DateTime, Utc};
use lakevend_commons::{Permission, PermissionType, TemporaryCredentialBundle};

use crate::error::{classify_service_error, Result, VendError, VendStep};

/// Classify an SDK failure by its service error code.
pub(crate) fn sdk_error<E, R>(step: VendStep, err: SdkError<E, R>) -> VendError
where
    E: ProvideErrorMetadata + StdError + Send + Sync + 'static,
    R: Debug,
{
    let code = err.code().map(str::to_string);
    let message = match err.message() {
        Some(m) => m.to_string(),
        None => DisplayErrorContext(&err).to_string(),
    };
    log::debug!("{} call failed: code={:?} message={}", step, code, message);
    classify_service_error(step, code.as_deref(), message)
}

pub(crate) fn to_chrono(step: VendStep, value: &SmithyDateTime) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(value.secs(), value.subsec_nanos())
        .ok_or_else(|| VendError::service(step, format!("invalid expiration timestamp {}", value)))
}

pub(crate) fn bundle(
    step: VendStep,
    access_key_id: Option<&str>,
    secret_access_key: Option<&str>,
    session_token: Option<&str>,
    expiration: Option<&SmithyDateTime>,
) -> Result<TemporaryCredentialBundle> {
    let missing = |field: &str| VendError::service(step, format!("response is missing {}", field));
    let expiration = to_chrono(step, expiration.ok_or_else(|| missing("expiration"))?)?;
    TemporaryCredentialBundle::try_new(
        access_key_id.ok_or_else(|| missing("access key id"))?,
        secret_access_key.ok_or_else(|| missing("secret access key"))?,
        session_token.ok_or_else(|| missing("session token"))?,
        expiration,
    )
    .map_err(|e| VendError::service(step, e.to_string()))
}

pub(crate) fn lf_permission(permission: Permission) -> aws_sdk_lakeformation::types::Permission {
    use aws_sdk_lakeformation::types::Permission as LfPermission;
    match permission {
        Permission::Select => LfPermission::Select,
        Permission::Describe => LfPermission::Describe,
    }
}

pub(crate) fn lf_permission_type(
    permission_type: PermissionType,
) -> aws_sdk_lakeformation::types::PermissionType {
    use aws_sdk_lakeformation::types::PermissionType as LfPermissionType;
    match permission_type {
        PermissionType::ColumnPermission => LfPermissionType::ColumnPermission,
        PermissionType::CellFilterPermission => LfPermissionType::CellFilterPermission,
    }
}

pub(crate) fn glue_permission_type(
    permission_type: PermissionType,
) -> aws_sdk_glue::types::PermissionType {
    use aws_sdk_glue::types::PermissionType as GluePermissionType;
    match permission_type {
        PermissionType::ColumnPermission => GluePermissionType::ColumnPermission,
        PermissionType::CellFilterPermission => GluePermissionType::CellFilterPermission,
    }
}
