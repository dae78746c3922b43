//! Lake Formation, Glue and STS implementations of the service traits.
//!
//! All clients are built from one shared [`SdkConfig`]. The data-access
//! client is rebuilt per vend call from the assumed session's credentials.

mod convert;
mod data_access;
mod identity;
mod permissions;

pub use data_access::AwsDataAccessService;
pub use identity::AwsIdentityService;
pub use permissions::AwsPermissionsService;

use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Load the SDK configuration from the default provider chain.
///
/// `region` overrides the chain's region when set.
pub async fn load_sdk_config(region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    loader.load().await
}
