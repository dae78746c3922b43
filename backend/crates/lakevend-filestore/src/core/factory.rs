//! ObjectStore factory for vended credentials.
//!
//! Stores are always built from an explicit credential bundle with
//! `AmazonS3Builder::new()`; the ambient identity (environment variables,
//! instance profile) is never consulted.
//!
//! # Timeout Configuration
//!
//! Timeouts come from the `[storage.remote_timeouts]` section:
//! - `request_timeout_secs` - timeout for object reads and listings (default: 60s)
//! - `connect_timeout_secs` - timeout for connection establishment (default: 10s)

use std::sync::Arc;
use std::time::Duration;

use lakevend_commons::TemporaryCredentialBundle;
use lakevend_configs::config::types::{RemoteStorageTimeouts, StorageSettings};
use object_store::aws::AmazonS3Builder;
use object_store::{ClientOptions, ObjectStore};

use crate::core::paths::StorageUrl;
use crate::error::{ReadError, Result};

const DEFAULT_REGION: &str = "us-east-1";

/// Build ClientOptions with timeouts from configuration.
fn build_client_options(timeouts: &RemoteStorageTimeouts) -> ClientOptions {
    ClientOptions::new()
        .with_timeout(Duration::from_secs(timeouts.request_timeout_secs))
        .with_connect_timeout(Duration::from_secs(timeouts.connect_timeout_secs))
}

/// Build an S3 store for `url`'s bucket signed with `credentials`.
pub fn build_s3_store(
    credentials: &TemporaryCredentialBundle,
    url: &StorageUrl,
    settings: &StorageSettings,
) -> Result<Arc<dyn ObjectStore>> {
    let region = settings.region.as_deref().unwrap_or(DEFAULT_REGION);

    let mut builder = AmazonS3Builder::new()
        .with_bucket_name(url.bucket())
        .with_region(region)
        .with_access_key_id(credentials.access_key_id())
        .with_secret_access_key(credentials.secret_access_key())
        .with_token(credentials.session_token())
        .with_client_options(build_client_options(&settings.remote_timeouts));

    // S3-compatible endpoints (MinIO etc.) need path-style requests
    if let Some(endpoint) = &settings.endpoint {
        builder = builder
            .with_endpoint(endpoint)
            .with_virtual_hosted_style_request(false);
    }

    if settings.allow_http {
        builder = builder.with_allow_http(true);
    }

    let store = builder
        .build()
        .map_err(|e| ReadError::Config(format!("S3: {}", e)))?;

    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};

    fn credentials() -> TemporaryCredentialBundle {
        TemporaryCredentialBundle::try_new(
            "ASIAEXAMPLE",
            "secret",
            "token",
            Utc::now() + ChronoDuration::hours(1),
        )
        .unwrap()
    }

    #[test]
    fn test_build_s3_store_with_custom_endpoint() {
        let url = StorageUrl::parse("s3://lake/sample_db/sample_table").unwrap();
        let settings = StorageSettings {
            region: Some("eu-west-1".into()),
            endpoint: Some("http://localhost:9000".into()),
            allow_http: true,
            ..Default::default()
        };
        let store = build_s3_store(&credentials(), &url, &settings);
        assert!(store.is_ok(), "Should build S3 store");
    }

    #[test]
    fn test_build_s3_store_defaults() {
        let url = StorageUrl::parse("s3a://lake").unwrap();
        assert!(build_s3_store(&credentials(), &url, &StorageSettings::default()).is_ok());
    }
}
