use std::sync::Arc;

use lakevend_commons::TemporaryCredentialBundle;
use lakevend_configs::config::types::StorageSettings;
use object_store::ObjectStore;

use crate::core::factory::build_s3_store;
use crate::core::paths::StorageUrl;
use crate::error::Result;

/// Turns a credential bundle into an object store for one location.
///
/// Each read asks for its own store; nothing is cached across reads.
#[async_trait::async_trait]
pub trait StoreResolver: Send + Sync {
    async fn resolve(
        &self,
        credentials: &TemporaryCredentialBundle,
        url: &StorageUrl,
    ) -> Result<Arc<dyn ObjectStore>>;
}

/// Resolver for real S3 (or S3-compatible) storage.
#[derive(Debug, Clone, Default)]
pub struct S3StoreResolver {
    settings: StorageSettings,
}

impl S3StoreResolver {
    pub fn new(settings: StorageSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl StoreResolver for S3StoreResolver {
    async fn resolve(
        &self,
        credentials: &TemporaryCredentialBundle,
        url: &StorageUrl,
    ) -> Result<Arc<dyn ObjectStore>> {
        build_s3_store(credentials, url, &self.settings)
    }
}
