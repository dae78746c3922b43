//! Listing and fetching the data files of a table root.

use std::sync::Arc;

use bytes::Bytes;
use futures_util::StreamExt;
use lakevend_commons::FileFormat;
use object_store::path::Path as ObjectStorePath;
use object_store::ObjectStore;

use crate::core::paths::StorageUrl;
use crate::error::{ReadError, Result};

/// Data files under `url` whose extension matches `format`, in key order.
///
/// Only objects strictly below the table root are considered, so a sibling
/// such as `orders_archive/` never matches `orders`.
pub async fn list_data_files(
    store: &Arc<dyn ObjectStore>,
    url: &StorageUrl,
    format: FileFormat,
) -> Result<Vec<ObjectStorePath>> {
    let prefix = url.prefix_path()?;
    let mut stream = store.list(prefix.as_ref());
    let mut files = Vec::new();

    while let Some(result) = stream.next().await {
        let meta = result?;
        if meta.location.as_ref().ends_with(format.extension()) {
            files.push(meta.location);
        }
    }

    if files.is_empty() {
        return Err(ReadError::NoDataFiles {
            path: url.to_string(),
            format: format.to_string(),
        });
    }

    files.sort();
    log::debug!("Found {} {} file(s) under {}", files.len(), format, url);
    Ok(files)
}

/// Read object contents as bytes.
pub async fn read_object(store: &Arc<dyn ObjectStore>, path: &ObjectStorePath) -> Result<Bytes> {
    let result = store.get(path).await?;
    let bytes = result.bytes().await?;
    Ok(bytes)
}
