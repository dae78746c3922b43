use std::fmt;

use object_store::path::Path as ObjectStorePath;
use url::Url;

use crate::error::{ReadError, Result};

const S3_SCHEMES: &[&str] = &["s3://", "s3a://"];

/// A table root in object storage, e.g. `s3://bucket/sample_db/sample_table`.
///
/// `s3a://` locations are normalized to `s3://`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageUrl {
    bucket: String,
    prefix: String,
}

impl StorageUrl {
    pub fn parse(url: &str) -> Result<Self> {
        let (bucket, prefix) = parse_remote_url(url, S3_SCHEMES)?;
        if bucket.is_empty() {
            return Err(ReadError::InvalidLocation(format!("missing bucket in '{}'", url)));
        }
        let prefix = prefix.trim_matches('/').to_string();
        if prefix.split('/').any(|segment| segment == "..") {
            return Err(ReadError::InvalidLocation(format!(
                "path traversal in '{}'",
                url
            )));
        }
        Ok(Self { bucket, prefix })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Key prefix inside the bucket, without leading/trailing slashes.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Listing prefix; `None` means the whole bucket.
    pub fn prefix_path(&self) -> Result<Option<ObjectStorePath>> {
        if self.prefix.is_empty() {
            return Ok(None);
        }
        ObjectStorePath::parse(&self.prefix)
            .map(Some)
            .map_err(|e| ReadError::InvalidLocation(e.to_string()))
    }

    /// `s3://bucket`, the URL an engine registers the object store under.
    pub fn bucket_url(&self) -> Result<Url> {
        Url::parse(&format!("s3://{}", self.bucket))
            .map_err(|e| ReadError::InvalidLocation(format!("{}: {}", self.bucket, e)))
    }

    /// Full URL of an object in the same bucket.
    pub fn object_url(&self, key: &ObjectStorePath) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }

    /// Whether `other` lies at or under this location.
    pub fn contains(&self, other: &StorageUrl) -> bool {
        if self.bucket != other.bucket {
            return false;
        }
        if self.prefix.is_empty() {
            return true;
        }
        other.prefix == self.prefix || other.prefix.starts_with(&format!("{}/", self.prefix))
    }
}

impl fmt::Display for StorageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "s3://{}", self.bucket)
        } else {
            write!(f, "s3://{}/{}", self.bucket, self.prefix)
        }
    }
}

/// Parse a remote URL like `s3://bucket/prefix` into (bucket, prefix).
pub(crate) fn parse_remote_url(url: &str, schemes: &[&str]) -> Result<(String, String)> {
    let trimmed = url.trim();

    for scheme in schemes {
        if let Some(rest) = trimmed.strip_prefix(scheme) {
            let (bucket, prefix) = match rest.split_once('/') {
                Some((b, p)) => (b.to_string(), p.to_string()),
                None => (rest.to_string(), String::new()),
            };
            return Ok((bucket, prefix));
        }
    }

    Err(ReadError::InvalidLocation(format!(
        "Expected URL with schemes {:?}, got: {}",
        schemes, url
    )))
}
