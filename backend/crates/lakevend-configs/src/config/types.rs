use super::defaults::*;
use crate::file_helpers::join_path;
use lakevend_commons::{
    ColumnSet, GranteeIdentity, ModelError, Permission, PermissionType, SessionTag,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Main driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub table: TableSettings,
    pub grant: GrantSettings,
    #[serde(default)]
    pub vending: VendingSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub reader: ReaderSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub backend: BackendSettings,
}

/// Catalog table to vend credentials for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSettings {
    /// Catalog (account) id. Empty = the coordinating identity's account.
    #[serde(default)]
    pub catalog_id: Option<String>,
    pub database: String,
    pub name: String,
}

/// The recognized grant fields; anything else in `[grant]` is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrantSettings {
    /// Role identifier of the consuming identity
    pub grantee: String,
    /// Columns to grant SELECT on
    pub columns: Vec<String>,
    #[serde(default = "default_session_tag_key")]
    pub session_tag_key: String,
    /// Value the grantee's trust policy expects for `session_tag_key`
    pub session_tag_value: String,
    /// Request full-table credentials instead of column-filtered ones.
    /// Only succeeds when the grantee holds every column of the table.
    #[serde(default)]
    pub full_table_access: bool,
}

impl GrantSettings {
    pub fn grantee_identity(&self) -> Result<GranteeIdentity, ModelError> {
        GranteeIdentity::try_new(self.grantee.clone())
    }

    pub fn column_set(&self) -> Result<ColumnSet, ModelError> {
        ColumnSet::try_new(self.columns.iter().cloned())
    }

    pub fn session_tag(&self) -> Result<SessionTag, ModelError> {
        SessionTag::try_new(self.session_tag_key.clone(), self.session_tag_value.clone())
    }
}

/// Credential-vending request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendingSettings {
    /// Region of the permissions/catalog endpoints (None = SDK default chain)
    #[serde(default)]
    pub region: Option<String>,
    /// Lifetime of vended table credentials (900..=43200 seconds)
    #[serde(default = "default_credential_duration_secs")]
    pub duration_secs: u32,
    #[serde(default = "default_permissions")]
    pub permissions: Vec<String>,
    #[serde(default = "default_supported_permission_types")]
    pub supported_permission_types: Vec<String>,
    /// Extra credential requests after a grant-propagation failure.
    /// 0 surfaces the failure directly.
    #[serde(default = "default_propagation_retries")]
    pub propagation_retries: u32,
    /// First backoff delay; doubled on every retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl VendingSettings {
    pub fn parsed_permissions(&self) -> Result<Vec<Permission>, ModelError> {
        self.permissions.iter().map(|p| p.parse()).collect()
    }

    pub fn parsed_permission_types(&self) -> Result<Vec<PermissionType>, ModelError> {
        self.supported_permission_types
            .iter()
            .map(|p| p.parse())
            .collect()
    }
}

impl Default for VendingSettings {
    fn default() -> Self {
        Self {
            region: None,
            duration_secs: default_credential_duration_secs(),
            permissions: default_permissions(),
            supported_permission_types: default_supported_permission_types(),
            propagation_retries: default_propagation_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Object-store access settings used with vended credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Bucket region (None = same as `vending.region`)
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible stores (e.g. "http://localhost:9000")
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Allow plain HTTP for custom endpoints
    #[serde(default)]
    pub allow_http: bool,
    /// Remote storage timeout settings
    #[serde(default)]
    pub remote_timeouts: RemoteStorageTimeouts,
}

/// Remote storage timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteStorageTimeouts {
    /// Request timeout in seconds for object reads and listings (default: 60s)
    #[serde(default = "default_remote_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connect timeout in seconds (default: 10s)
    #[serde(default = "default_remote_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for RemoteStorageTimeouts {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_remote_request_timeout(),
            connect_timeout_secs: default_remote_connect_timeout(),
        }
    }
}

/// Dataframe loading settings shared by both representations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderSettings {
    /// DataFusion target partitions for the partitioned representation
    #[serde(default = "default_target_partitions")]
    pub target_partitions: usize,
    #[serde(default = "default_csv_delimiter")]
    pub csv_delimiter: char,
    #[serde(default = "default_true")]
    pub has_header: bool,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            target_partitions: default_target_partitions(),
            csv_delimiter: default_csv_delimiter(),
            has_header: true,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for `lakevend.log`; unset means console only
    #[serde(default)]
    pub logs_path: Option<String>,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    /// "compact" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Optional per-target log level overrides:
    /// [logging.targets]
    /// datafusion = "info"
    #[serde(default)]
    pub targets: HashMap<String, String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            logs_path: None,
            log_to_console: true,
            format: default_log_format(),
            targets: HashMap::new(),
        }
    }
}

impl LoggingSettings {
    pub fn log_file(&self) -> Option<PathBuf> {
        self.logs_path.as_deref().map(|dir| join_path(dir, "lakevend.log"))
    }
}

/// Which implementation of the external services to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Lake Formation, Glue, STS and S3
    #[default]
    Aws,
    /// In-process lake seeded with the sample table
    Sandbox,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aws" => Ok(BackendKind::Aws),
            "sandbox" => Ok(BackendKind::Sandbox),
            other => Err(format!("unknown backend '{}' (expected aws or sandbox)", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default)]
    pub kind: BackendKind,
}
