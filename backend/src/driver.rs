//! One end-to-end run: vend credentials for the configured grant, then read
//! the permitted columns into each requested representation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use lakevend_commons::{TableReference, VendedAccess};
use lakevend_configs::ServiceConfig;
use lakevend_filestore::{Representation, S3StoreResolver, ScopedReader, StoreResolver, TabularResult};
use lakevend_sandbox::SandboxLake;
use lakevend_vending::aws::{load_sdk_config, AwsIdentityService, AwsPermissionsService};
use lakevend_vending::{
    CredentialVendor, IdentityService, PermissionsService, RetryPolicy, VendOptions, VendRequest,
};
use log::{info, warn};

/// The external services a run talks to.
#[derive(Clone)]
pub struct Backend {
    pub permissions: Arc<dyn PermissionsService>,
    pub identity: Arc<dyn IdentityService>,
    pub resolver: Arc<dyn StoreResolver>,
}

impl Backend {
    /// Lake Formation, Glue and STS from the default credential chain; S3
    /// reads with the vended bundle only.
    pub async fn aws(config: &ServiceConfig) -> Self {
        let sdk_config = load_sdk_config(config.vending.region.as_deref()).await;

        let mut storage = config.storage.clone();
        if storage.region.is_none() {
            storage.region = sdk_config.region().map(|r| r.to_string());
        }

        Self {
            permissions: Arc::new(AwsPermissionsService::new(&sdk_config)),
            identity: Arc::new(AwsIdentityService::new(&sdk_config)),
            resolver: Arc::new(S3StoreResolver::new(storage)),
        }
    }

    pub fn sandbox(lake: SandboxLake) -> Self {
        let lake = Arc::new(lake);
        Self {
            permissions: lake.clone(),
            identity: lake.clone(),
            resolver: lake,
        }
    }
}

/// What a run produced.
#[derive(Debug)]
pub struct RunReport {
    pub access: VendedAccess,
    pub results: Vec<TabularResult>,
}

impl RunReport {
    pub fn result(&self, representation: Representation) -> Option<&TabularResult> {
        self.results
            .iter()
            .find(|r| r.representation() == representation)
    }

    /// True when every representation holds the same number of rows.
    pub fn row_counts_agree(&self) -> bool {
        self.results
            .windows(2)
            .all(|pair| pair[0].num_rows() == pair[1].num_rows())
    }
}

/// Vend options from `[grant]` and `[vending]`.
pub fn vend_options(config: &ServiceConfig) -> anyhow::Result<VendOptions> {
    let mut options = VendOptions::new(config.grant.session_tag()?);
    options.permissions = config.vending.parsed_permissions()?;
    options.supported_permission_types = config.vending.parsed_permission_types()?;
    options.duration_secs = config.vending.duration_secs;
    options.full_table_access = config.grant.full_table_access;
    options.retry = RetryPolicy {
        max_retries: config.vending.propagation_retries,
        initial_backoff: Duration::from_millis(config.vending.retry_backoff_ms),
    };
    Ok(options)
}

/// The configured table, grantee and columns. Without an explicit catalog id
/// the coordinating identity's account is used.
pub async fn vend_request(
    config: &ServiceConfig,
    identity: &dyn IdentityService,
) -> anyhow::Result<VendRequest> {
    let catalog_id = match &config.table.catalog_id {
        Some(id) if !id.trim().is_empty() => id.clone(),
        _ => identity.caller_identity().await?.account_id,
    };

    Ok(VendRequest {
        table: TableReference::try_new(catalog_id, &config.table.database, &config.table.name)?,
        grantee: config.grant.grantee_identity()?,
        columns: config.grant.column_set()?,
    })
}

/// Vend, then read each representation in order.
///
/// Fails when the representations disagree on the row count.
pub async fn run(
    config: &ServiceConfig,
    backend: &Backend,
    representations: &[Representation],
) -> anyhow::Result<RunReport> {
    let vendor = CredentialVendor::new(
        backend.permissions.clone(),
        backend.identity.clone(),
        vend_options(config)?,
    );
    let request = vend_request(config, backend.identity.as_ref()).await?;
    let access = vendor
        .vend(&request)
        .await
        .with_context(|| format!("Failed to vend credentials for {}", request.table))?;

    if access.authorized_columns.len() < request.columns.len() {
        warn!(
            "Requested columns {:?} narrowed to {:?} by the permission service",
            request.columns.as_slice(),
            access.authorized_columns
        );
    }

    let reader = ScopedReader::new(backend.resolver.clone(), config.reader.clone());
    let location = access.data_location();
    let mut results = Vec::with_capacity(representations.len());
    for representation in representations {
        let result = reader
            .read(&access.credentials, &location, *representation)
            .await
            .with_context(|| format!("Failed to read {} as {}", access.table, representation))?;
        info!(
            "{} representation of {}: {} rows in {} partition(s)",
            representation,
            access.table,
            result.num_rows(),
            result.num_partitions()
        );
        results.push(result);
    }

    let report = RunReport { access, results };
    if !report.row_counts_agree() {
        let counts: Vec<String> = report
            .results
            .iter()
            .map(|r| format!("{}={}", r.representation(), r.num_rows()))
            .collect();
        anyhow::bail!("Representations disagree on row count: {}", counts.join(", "));
    }
    Ok(report)
}
