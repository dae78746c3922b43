//! Reads permitted table data with a vended credential bundle.

mod in_memory;
mod partitioned;
mod schema;

use std::sync::Arc;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use chrono::Utc;
use lakevend_commons::{DataLocation, TemporaryCredentialBundle};
use lakevend_configs::config::types::ReaderSettings;
use polars::prelude::DataFrame;

use crate::core::paths::StorageUrl;
use crate::core::resolver::StoreResolver;
use crate::error::{ReadError, Representation, Result};
use crate::object_store_ops::{list_data_files, read_object};
use schema::DataFile;

/// Data read in one of the two representations.
#[derive(Debug, Clone)]
pub enum TabularResult {
    InMemory(DataFrame),
    Partitioned {
        schema: SchemaRef,
        partitions: Vec<Vec<RecordBatch>>,
    },
}

impl TabularResult {
    pub fn representation(&self) -> Representation {
        match self {
            TabularResult::InMemory(_) => Representation::InMemory,
            TabularResult::Partitioned { .. } => Representation::Partitioned,
        }
    }

    pub fn num_rows(&self) -> usize {
        match self {
            TabularResult::InMemory(frame) => frame.height(),
            TabularResult::Partitioned { partitions, .. } => {
                partitions.iter().flatten().map(RecordBatch::num_rows).sum()
            },
        }
    }

    pub fn num_partitions(&self) -> usize {
        match self {
            TabularResult::InMemory(_) => 1,
            TabularResult::Partitioned { partitions, .. } => partitions.len(),
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        match self {
            TabularResult::InMemory(frame) => frame
                .get_column_names()
                .into_iter()
                .map(|c| c.to_string())
                .collect(),
            TabularResult::Partitioned { schema, .. } => {
                schema.fields().iter().map(|f| f.name().clone()).collect()
            },
        }
    }

    /// Every cell cast to a string (`None` for nulls), rows in read order.
    pub fn rows_as_strings(&self) -> Result<Vec<Vec<Option<String>>>> {
        match self {
            TabularResult::InMemory(frame) => in_memory::rows_as_strings(frame),
            TabularResult::Partitioned { partitions, .. } => {
                partitioned::rows_as_strings(partitions)
            },
        }
    }

    /// Human-readable table for the console.
    pub fn render(&self) -> Result<String> {
        match self {
            TabularResult::InMemory(frame) => Ok(frame.to_string()),
            TabularResult::Partitioned { partitions, .. } => {
                let batches: Vec<RecordBatch> = partitions.iter().flatten().cloned().collect();
                arrow::util::pretty::pretty_format_batches(&batches)
                    .map(|table| table.to_string())
                    .map_err(|e| ReadError::Engine(e.to_string()))
            },
        }
    }
}

/// Reads the authorized columns of a table root with a credential bundle.
///
/// Every read resolves its own object store from the bundle; the ambient
/// identity of the process is never used.
pub struct ScopedReader {
    resolver: Arc<dyn StoreResolver>,
    settings: ReaderSettings,
}

impl ScopedReader {
    pub fn new(resolver: Arc<dyn StoreResolver>, settings: ReaderSettings) -> Self {
        Self { resolver, settings }
    }

    pub async fn read(
        &self,
        credentials: &TemporaryCredentialBundle,
        location: &DataLocation,
        representation: Representation,
    ) -> Result<TabularResult> {
        if location.columns.is_empty() {
            return Err(ReadError::InvalidLocation(format!(
                "no columns requested from {}",
                location.storage_path
            )));
        }
        let now = Utc::now();
        if credentials.is_expired_at(now) {
            // Storage decides; the read is still attempted
            log::warn!(
                "Credentials {} expired at {}; storage is expected to reject them",
                credentials.access_key_id(),
                credentials.expiration()
            );
        } else {
            log::debug!(
                "Credentials {} valid for another {}s",
                credentials.access_key_id(),
                credentials.remaining(now).num_seconds()
            );
        }

        let url = StorageUrl::parse(&location.storage_path)?;
        let store = self.resolver.resolve(credentials, &url).await?;
        let files = list_data_files(&store, &url, location.file_format).await?;
        log::info!(
            "Reading {} {} file(s) from {} into the {} representation (columns={:?})",
            files.len(),
            location.file_format,
            url,
            representation,
            location.columns
        );

        let mut data = Vec::with_capacity(files.len());
        for path in &files {
            let bytes = read_object(&store, path).await?;
            data.push(DataFile { path: path.clone(), bytes });
        }
        let table_schema = schema::table_schema(&data, location.file_format, &self.settings)?;
        log::debug!("Table schema for {}: {:?}", url, table_schema.fields());

        let result = match representation {
            Representation::InMemory => {
                let frame =
                    in_memory::read_in_memory(&data, &table_schema, location, &self.settings)?;
                TabularResult::InMemory(frame)
            },
            Representation::Partitioned => {
                let table = partitioned::read_partitioned(
                    store,
                    &url,
                    &files,
                    &table_schema,
                    location,
                    &self.settings,
                )
                .await?;
                TabularResult::Partitioned {
                    schema: table.schema,
                    partitions: table.partitions,
                }
            },
        };

        log::info!(
            "{} read returned {} rows x {} columns",
            representation,
            result.num_rows(),
            location.columns.len()
        );
        Ok(result)
    }
}
