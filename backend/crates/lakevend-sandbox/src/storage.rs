//! Object storage of the sandbox lake.
//!
//! A credential bundle resolves to a fresh in-memory store holding only the
//! table it was issued for, with every data file cut down to the granted
//! columns. Unknown, tampered or expired bundles and paths outside the table
//! root are refused.

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use datafusion::parquet::arrow::ArrowWriter;
use lakevend_commons::{FileFormat, TemporaryCredentialBundle};
use lakevend_filestore::{ReadError, StorageUrl, StoreResolver};
use object_store::memory::InMemory;
use object_store::path::Path as ObjectStorePath;
use object_store::{ObjectStore, PutPayload};

use crate::lake::{SandboxLake, SandboxTable};

fn encode(batch: &RecordBatch, format: FileFormat) -> Result<Bytes, ReadError> {
    match format {
        FileFormat::Csv => {
            let mut writer = arrow::csv::WriterBuilder::new()
                .with_header(true)
                .build(Vec::new());
            writer
                .write(batch)
                .map_err(|e| ReadError::Storage(e.to_string()))?;
            Ok(Bytes::from(writer.into_inner()))
        },
        FileFormat::Parquet => {
            let mut writer = ArrowWriter::try_new(Vec::new(), batch.schema(), None)
                .map_err(|e| ReadError::Storage(e.to_string()))?;
            writer
                .write(batch)
                .map_err(|e| ReadError::Storage(e.to_string()))?;
            let buf = writer
                .into_inner()
                .map_err(|e| ReadError::Storage(e.to_string()))?;
            Ok(Bytes::from(buf))
        },
    }
}

/// Data files of `table` restricted to `columns`, keyed under the table root.
fn granted_files(
    table: &SandboxTable,
    columns: &[String],
) -> Result<Vec<(ObjectStorePath, Bytes)>, ReadError> {
    let root = StorageUrl::parse(&table.storage_path)?;
    let indices = columns
        .iter()
        .map(|c| table.schema.index_of(c))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ReadError::Storage(e.to_string()))?;

    table
        .files
        .iter()
        .enumerate()
        .map(|(i, batch)| {
            let projected = batch
                .project(&indices)
                .map_err(|e| ReadError::Storage(e.to_string()))?;
            let key = ObjectStorePath::from(format!(
                "{}/part-{:05}{}",
                root.prefix(),
                i,
                table.file_format.extension()
            ));
            Ok((key, encode(&projected, table.file_format)?))
        })
        .collect()
}

#[async_trait::async_trait]
impl StoreResolver for SandboxLake {
    async fn resolve(
        &self,
        credentials: &TemporaryCredentialBundle,
        url: &StorageUrl,
    ) -> Result<Arc<dyn ObjectStore>, ReadError> {
        let files = {
            let state = self.state.lock();
            let issued = state
                .issued
                .get(credentials.access_key_id())
                .filter(|i| {
                    i.secret_access_key == credentials.secret_access_key()
                        && i.session_token == credentials.session_token()
                })
                .ok_or_else(|| {
                    ReadError::AccessDenied(format!(
                        "the AWS access key id {} does not exist in our records",
                        credentials.access_key_id()
                    ))
                })?;

            if state.now() >= issued.expiration {
                return Err(ReadError::AccessDenied(format!(
                    "the provided token expired at {}",
                    issued.expiration
                )));
            }

            let table = state.tables.get(&issued.table).ok_or_else(|| {
                ReadError::AccessDenied(format!("table {}.{} no longer exists", issued.table.0, issued.table.1))
            })?;
            let root = StorageUrl::parse(&table.storage_path)?;
            if !root.contains(url) {
                return Err(ReadError::AccessDenied(format!(
                    "credentials for {} do not cover {}",
                    root, url
                )));
            }

            granted_files(table, &issued.columns)?
        };

        let store = InMemory::new();
        for (key, body) in files {
            store.put(&key, PutPayload::from(body)).await?;
        }
        Ok(Arc::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use lakevend_commons::{ColumnGrant, ColumnSet, PermissionType};
    use lakevend_filestore::list_data_files;
    use lakevend_vending::{AssumeRoleRequest, IdentityService, PermissionsService, TableCredentialsRequest};

    async fn vend_directly(sample: &crate::SampleLake, columns: &[&str]) -> TemporaryCredentialBundle {
        let grant = ColumnGrant::select(
            sample.table.clone(),
            sample.role.clone(),
            ColumnSet::try_new(columns.iter().copied()).unwrap(),
        );
        sample.lake.grant_column_permission(&grant).await.unwrap();
        let assumed = sample
            .lake
            .assume_role(&AssumeRoleRequest {
                role: sample.role.clone(),
                session_name: "s1".into(),
                tag: sample.session_tag.clone(),
            })
            .await
            .unwrap();
        let data_access = sample.lake.for_session(&assumed).await.unwrap();
        data_access
            .get_temporary_table_credentials(&TableCredentialsRequest {
                table: sample.table.clone(),
                table_arn: sample.table.table_arn(data_access.region()),
                permissions: grant.permissions.clone(),
                supported_permission_types: vec![PermissionType::ColumnPermission],
                duration_secs: 900,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_store_serves_only_granted_columns() {
        let sample = SandboxLake::with_sample_data().unwrap();
        let creds = vend_directly(&sample, &["name", "amount"]).await;
        let url = StorageUrl::parse(&sample.lake.storage_path(&sample.table).unwrap()).unwrap();

        let store = sample.lake.resolve(&creds, &url).await.unwrap();
        let files = list_data_files(&store, &url, FileFormat::Csv).await.unwrap();
        assert_eq!(files.len(), 2);

        let body = lakevend_filestore::read_object(&store, &files[0]).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("name,amount\n"), "{text}");
        assert!(!text.contains("us-east"));
    }

    #[tokio::test]
    async fn test_store_refuses_other_paths_expired_and_unknown_keys() {
        let sample = SandboxLake::with_sample_data().unwrap();
        let creds = vend_directly(&sample, &["name"]).await;

        let other = StorageUrl::parse("s3://lakevend-sandbox/sample_db/other_table").unwrap();
        assert!(sample.lake.resolve(&creds, &other).await.unwrap_err().is_access_denied());

        let forged = TemporaryCredentialBundle::try_new(
            creds.access_key_id(),
            "guess",
            creds.session_token(),
            creds.expiration(),
        )
        .unwrap();
        let url = StorageUrl::parse("s3://lakevend-sandbox/sample_db/sample_table").unwrap();
        assert!(sample.lake.resolve(&forged, &url).await.unwrap_err().is_access_denied());

        sample.lake.advance_clock(Duration::seconds(901));
        assert!(sample.lake.resolve(&creds, &url).await.unwrap_err().is_access_denied());
    }
}
