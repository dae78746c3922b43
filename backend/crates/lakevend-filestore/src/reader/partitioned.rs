//! Partitioned representation backed by DataFusion.

use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, SchemaRef};
use arrow::record_batch::RecordBatch;
use datafusion::prelude::{CsvReadOptions, ParquetReadOptions, SessionConfig, SessionContext};
use lakevend_commons::{DataLocation, FileFormat};
use lakevend_configs::config::types::ReaderSettings;
use object_store::path::Path as ObjectStorePath;
use object_store::ObjectStore;

use super::schema::csv_delimiter;
use crate::core::paths::StorageUrl;
use crate::error::{ReadError, Representation, Result};

#[derive(Debug)]
pub(crate) struct PartitionedTable {
    pub schema: SchemaRef,
    pub partitions: Vec<Vec<RecordBatch>>,
}

/// Session with a fixed partition count. Round-robin repartitioning is off so
/// partitions concatenated in order give the rows in file order.
fn session_context(settings: &ReaderSettings) -> SessionContext {
    let config = SessionConfig::new()
        .with_target_partitions(settings.target_partitions)
        .with_round_robin_repartition(false);
    SessionContext::new_with_config(config)
}

pub(crate) async fn read_partitioned(
    store: Arc<dyn ObjectStore>,
    url: &StorageUrl,
    files: &[ObjectStorePath],
    table_schema: &SchemaRef,
    location: &DataLocation,
    settings: &ReaderSettings,
) -> Result<PartitionedTable> {
    let ctx = session_context(settings);
    ctx.register_object_store(&url.bucket_url()?, store);

    let paths: Vec<String> = files.iter().map(|p| url.object_url(p)).collect();
    let frame = match location.file_format {
        FileFormat::Csv => {
            let options = CsvReadOptions::new()
                .has_header(settings.has_header)
                .delimiter(csv_delimiter(settings)?)
                .file_extension(FileFormat::Csv.extension())
                .schema(table_schema);
            ctx.read_csv(paths, options).await?
        },
        FileFormat::Parquet => {
            let options = ParquetReadOptions::default().schema(table_schema);
            ctx.read_parquet(paths, options).await?
        },
    };

    for column in &location.columns {
        if frame.schema().field_with_unqualified_name(column).is_err() {
            return Err(ReadError::MissingColumn {
                representation: Representation::Partitioned,
                column: column.clone(),
            });
        }
    }

    let selection: Vec<&str> = location.columns.iter().map(String::as_str).collect();
    let frame = frame.select_columns(&selection)?;
    let schema = frame.schema().inner().clone();
    let partitions = frame.collect_partitioned().await?;
    log::debug!(
        "Collected {} partition(s) from {} file(s)",
        partitions.len(),
        files.len()
    );

    Ok(PartitionedTable { schema, partitions })
}

/// Cell values cast to strings, partitions concatenated in order.
pub(crate) fn rows_as_strings(partitions: &[Vec<RecordBatch>]) -> Result<Vec<Vec<Option<String>>>> {
    let mut rows = Vec::new();
    for batch in partitions.iter().flatten() {
        let mut columns = Vec::with_capacity(batch.num_columns());
        for array in batch.columns() {
            let cast = arrow::compute::cast(array, &DataType::Utf8)
                .map_err(|e| ReadError::Engine(e.to_string()))?;
            let strings = cast.as_string::<i32>();
            let values: Vec<Option<String>> = (0..strings.len())
                .map(|i| {
                    if strings.is_null(i) {
                        None
                    } else {
                        Some(strings.value(i).to_string())
                    }
                })
                .collect();
            columns.push(values);
        }
        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|col| col[row].clone()).collect());
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::schema::{table_schema, DataFile};
    use object_store::memory::InMemory;
    use object_store::PutPayload;

    async fn store_with(files: &[(&str, &'static str)]) -> Arc<dyn ObjectStore> {
        let store = InMemory::new();
        for (key, body) in files {
            store
                .put(&ObjectStorePath::from(*key), PutPayload::from_static(body.as_bytes()))
                .await
                .unwrap();
        }
        Arc::new(store)
    }

    async fn read(
        files: &[(&str, &'static str)],
        columns: &[&str],
    ) -> Result<PartitionedTable> {
        let store = store_with(files).await;
        let url = StorageUrl::parse("s3://lake/db/t").unwrap();
        let paths: Vec<ObjectStorePath> = files.iter().map(|(key, _)| ObjectStorePath::from(*key)).collect();
        let data: Vec<DataFile> = files
            .iter()
            .map(|(key, body)| DataFile {
                path: ObjectStorePath::from(*key),
                bytes: bytes::Bytes::from_static(body.as_bytes()),
            })
            .collect();
        let settings = ReaderSettings::default();
        let schema = table_schema(&data, FileFormat::Csv, &settings)?;
        read_partitioned(store, &url, &paths, &schema, &location(columns), &settings).await
    }

    fn location(columns: &[&str]) -> DataLocation {
        DataLocation::new(
            "s3://lake/db/t",
            FileFormat::Csv,
            columns.iter().map(|c| c.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn test_reads_projection_across_files() {
        let table = read(
            &[
                ("db/t/part-0.csv", "id,name,amount\n1,alice,10.5\n2,bob,20.25\n"),
                ("db/t/part-1.csv", "id,name,amount\n3,carol,30.75\n"),
            ],
            &["name", "amount"],
        )
        .await
        .unwrap();

        let names: Vec<&str> = table.schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["name", "amount"]);

        let total: usize = table.partitions.iter().flatten().map(|b| b.num_rows()).sum();
        assert_eq!(total, 3);

        let rows = rows_as_strings(&table.partitions).unwrap();
        assert_eq!(rows[0], vec![Some("alice".to_string()), Some("10.5".to_string())]);
        assert_eq!(rows[2], vec![Some("carol".to_string()), Some("30.75".to_string())]);
    }

    #[tokio::test]
    async fn test_later_file_values_survive_empty_first_column() {
        let table = read(
            &[("db/t/part-0.csv", "id,name\n1,\n2,\n"), ("db/t/part-1.csv", "id,name\n3,carol\n")],
            &["id", "name"],
        )
        .await
        .unwrap();

        assert_eq!(table.schema.field(1).data_type(), &DataType::Utf8);
        let rows = rows_as_strings(&table.partitions).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][1], None);
        assert_eq!(rows[2], vec![Some("3".to_string()), Some("carol".to_string())]);
    }

    #[tokio::test]
    async fn test_integer_file_reads_with_float_file() {
        let table = read(
            &[("db/t/part-0.csv", "id,amount\n1,10\n2,20\n"), ("db/t/part-1.csv", "id,amount\n3,30.5\n")],
            &["amount"],
        )
        .await
        .unwrap();

        assert_eq!(table.schema.field(0).data_type(), &DataType::Float64);
        let total: usize = table.partitions.iter().flatten().map(|b| b.num_rows()).sum();
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn test_missing_column_is_reported() {
        let err = read(&[("db/t/part-0.csv", "name,amount\nalice,10.5\n")], &["region"])
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                ReadError::MissingColumn {
                    representation: Representation::Partitioned,
                    ..
                }
            ),
            "{err}"
        );
    }

    #[test]
    fn test_rows_as_strings_keeps_nulls() {
        use arrow::array::{ArrayRef, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};

        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, true),
            Field::new("name", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![Some(1), None])) as ArrayRef,
                Arc::new(StringArray::from(vec![None, Some("bob")])) as ArrayRef,
            ],
        )
        .unwrap();
        assert_eq!(batch.column(0).len(), 2);

        let rows = rows_as_strings(&[vec![batch]]).unwrap();
        assert_eq!(rows, vec![vec![Some("1".to_string()), None], vec![None, Some("bob".to_string())]]);
    }
}
