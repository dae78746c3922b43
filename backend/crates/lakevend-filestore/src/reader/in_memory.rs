//! Single-process representation backed by a Polars `DataFrame`.

use std::io::Cursor;
use std::sync::Arc;

use arrow::datatypes::{DataType as ArrowType, Schema as ArrowSchema};
use lakevend_commons::{DataLocation, FileFormat};
use lakevend_configs::config::types::ReaderSettings;
use polars::prelude::*;

use super::schema::{csv_delimiter, DataFile};
use crate::error::{ReadError, Representation, Result};

/// Parse every file with the table schema, project, then stack in key order.
pub(crate) fn read_in_memory(
    files: &[DataFile],
    table_schema: &ArrowSchema,
    location: &DataLocation,
    settings: &ReaderSettings,
) -> Result<DataFrame> {
    let mut combined: Option<DataFrame> = None;

    for file in files {
        let frame = parse_frame(file, location.file_format, table_schema, settings)?;
        log::debug!(
            "Parsed {} into {} rows x {} columns",
            file.path,
            frame.height(),
            frame.width()
        );
        let projected = project(&frame, &location.columns)?;

        match combined.as_mut() {
            None => combined = Some(projected),
            Some(acc) => {
                acc.vstack_mut(&projected)
                    .map_err(|e| ReadError::Engine(format!("stacking {}: {}", file.path, e)))?;
            },
        }
    }

    let mut frame = combined.ok_or_else(|| ReadError::NoDataFiles {
        path: location.storage_path.clone(),
        format: location.file_format.to_string(),
    })?;
    frame.as_single_chunk_par();
    Ok(frame)
}

fn parse_frame(
    file: &DataFile,
    format: FileFormat,
    table_schema: &ArrowSchema,
    settings: &ReaderSettings,
) -> Result<DataFrame> {
    let cursor = Cursor::new(file.bytes.clone());
    match format {
        FileFormat::Csv => {
            let separator = csv_delimiter(settings)?;
            let schema: Schema = table_schema
                .fields()
                .iter()
                .map(|f| {
                    let dtype = polars_dtype(f.data_type()).unwrap_or(DataType::String);
                    Field::new(f.name().as_str().into(), dtype)
                })
                .collect();
            Ok(CsvReadOptions::default()
                .with_has_header(settings.has_header)
                .with_schema(Some(Arc::new(schema)))
                .map_parse_options(|opts| opts.with_separator(separator))
                .into_reader_with_file_handle(cursor)
                .finish()?)
        },
        FileFormat::Parquet => conform(ParquetReader::new(cursor).finish()?, table_schema),
    }
}

/// Cast Parquet columns whose stored type differs from the table schema.
fn conform(frame: DataFrame, table_schema: &ArrowSchema) -> Result<DataFrame> {
    let columns = frame
        .get_columns()
        .iter()
        .map(|column| {
            let target = table_schema
                .field_with_name(column.name().as_str())
                .ok()
                .and_then(|f| polars_dtype(f.data_type()));
            match target {
                Some(dtype) if column.dtype() != &dtype => column.cast(&dtype),
                _ => Ok(column.clone()),
            }
        })
        .collect::<PolarsResult<Vec<Column>>>()?;
    Ok(DataFrame::new(columns)?)
}

/// Polars type for the table-schema types both engines agree on.
fn polars_dtype(data_type: &ArrowType) -> Option<DataType> {
    match data_type {
        ArrowType::Boolean => Some(DataType::Boolean),
        ArrowType::Int64 => Some(DataType::Int64),
        ArrowType::Float64 => Some(DataType::Float64),
        ArrowType::Utf8 | ArrowType::LargeUtf8 | ArrowType::Utf8View => Some(DataType::String),
        _ => None,
    }
}

/// Keep exactly `columns`, in that order.
fn project(frame: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    if let Some(missing) = columns
        .iter()
        .find(|c| frame.get_column_index(c.as_str()).is_none())
    {
        return Err(ReadError::MissingColumn {
            representation: Representation::InMemory,
            column: missing.clone(),
        });
    }
    frame
        .select(columns.iter().map(String::as_str))
        .map_err(|e| ReadError::Engine(e.to_string()))
}

/// Cell values cast to strings, row by row.
pub(crate) fn rows_as_strings(frame: &DataFrame) -> Result<Vec<Vec<Option<String>>>> {
    let mut columns = Vec::with_capacity(frame.width());
    for column in frame.get_columns() {
        let series = column
            .as_materialized_series()
            .cast(&DataType::String)
            .map_err(|e| ReadError::Engine(e.to_string()))?;
        let values: Vec<Option<String>> = series
            .str()
            .map_err(|e| ReadError::Engine(e.to_string()))?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        columns.push(values);
    }

    Ok((0..frame.height())
        .map(|row| columns.iter().map(|col| col[row].clone()).collect())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::schema::table_schema;
    use bytes::Bytes;
    use object_store::path::Path as ObjectStorePath;

    fn files(bodies: &[(&str, &'static str)]) -> Vec<DataFile> {
        bodies
            .iter()
            .map(|(key, body)| DataFile {
                path: ObjectStorePath::from(*key),
                bytes: Bytes::from_static(body.as_bytes()),
            })
            .collect()
    }

    fn location(columns: &[&str]) -> DataLocation {
        DataLocation::new(
            "s3://lake/db/t",
            FileFormat::Csv,
            columns.iter().map(|c| c.to_string()).collect(),
        )
    }

    fn read(bodies: &[(&str, &'static str)], columns: &[&str], settings: &ReaderSettings) -> Result<DataFrame> {
        let files = files(bodies);
        let schema = table_schema(&files, FileFormat::Csv, settings)?;
        read_in_memory(&files, &schema, &location(columns), settings)
    }

    #[test]
    fn test_projects_and_stacks_in_file_order() {
        let frame = read(
            &[
                ("db/t/part-0.csv", "id,name,amount\n1,alice,10.5\n2,bob,20.25\n"),
                ("db/t/part-1.csv", "id,name,amount\n3,carol,30.75\n"),
            ],
            &["amount", "name"],
            &ReaderSettings::default(),
        )
        .unwrap();

        assert_eq!(frame.height(), 3);
        let names: Vec<String> = frame.get_column_names().iter().map(|c| c.to_string()).collect();
        assert_eq!(names, vec!["amount", "name"]);

        let rows = rows_as_strings(&frame).unwrap();
        assert_eq!(rows[0], vec![Some("10.5".to_string()), Some("alice".to_string())]);
        assert_eq!(rows[2], vec![Some("30.75".to_string()), Some("carol".to_string())]);
    }

    #[test]
    fn test_integer_file_stacks_with_float_file() {
        let frame = read(
            &[
                ("db/t/part-0.csv", "id,amount\n1,10\n2,20\n"),
                ("db/t/part-1.csv", "id,amount\n3,30.5\n"),
            ],
            &["id", "amount"],
            &ReaderSettings::default(),
        )
        .unwrap();

        assert_eq!(frame.height(), 3);
        assert_eq!(frame.column("amount").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_header_only_file_adds_no_rows() {
        let frame = read(
            &[("db/t/part-0.csv", "id,amount\n1,10\n"), ("db/t/part-1.csv", "id,amount\n")],
            &["id", "amount"],
            &ReaderSettings::default(),
        )
        .unwrap();

        assert_eq!(frame.height(), 1);
        assert_eq!(frame.column("id").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let err = read(
            &[("db/t/part-0.csv", "name,amount\nalice,10.5\n")],
            &["name", "region"],
            &ReaderSettings::default(),
        )
        .unwrap_err();
        match err {
            ReadError::MissingColumn {
                representation,
                column,
            } => {
                assert_eq!(representation, Representation::InMemory);
                assert_eq!(column, "region");
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_delimiter() {
        let settings = ReaderSettings {
            csv_delimiter: ';',
            ..Default::default()
        };
        let frame = read(&[("db/t/part-0.csv", "name;amount\nalice;10.5\n")], &["name"], &settings).unwrap();
        assert_eq!(frame.height(), 1);
    }
}
