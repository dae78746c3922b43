//! One schema for the whole table, settled before either engine parses.
//!
//! Types are inferred per file and widened across files, so every file of a
//! table is read with the same column types regardless of which engine runs.

use std::io::Cursor;
use std::sync::Arc;

use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use bytes::Bytes;
use datafusion::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use lakevend_commons::FileFormat;
use lakevend_configs::config::types::ReaderSettings;
use object_store::path::Path as ObjectStorePath;

use crate::error::{ReadError, Result};

/// A data file already fetched from the store.
pub(crate) struct DataFile {
    pub path: ObjectStorePath,
    pub bytes: Bytes,
}

pub(crate) fn csv_delimiter(settings: &ReaderSettings) -> Result<u8> {
    u8::try_from(settings.csv_delimiter)
        .map_err(|_| ReadError::Config("csv delimiter must be ASCII".into()))
}

/// Widen `files` into a single schema. Columns are matched by position and
/// every file must carry the same column names.
pub(crate) fn table_schema(
    files: &[DataFile],
    format: FileFormat,
    settings: &ReaderSettings,
) -> Result<SchemaRef> {
    let mut names: Option<Vec<String>> = None;
    let mut types: Vec<DataType> = Vec::new();

    for file in files {
        let (schema, rows) = file_schema(file, format, settings)?;
        let file_names: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();

        match &names {
            None => {
                types = vec![DataType::Null; file_names.len()];
                names = Some(file_names);
            },
            Some(expected) if *expected != file_names => {
                return Err(ReadError::Parse(format!(
                    "{} has columns {:?}, expected {:?}",
                    file.path, file_names, expected
                )));
            },
            Some(_) => {},
        }

        // Header-only files say nothing about types
        if rows == 0 {
            continue;
        }
        for (slot, field) in types.iter_mut().zip(schema.fields()) {
            *slot = widen(slot, field.data_type());
        }
    }

    let names = names.unwrap_or_default();
    let fields: Vec<Field> = names
        .iter()
        .zip(types)
        .map(|(name, data_type)| Field::new(name, settle(data_type, format), true))
        .collect();
    Ok(Arc::new(Schema::new(fields)))
}

fn file_schema(file: &DataFile, format: FileFormat, settings: &ReaderSettings) -> Result<(Schema, usize)> {
    match format {
        FileFormat::Csv => Format::default()
            .with_header(settings.has_header)
            .with_delimiter(csv_delimiter(settings)?)
            .infer_schema(Cursor::new(file.bytes.clone()), None)
            .map_err(|e| ReadError::Parse(format!("{}: {}", file.path, e))),
        FileFormat::Parquet => {
            let builder = ParquetRecordBatchReaderBuilder::try_new(file.bytes.clone())
                .map_err(|e| ReadError::Parse(format!("{}: {}", file.path, e)))?;
            let rows = usize::try_from(builder.metadata().file_metadata().num_rows()).unwrap_or(0);
            Ok((builder.schema().as_ref().clone(), rows))
        },
    }
}

/// Narrowest type holding values of both `a` and `b`.
fn widen(a: &DataType, b: &DataType) -> DataType {
    match (a, b) {
        (a, b) if a == b => a.clone(),
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),
        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        },
        _ => DataType::Utf8,
    }
}

/// Columns that never held a value are text. CSV columns are limited to the
/// types both engines parse identically; anything else stays text.
fn settle(data_type: DataType, format: FileFormat) -> DataType {
    match (data_type, format) {
        (DataType::Null, _) => DataType::Utf8,
        (dt @ (DataType::Boolean | DataType::Int64 | DataType::Float64 | DataType::Utf8), _) => dt,
        (_, FileFormat::Csv) => DataType::Utf8,
        (dt, FileFormat::Parquet) => dt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv(files: &[(&str, &'static str)]) -> Vec<DataFile> {
        files
            .iter()
            .map(|(key, body)| DataFile {
                path: ObjectStorePath::from(*key),
                bytes: Bytes::from_static(body.as_bytes()),
            })
            .collect()
    }

    fn types(schema: &SchemaRef) -> Vec<DataType> {
        schema.fields().iter().map(|f| f.data_type().clone()).collect()
    }

    #[test]
    fn test_integer_and_float_files_widen_to_float() {
        let files = csv(&[("t/part-0.csv", "id,amount\n1,10\n2,20\n"), ("t/part-1.csv", "id,amount\n3,30.5\n")]);
        let schema = table_schema(&files, FileFormat::Csv, &ReaderSettings::default()).unwrap();
        assert_eq!(types(&schema), vec![DataType::Int64, DataType::Float64]);
    }

    #[test]
    fn test_empty_column_takes_type_from_later_file() {
        let files = csv(&[("t/part-0.csv", "id,name\n1,\n2,\n"), ("t/part-1.csv", "id,name\n3,carol\n")]);
        let schema = table_schema(&files, FileFormat::Csv, &ReaderSettings::default()).unwrap();
        assert_eq!(types(&schema), vec![DataType::Int64, DataType::Utf8]);
    }

    #[test]
    fn test_header_only_file_is_ignored_for_types() {
        let files = csv(&[("t/part-0.csv", "id,amount\n1,10\n"), ("t/part-1.csv", "id,amount\n")]);
        let schema = table_schema(&files, FileFormat::Csv, &ReaderSettings::default()).unwrap();
        assert_eq!(types(&schema), vec![DataType::Int64, DataType::Int64]);
    }

    #[test]
    fn test_conflicting_types_fall_back_to_text() {
        let files = csv(&[("t/part-0.csv", "flag\ntrue\n"), ("t/part-1.csv", "flag\n7\n")]);
        let schema = table_schema(&files, FileFormat::Csv, &ReaderSettings::default()).unwrap();
        assert_eq!(types(&schema), vec![DataType::Utf8]);
    }

    #[test]
    fn test_mismatched_headers_rejected() {
        let files = csv(&[("t/part-0.csv", "id,name\n1,a\n"), ("t/part-1.csv", "id,label\n2,b\n")]);
        let err = table_schema(&files, FileFormat::Csv, &ReaderSettings::default()).unwrap_err();
        assert!(matches!(err, ReadError::Parse(_)), "{err}");
    }
}
