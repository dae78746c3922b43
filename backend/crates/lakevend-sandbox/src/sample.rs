//! The sample table used by the sandbox backend.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use lakevend_commons::{FileFormat, GranteeIdentity, SessionTag, TableReference};

use crate::error::Result;
use crate::lake::SandboxLake;

pub const SAMPLE_DATABASE: &str = "sample_db";
pub const SAMPLE_TABLE: &str = "sample_table";
pub const SAMPLE_ROLE: &str = "app-role";
pub const SAMPLE_SESSION_TAG_VALUE: &str = "lakevend-sandbox";

/// `(id, name, amount, region)`
pub const SAMPLE_ROWS: &[(i64, &str, f64, &str)] = &[
    (1, "alice", 120.5, "us-east"),
    (2, "bob", 75.25, "eu-west"),
    (3, "carol", 310.75, "us-west"),
    (4, "dave", 42.5, "ap-south"),
    (5, "erin", 99.125, "eu-central"),
];

/// Handles to the seeded objects.
#[derive(Clone)]
pub struct SampleLake {
    pub lake: SandboxLake,
    pub table: TableReference,
    pub role: GranteeIdentity,
    pub session_tag: SessionTag,
}

pub fn sample_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("amount", DataType::Float64, false),
        Field::new("region", DataType::Utf8, false),
    ]))
}

fn sample_batch(rows: &[(i64, &str, f64, &str)]) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.0))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.1))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.2))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.3))),
    ];
    Ok(RecordBatch::try_new(sample_schema(), columns)?)
}

impl SandboxLake {
    /// Lake with `sample_db.sample_table` stored as two CSV files and an
    /// `app-role` that trusts the `lakevend-sandbox` session tag.
    pub fn with_sample_data() -> Result<SampleLake> {
        Self::with_sample_data_as(FileFormat::Csv)
    }

    pub fn with_sample_data_as(file_format: FileFormat) -> Result<SampleLake> {
        let lake = SandboxLake::default();
        lake.create_database(SAMPLE_DATABASE)?;
        let (first, second) = SAMPLE_ROWS.split_at(3);
        let table = lake.create_table(
            SAMPLE_DATABASE,
            SAMPLE_TABLE,
            file_format,
            vec![sample_batch(first)?, sample_batch(second)?],
        )?;
        let session_tag = SessionTag::authorized_caller(SAMPLE_SESSION_TAG_VALUE)?;
        let role = lake.create_role(SAMPLE_ROLE, session_tag.clone())?;
        log::info!("Sandbox lake seeded with {} ({} rows)", table, SAMPLE_ROWS.len());

        Ok(SampleLake {
            lake,
            table,
            role,
            session_tag,
        })
    }
}
