//! Shared fixtures for the driver integration tests: a seeded sandbox lake
//! and configs/requests that point at it.

#![allow(dead_code)]

use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use lakevend::driver::Backend;
use lakevend_commons::{ColumnSet, FileFormat, TableReference, VendedAccess};
use lakevend_configs::ServiceConfig;
use lakevend_filestore::{Representation, ScopedReader, TabularResult};
use lakevend_sandbox::{SampleLake, SandboxLake, SAMPLE_DATABASE, SAMPLE_ROWS};
use lakevend_vending::{CredentialVendor, VendOptions, VendRequest};

pub const BOTH: [Representation; 2] = [Representation::InMemory, Representation::Partitioned];

/// Every column of the sample table, in schema order.
pub const SAMPLE_COLUMNS: [&str; 4] = ["id", "name", "amount", "region"];

pub fn sample() -> SampleLake {
    SandboxLake::with_sample_data().expect("seed sandbox lake")
}

/// Sandbox config granting `columns`.
pub fn config_with(columns: &[&str]) -> ServiceConfig {
    let mut config = ServiceConfig::sandbox_default();
    config.grant.columns = columns.iter().map(|c| c.to_string()).collect();
    config
}

pub fn backend(sample: &SampleLake) -> Backend {
    Backend::sandbox(sample.lake.clone())
}

pub fn vendor(sample: &SampleLake, options: VendOptions) -> CredentialVendor {
    let lake = Arc::new(sample.lake.clone());
    CredentialVendor::new(lake.clone(), lake, options)
}

pub fn default_vendor(sample: &SampleLake) -> CredentialVendor {
    vendor(sample, VendOptions::new(sample.session_tag.clone()))
}

pub fn request(sample: &SampleLake, columns: &[&str]) -> VendRequest {
    request_for(sample, sample.table.clone(), columns)
}

pub fn request_for(sample: &SampleLake, table: TableReference, columns: &[&str]) -> VendRequest {
    VendRequest {
        table,
        grantee: sample.role.clone(),
        columns: ColumnSet::try_new(columns.iter().copied()).expect("valid column set"),
    }
}

pub fn reader(sample: &SampleLake) -> ScopedReader {
    ScopedReader::new(Arc::new(sample.lake.clone()), Default::default())
}

pub async fn read(
    sample: &SampleLake,
    access: &VendedAccess,
    representation: Representation,
) -> lakevend_filestore::Result<TabularResult> {
    reader(sample)
        .read(&access.credentials, &access.data_location(), representation)
        .await
}

/// Register `sample_db.<name>` with two columns and one data file.
pub fn create_other_table(lake: &SandboxLake, name: &str) -> TableReference {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("secret", DataType::Utf8, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![1, 2])),
        Arc::new(StringArray::from(vec!["s1", "s2"])),
    ];
    let batch = RecordBatch::try_new(schema, columns).expect("batch");
    lake.create_table(SAMPLE_DATABASE, name, FileFormat::Csv, vec![batch])
        .expect("create table")
}

/// Non-empty subsets of the sample columns, each in schema order.
pub fn column_subsets() -> Vec<Vec<&'static str>> {
    (1u32..(1 << SAMPLE_COLUMNS.len()))
        .map(|mask| {
            SAMPLE_COLUMNS
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, c)| *c)
                .collect()
        })
        .collect()
}

/// Sample table value of `column` in each row, as the readers render it.
/// Amounts are compared numerically by [`assert_rows_match`].
pub fn expected_column(column: &str) -> Vec<String> {
    SAMPLE_ROWS
        .iter()
        .map(|(id, name, amount, region)| match column {
            "id" => id.to_string(),
            "name" => name.to_string(),
            "amount" => amount.to_string(),
            "region" => region.to_string(),
            other => panic!("not a sample column: {}", other),
        })
        .collect()
}

/// Assert `result` holds exactly the sample rows projected to `columns`.
pub fn assert_rows_match(result: &TabularResult, columns: &[&str]) {
    assert_eq!(result.column_names(), columns, "{} columns", result.representation());
    let rows = result.rows_as_strings().expect("rows");
    assert_eq!(rows.len(), SAMPLE_ROWS.len(), "{} rows", result.representation());

    for (idx, column) in columns.iter().enumerate() {
        let expected = expected_column(column);
        for (row, want) in rows.iter().zip(expected.iter()) {
            let got = row[idx].as_deref().expect("non-null cell");
            if *column == "amount" {
                let got: f64 = got.parse().expect("numeric amount");
                let want: f64 = want.parse().expect("numeric amount");
                assert!((got - want).abs() < 1e-9, "amount {} != {}", got, want);
            } else {
                assert_eq!(got, want, "{} column {}", result.representation(), column);
            }
        }
    }
}
