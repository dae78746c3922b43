//! End-to-end runs against the sandbox lake: vend for a column grant, then
//! read the permitted data into both representations.

mod common;

use common::*;
use lakevend::driver;
use lakevend_commons::FileFormat;
use lakevend_filestore::{ReadError, Representation};
use lakevend_sandbox::SandboxLake;

#[tokio::test]
async fn test_default_run_reads_name_and_amount() {
    let sample = sample();
    let config = config_with(&["name", "amount"]);

    let report = driver::run(&config, &backend(&sample), &BOTH).await.unwrap();

    assert_eq!(report.access.authorized_columns, vec!["name", "amount"]);
    assert_eq!(report.access.file_format, FileFormat::Csv);
    assert_eq!(report.results.len(), 2);
    assert!(report.row_counts_agree());

    let in_memory = report.result(Representation::InMemory).unwrap();
    let partitioned = report.result(Representation::Partitioned).unwrap();
    assert_rows_match(in_memory, &["name", "amount"]);
    assert_rows_match(partitioned, &["name", "amount"]);
    assert_eq!(
        in_memory.rows_as_strings().unwrap(),
        partitioned.rows_as_strings().unwrap()
    );
}

#[tokio::test]
async fn test_every_column_subset_reads_exactly_that_subset() {
    for columns in column_subsets() {
        let sample = sample();
        let access = default_vendor(&sample)
            .vend(&request(&sample, &columns))
            .await
            .unwrap();
        assert_eq!(access.authorized_columns, columns);

        for representation in BOTH {
            let result = read(&sample, &access, representation).await.unwrap();
            assert_rows_match(&result, &columns);
        }
    }
}

#[tokio::test]
async fn test_requested_order_follows_table_schema() {
    let sample = sample();
    let access = default_vendor(&sample)
        .vend(&request(&sample, &["region", "id"]))
        .await
        .unwrap();

    assert_eq!(access.authorized_columns, vec!["id", "region"]);
    let result = read(&sample, &access, Representation::Partitioned).await.unwrap();
    assert_eq!(result.column_names(), vec!["id", "region"]);
}

#[tokio::test]
async fn test_ungranted_column_is_missing_in_both_representations() {
    let sample = sample();
    let access = default_vendor(&sample)
        .vend(&request(&sample, &["name", "amount"]))
        .await
        .unwrap();
    let location = access.data_location().with_columns(["region"]);
    let reader = reader(&sample);

    for representation in BOTH {
        let err = reader
            .read(&access.credentials, &location, representation)
            .await
            .unwrap_err();
        match err {
            ReadError::MissingColumn {
                representation: r,
                column,
            } => {
                assert_eq!(r, representation);
                assert_eq!(column, "region");
            },
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_parquet_table_reads_the_same_rows() {
    let sample = SandboxLake::with_sample_data_as(FileFormat::Parquet).unwrap();
    let config = config_with(&["id", "name", "amount"]);

    let report = driver::run(&config, &backend(&sample), &BOTH).await.unwrap();

    assert_eq!(report.access.file_format, FileFormat::Parquet);
    for result in &report.results {
        assert_rows_match(result, &["id", "name", "amount"]);
    }
}

#[tokio::test]
async fn test_single_representation_run() {
    let sample = sample();
    let config = config_with(&["id"]);

    let report = driver::run(&config, &backend(&sample), &[Representation::Partitioned])
        .await
        .unwrap();

    assert_eq!(report.results.len(), 1);
    assert!(report.result(Representation::InMemory).is_none());
    let partitioned = report.result(Representation::Partitioned).unwrap();
    assert_eq!(partitioned.num_rows(), 5);
    assert!(partitioned.num_partitions() >= 1);
    assert!(partitioned.render().unwrap().contains("id"));
}

#[tokio::test]
async fn test_explicit_catalog_id_is_used() {
    let sample = sample();
    let mut config = config_with(&["name"]);
    config.table.catalog_id = Some(sample.lake.account_id());

    let report = driver::run(&config, &backend(&sample), &BOTH).await.unwrap();
    assert_eq!(report.access.table.catalog_id(), sample.lake.account_id());
}

#[tokio::test]
async fn test_full_table_access_with_every_column() {
    let sample = sample();
    let mut config = config_with(&common::SAMPLE_COLUMNS);
    config.grant.full_table_access = true;

    let report = driver::run(&config, &backend(&sample), &BOTH).await.unwrap();
    assert_eq!(report.access.authorized_columns, common::SAMPLE_COLUMNS);
    for result in &report.results {
        assert_rows_match(result, &common::SAMPLE_COLUMNS);
    }
}
