//! Vended credentials never reach past the grant they were issued for.

mod common;

use chrono::Duration;
use common::*;
use lakevend_filestore::Representation;
use lakevend_sandbox::GrantSemantics;

#[tokio::test]
async fn test_credentials_do_not_cover_other_tables() {
    let sample = sample();
    let other = create_other_table(&sample.lake, "payroll");
    let access = default_vendor(&sample)
        .vend(&request(&sample, &["id", "name"]))
        .await
        .unwrap();

    let other_root = sample.lake.storage_path(&other).unwrap();
    let mut location = access.data_location();
    location.storage_path = other_root;
    location.columns = vec!["id".into()];

    for representation in BOTH {
        let err = reader(&sample)
            .read(&access.credentials, &location, representation)
            .await
            .unwrap_err();
        assert!(err.is_access_denied(), "{:?}", err);
    }
}

#[tokio::test]
async fn test_regrant_replaces_earlier_columns() {
    let sample = sample();
    let vendor = default_vendor(&sample);

    vendor.vend(&request(&sample, &["name", "amount"])).await.unwrap();
    let second = vendor.vend(&request(&sample, &["id"])).await.unwrap();

    assert_eq!(second.authorized_columns, vec!["id"]);
    assert_eq!(sample.lake.granted_columns(&sample.role, &sample.table), vec!["id"]);

    let earlier = second.data_location().with_columns(["name"]);
    for representation in BOTH {
        let err = reader(&sample)
            .read(&second.credentials, &earlier, representation)
            .await
            .unwrap_err();
        assert!(
            matches!(err, lakevend_filestore::ReadError::MissingColumn { .. }),
            "{:?}",
            err
        );
    }
}

#[tokio::test]
async fn test_union_grants_still_report_only_requested_columns() {
    let sample = sample();
    sample.lake.set_grant_semantics(GrantSemantics::Union);
    let vendor = default_vendor(&sample);

    vendor.vend(&request(&sample, &["name", "amount"])).await.unwrap();
    let second = vendor.vend(&request(&sample, &["id"])).await.unwrap();

    assert_eq!(
        sample.lake.granted_columns(&sample.role, &sample.table),
        vec!["id", "name", "amount"]
    );
    assert_eq!(second.authorized_columns, vec!["id"]);

    let result = read(&sample, &second, Representation::InMemory).await.unwrap();
    assert_rows_match(&result, &["id"]);
}

#[tokio::test]
async fn test_expired_credentials_are_refused_by_storage() {
    let sample = sample();
    let access = default_vendor(&sample)
        .vend(&request(&sample, &["name"]))
        .await
        .unwrap();

    sample
        .lake
        .advance_clock(Duration::seconds(i64::from(access_duration_secs()) + 1));

    for representation in BOTH {
        let err = read(&sample, &access, representation).await.unwrap_err();
        assert!(err.is_access_denied(), "{:?}", err);
    }
}

#[tokio::test]
async fn test_forged_secret_is_refused_by_storage() {
    let sample = sample();
    let access = default_vendor(&sample)
        .vend(&request(&sample, &["name"]))
        .await
        .unwrap();

    let forged = lakevend_commons::TemporaryCredentialBundle::try_new(
        access.credentials.access_key_id(),
        "not-the-secret",
        access.credentials.session_token(),
        access.credentials.expiration(),
    )
    .unwrap();
    let err = reader(&sample)
        .read(&forged, &access.data_location(), Representation::Partitioned)
        .await
        .unwrap_err();
    assert!(err.is_access_denied(), "{:?}", err);
}

fn access_duration_secs() -> u32 {
    lakevend_commons::VendingConstants::DEFAULT_CREDENTIAL_DURATION_SECS
}
