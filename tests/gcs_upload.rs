//! Round trip against a storage emulator (e.g. fake-gcs-server).
//!
//! These tests exercise the real `GcsClient` transport and are skipped
//! unless `STORAGE_EMULATOR_HOST` points at a running emulator.

use composer_deploy::upload::{GcsClient, NewObject, ObjectStore};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn upload_object_against_emulator() {
    if std::env::var("STORAGE_EMULATOR_HOST").is_err() {
        eprintln!("STORAGE_EMULATOR_HOST not set, skipping emulator round trip");
        return;
    }

    let client = GcsClient::new_from_env().expect("client from env");
    let req = NewObject {
        bucket: "composer-deploy-test",
        object_key: "dags/emulator_smoke.py",
        content: b"print('hello from the emulator')",
    };

    let uploaded = client.upload_object(req).await.expect("upload succeeds");
    assert_eq!(uploaded.object_key, "dags/emulator_smoke.py");
}

#[tokio::test]
#[serial]
async fn reupload_overwrites_without_error() {
    if std::env::var("STORAGE_EMULATOR_HOST").is_err() {
        eprintln!("STORAGE_EMULATOR_HOST not set, skipping emulator round trip");
        return;
    }

    let client = GcsClient::new_from_env().expect("client from env");
    for body in [&b"v1"[..], &b"v2"[..]] {
        let req = NewObject {
            bucket: "composer-deploy-test",
            object_key: "dags/overwrite_smoke.py",
            content: body,
        };
        client.upload_object(req).await.expect("upload succeeds");
    }
}
