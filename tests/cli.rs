use assert_cmd::Command;
use predicates::prelude::*;

fn composer_deploy() -> Command {
    Command::cargo_bin("composer-deploy").expect("Binary exists")
}

#[test]
fn missing_bucket_flag_is_a_usage_error() {
    // No staging or upload may happen; clap rejects the invocation outright.
    composer_deploy()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--dags_bucket"));
}

#[test]
fn run_without_directories_skips_both_passes_and_exits_zero() {
    composer_deploy()
        .arg("--dags_bucket")
        .arg("test-bucket")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Skipping DAGs upload")
                .and(predicate::str::contains("Skipping Data upload")),
        );
}

#[test]
fn nonexistent_directories_warn_and_exit_zero() {
    composer_deploy()
        .args([
            "--dags_bucket",
            "test-bucket",
            "--dags_directory",
            "/definitely/missing/dags",
            "--data_directory",
            "/definitely/missing/data",
        ])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("'/definitely/missing/dags' directory not found")
                .and(predicate::str::contains(
                    "'/definitely/missing/data' directory not found",
                )),
        );
}

#[test]
fn banner_echoes_the_target_bucket() {
    composer_deploy()
        .arg("--dags_bucket")
        .arg("my-composer-bucket")
        .assert()
        .success()
        .stdout(predicate::str::contains("Target GCS Bucket: my-composer-bucket"));
}

#[test]
fn help_lists_all_flags() {
    composer_deploy()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--dags_directory")
                .and(predicate::str::contains("--data_directory"))
                .and(predicate::str::contains("--dags_bucket")),
        );
}
