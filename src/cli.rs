//! # composer-deploy CLI interface
//!
//! Command parsing and orchestration for the deployment helper. All staging
//! and upload logic lives in [`crate::stage`] and [`crate::deploy`]; this
//! module is strictly CLI glue.
//!
//! The async [`run`] entrypoint is separated from `main` so integration
//! tests can invoke the full flow programmatically.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::deploy::{upload_to_bucket, UploadRequest};
use crate::upload::GcsClient;

/// CLI for composer-deploy: upload DAGs and data to a Composer GCS bucket.
#[derive(Parser)]
#[clap(
    name = "composer-deploy",
    version,
    about = "Upload DAGs and data to a Composer GCS bucket"
)]
pub struct Cli {
    /// Path to the DAGs directory to upload.
    #[clap(long = "dags_directory")]
    pub dags_directory: Option<PathBuf>,

    /// Path to the data directory to upload.
    #[clap(long = "data_directory")]
    pub data_directory: Option<PathBuf>,

    /// GCS bucket name where files will be uploaded (e.g. my-bucket-name).
    #[clap(long = "dags_bucket")]
    pub dags_bucket: String,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!(bucket = %cli.dags_bucket, "Starting deployment");

    println!("\n📁 DAGS Directory: {:?}", cli.dags_directory);
    println!("📁 Data Directory: {:?}", cli.data_directory);
    println!("🪣 Target GCS Bucket: {}\n", cli.dags_bucket);

    let store = GcsClient::new_from_env()
        .map_err(|e| anyhow::Error::msg(format!("Failed to construct storage client: {e:?}")))?;

    // One pass for DAGs, one for data, independently and sequentially.
    let passes = [
        (cli.dags_directory.as_deref(), "dags/", "DAGs"),
        (cli.data_directory.as_deref(), "data/", "Data"),
    ];
    for (directory, prefix, label) in passes {
        let directory = match directory {
            Some(directory) if directory.exists() => directory,
            other => {
                tracing::warn!(pass = label, directory = ?other, "Skipping pass, source directory not found");
                println!(
                    "⚠️ Skipping {label} upload: '{}' directory not found.",
                    other.map_or_else(|| "None".to_string(), |d| d.display().to_string())
                );
                continue;
            }
        };

        let request = UploadRequest {
            source_directory: directory.to_path_buf(),
            bucket_name: cli.dags_bucket.clone(),
            destination_prefix: prefix.to_string(),
        };
        match upload_to_bucket(&store, &request).await {
            Ok(Some(report)) => {
                tracing::info!(
                    pass = label,
                    uploaded = report.uploaded.len(),
                    skipped_directories = report.skipped_directories,
                    "Upload pass complete"
                );
            }
            Ok(None) => {
                tracing::info!(pass = label, "Upload pass skipped, nothing to upload");
            }
            Err(e) => {
                tracing::error!(pass = label, error = %e, "Upload pass failed");
                return Err(anyhow::Error::msg(e));
            }
        }
    }

    Ok(())
}
