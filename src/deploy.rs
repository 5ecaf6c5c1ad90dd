//! High-level pipeline: stage a source directory, then upload every staged
//! file to the destination bucket under its prefix.
//!
//! One [`UploadRequest`] describes one pass (DAGs or data). The pass is
//! strictly sequential and fail-fast on upload errors, with two deliberate
//! exceptions pinned by tests:
//!   - a staged entry that resolves to a directory is skipped with a warning
//!     and the batch continues;
//!   - a staged file that vanished before its upload aborts the pass and the
//!     remaining files are not uploaded.
//!
//! User-visible outcomes are printed status lines (`✅`/`⚠️`/`❌`); `tracing`
//! events carry the same information with structured fields.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::stage::stage_directory;
use crate::upload::{NewObject, ObjectStore};

/// One upload pass: a source directory bound to a bucket and key prefix.
/// Immutable for the duration of the pass.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub source_directory: PathBuf,
    pub bucket_name: String,
    /// Object-key prefix including its trailing slash, e.g. `dags/`.
    pub destination_prefix: String,
}

/// What one pass actually did, for logging and assertions downstream.
#[derive(Debug, Default)]
pub struct DeployReport {
    /// Object keys uploaded, in upload order.
    pub uploaded: Vec<String>,
    pub skipped_directories: usize,
}

/// Derives the destination object key for a staged file: the staging root is
/// replaced by the destination prefix and the remainder joined with `/`.
pub fn object_key(staging_root: &Path, file: &Path, destination_prefix: &str) -> String {
    let relative = file.strip_prefix(staging_root).unwrap_or(file);
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("{destination_prefix}{}", segments.join("/"))
}

/// Stages `request.source_directory` and uploads the result.
///
/// Returns `Ok(None)` when the pass is a no-op (missing source directory or
/// nothing staged after filtering). The scratch directory is removed when the
/// staged tree drops, on every exit path.
pub async fn upload_to_bucket<S>(
    store: &S,
    request: &UploadRequest,
) -> Result<Option<DeployReport>, String>
where
    S: ObjectStore + Sync,
{
    let staged = match stage_directory(&request.source_directory) {
        Ok(Some(staged)) => staged,
        Ok(None) => return Ok(None),
        Err(e) => {
            error!(error = ?e, directory = %request.source_directory.display(), "Staging failed");
            return Err(format!(
                "staging failed for '{}': {e:?}",
                request.source_directory.display()
            ));
        }
    };

    if staged.files.is_empty() {
        warn!(directory = %request.source_directory.display(), "Nothing staged, skipping upload");
        println!(
            "⚠️ No files found in '{}'. Skipping upload.",
            request.source_directory.display()
        );
        return Ok(None);
    }

    upload_pass(
        store,
        staged.root(),
        &staged.files,
        &request.bucket_name,
        &request.destination_prefix,
    )
    .await
    .map(Some)
}

/// Uploads every staged file, in order, to `bucket_name` under
/// `destination_prefix`. See the module docs for the error policy.
pub async fn upload_pass<S>(
    store: &S,
    staging_root: &Path,
    files: &[PathBuf],
    bucket_name: &str,
    destination_prefix: &str,
) -> Result<DeployReport, String>
where
    S: ObjectStore + Sync,
{
    info!(
        bucket = bucket_name,
        prefix = destination_prefix,
        files = files.len(),
        "Starting upload pass"
    );

    let mut report = DeployReport::default();
    for file in files {
        let key = object_key(staging_root, file, destination_prefix);

        // The stager only lists regular files; guard anyway.
        if file.is_dir() {
            warn!(path = %file.display(), "Staged entry is a directory, skipping");
            println!("⚠️ Skipping directory: {}", file.display());
            report.skipped_directories += 1;
            continue;
        }

        let content = match std::fs::read(file) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                error!(path = %file.display(), "Staged file vanished before upload, aborting pass");
                println!(
                    "❌ Error: {} not found. Ensure directory structure is correct.",
                    file.display()
                );
                return Err(format!(
                    "staged file vanished before upload: {}",
                    file.display()
                ));
            }
            Err(e) => {
                error!(error = ?e, path = %file.display(), "Failed to read staged file");
                return Err(format!(
                    "failed to read staged file '{}': {e}",
                    file.display()
                ));
            }
        };

        let req = NewObject {
            bucket: bucket_name,
            object_key: &key,
            content: &content,
        };
        match store.upload_object(req).await {
            Ok(object) => {
                info!(object_key = %object.object_key, "upload_object succeeded");
                println!(
                    "✅ Uploaded {} to gs://{}/{}",
                    file.display(),
                    bucket_name,
                    key
                );
                report.uploaded.push(key);
            }
            Err(e) => {
                error!(error = ?e, object_key = %key, "upload_object failed, aborting pass");
                return Err(format!("upload failed for '{key}': {e:?}"));
            }
        }
    }

    info!(
        uploaded = report.uploaded.len(),
        skipped_directories = report.skipped_directories,
        "Upload pass complete"
    );
    Ok(report)
}
