//! Staging step: copies a source tree into scratch space with package-init
//! and test files excluded, then enumerates the files ready for upload.
//!
//! The copy never mutates the source tree. Each call mints a fresh
//! [`tempfile::TempDir`]; dropping the returned [`StagedTree`] removes the
//! scratch directory again, on success, skip and error paths alike.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};

/// A staged copy of one source directory.
///
/// Owns the temporary root so the scratch space lives exactly as long as the
/// upload pass that consumes it.
pub struct StagedTree {
    temp: TempDir,
    /// Absolute paths of all staged regular files, sorted for deterministic
    /// upload order. Directories are traversed but never listed.
    pub files: Vec<PathBuf>,
}

impl StagedTree {
    /// Root of the scratch copy. Object keys are derived relative to this.
    pub fn root(&self) -> &Path {
        self.temp.path()
    }
}

#[derive(Debug)]
pub enum StageError {
    Io(std::io::Error),
}

impl From<std::io::Error> for StageError {
    fn from(e: std::io::Error) -> Self {
        StageError::Io(e)
    }
}

/// Files excluded from staging: package-init files and test modules.
fn is_excluded(file_name: &str) -> bool {
    file_name == "__init__.py" || file_name.ends_with("_test.py")
}

/// Copies `source` into a fresh temporary directory, excluding
/// `__init__.py` and `*_test.py`, and returns the staged tree.
///
/// A missing source directory is a legitimate no-op: a warning is printed
/// and `Ok(None)` returned, so callers skip that pass without failing.
pub fn stage_directory(source: &Path) -> Result<Option<StagedTree>, StageError> {
    if !source.exists() {
        warn!(directory = %source.display(), "Source directory does not exist, skipping");
        println!(
            "⚠️ Warning: Directory '{}' does not exist. Skipping upload.",
            source.display()
        );
        return Ok(None);
    }

    let temp = TempDir::new()?;
    let mut files = Vec::new();
    copy_filtered(source, temp.path(), &mut files)?;
    files.sort();

    info!(
        directory = %source.display(),
        staging_root = %temp.path().display(),
        files = files.len(),
        "Staged source directory"
    );
    Ok(Some(StagedTree { temp, files }))
}

fn copy_filtered(source: &Path, dest: &Path, files: &mut Vec<PathBuf>) -> Result<(), StageError> {
    for entry_res in fs::read_dir(source)? {
        let entry = entry_res?;
        let path = entry.path();
        let target = dest.join(entry.file_name());
        if path.is_dir() {
            fs::create_dir_all(&target)?;
            copy_filtered(&path, &target, files)?;
        } else if path.is_file() {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if is_excluded(&file_name) {
                debug!(path = %path.display(), "Excluded from staging");
                continue;
            }
            fs::copy(&path, &target)?;
            files.push(target);
        }
    }
    Ok(())
}
