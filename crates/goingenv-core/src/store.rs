//! Archive location conventions.
//!
//! The store knows three things: the project-scoped directory name, the
//! `.enc` suffix, and the timestamped default filename. It never creates
//! the directory; project initialization belongs to collaborators.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::error::ArchiveError;
use crate::error::ArchiveOp;

/// Project-scoped directory holding archives.
pub const STORE_DIR: &str = ".goingenv";

/// Filename suffix of archive containers.
pub const ARCHIVE_SUFFIX: &str = ".enc";

/// Lists the archive files in `dir`.
///
/// Only regular files whose name ends in `.enc` are returned, in the order
/// the filesystem yields them. A missing directory yields an empty list,
/// not an error.
///
/// # Errors
///
/// Returns [`ArchiveError::Io`] when the directory exists but cannot be
/// read.
pub fn available_archives(dir: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let io_err = |source: std::io::Error| ArchiveError::Io {
        op: ArchiveOp::List,
        path: dir.to_path_buf(),
        source,
    };

    let mut archives = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let name = entry.file_name();
        let is_archive = name.to_string_lossy().ends_with(ARCHIVE_SUFFIX);
        if is_archive && entry.file_type().map_err(io_err)?.is_file() {
            archives.push(dir.join(name));
        }
    }

    Ok(archives)
}

/// Returns the most recent archive in `dir`, or `None` when there is none.
///
/// Default archive names embed a `YYYYMMDD-HHMMSS` timestamp, so the
/// lexicographically greatest filename is the newest.
///
/// # Errors
///
/// Same failure modes as [`available_archives`].
pub fn latest_archive(dir: &Path) -> Result<Option<PathBuf>, ArchiveError> {
    let mut archives = available_archives(dir)?;
    archives.sort();
    Ok(archives.pop())
}

/// Builds the default output path for a new archive in `store_dir`:
/// `archive-YYYYMMDD-HHMMSS.enc`, timestamped in local time for human
/// readability.
#[must_use]
pub fn default_archive_path(store_dir: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    store_dir.join(format!("archive-{stamp}{ARCHIVE_SUFFIX}"))
}
