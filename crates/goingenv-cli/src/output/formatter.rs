//! Output formatter trait for CLI results.

use anyhow::Result;
use goingenv_core::FileRecord;
use goingenv_core::FileStats;
use goingenv_core::Manifest;
use goingenv_core::Mismatch;
use goingenv_core::UnpackReport;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Project overview assembled by the status command.
#[derive(Debug, Serialize)]
pub struct ProjectStatus {
    /// Whether `.goingenv` bookkeeping exists.
    pub initialized: bool,
    /// Scanned directory.
    pub root: PathBuf,
    /// Detected environment files.
    pub records: Vec<FileRecord>,
    /// Aggregate statistics over the records.
    pub stats: FileStats,
    /// Archives currently in the store directory.
    pub archives: Vec<PathBuf>,
}

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the result of a scan (pack preview, status detail)
    fn format_scan_result(&self, records: &[FileRecord], stats: &FileStats) -> Result<()>;

    /// Format a successful pack
    fn format_pack_result(&self, output_path: &Path, file_count: usize, total_size: u64)
        -> Result<()>;

    /// Format the result of an unpack, with verification mismatches when
    /// verification ran
    fn format_unpack_result(
        &self,
        report: &UnpackReport,
        mismatches: Option<&[Mismatch]>,
    ) -> Result<()>;

    /// Format an archive manifest
    fn format_manifest(&self, archive_path: &Path, manifest: &Manifest, long: bool) -> Result<()>;

    /// Format the project status overview
    fn format_status(&self, status: &ProjectStatus) -> Result<()>;

    /// Format a success message
    fn format_success(&self, message: &str);

    /// Format a warning message
    fn format_warning(&self, message: &str);

    /// Format an informational message (suppressed when quiet)
    fn format_note(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Warning,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
        }
    }
}
