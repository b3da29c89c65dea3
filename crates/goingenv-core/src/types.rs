//! Core data model: file records, manifests, and operation options.

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Archive format version written into every manifest.
pub const ARCHIVE_VERSION: &str = "1.0.0";

/// Name of the manifest member, always the first entry of the tar stream.
pub const METADATA_NAME: &str = "metadata.json";

/// One detected environment file.
///
/// Created by the scanner and immutable thereafter. The `path` field is the
/// absolute location at scan time and is advisory only; extraction uses
/// `relative_path` exclusively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path at scan time. Advisory; never used during unpack.
    pub path: PathBuf,

    /// Slash-separated path relative to the scan root. No leading separator,
    /// no `..` segments. Unique within a manifest.
    pub relative_path: String,

    /// Size in bytes at scan time.
    pub size: u64,

    /// Modification time, UTC.
    pub mod_time: DateTime<Utc>,

    /// SHA-256 content digest, lowercase hex.
    pub checksum: String,
}

/// Metadata block embedded at the head of every archive.
///
/// The manifest is authoritative for file ordering, expected digests, and
/// expected sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Archive creation time, UTC.
    pub created_at: DateTime<Utc>,

    /// Member files, in tar-stream order.
    pub files: Vec<FileRecord>,

    /// Sum of member sizes in bytes.
    pub total_size: u64,

    /// Human description. May be empty.
    pub description: String,

    /// Archive format version.
    pub version: String,
}

/// Options for a scan operation.
///
/// Optional fields fall back to the corresponding [`Config`](crate::Config)
/// values when unset.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Directory to scan.
    pub root: PathBuf,

    /// Maximum depth, counted as path separators in the relative path.
    pub max_depth: Option<usize>,

    /// Filename include patterns.
    pub patterns: Option<Vec<String>>,

    /// Filename exclude patterns.
    pub env_exclude_patterns: Option<Vec<String>>,

    /// Directory-path exclude patterns.
    pub exclude_patterns: Option<Vec<String>>,
}

impl ScanOptions {
    /// Creates options scanning `root` with Config defaults for everything
    /// else.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Overrides the maximum depth.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Overrides the include patterns.
    #[must_use]
    pub fn with_patterns(mut self, patterns: Vec<String>) -> Self {
        self.patterns = Some(patterns);
        self
    }

    /// Overrides the directory-path exclude patterns.
    #[must_use]
    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = Some(patterns);
        self
    }
}

/// Options for an unpack operation.
#[derive(Debug, Clone)]
pub struct UnpackOptions {
    /// Directory to extract into. Created if missing.
    pub target_dir: PathBuf,

    /// Replace existing files instead of skipping them.
    pub overwrite: bool,

    /// Rename an existing file to `<name>.backup` before overwriting.
    /// Only meaningful together with `overwrite`.
    pub backup: bool,

    /// When non-empty, only members whose base filename matches one of
    /// these patterns are extracted.
    pub include_patterns: Vec<String>,

    /// Members whose base filename matches one of these patterns are
    /// skipped.
    pub exclude_patterns: Vec<String>,
}

impl UnpackOptions {
    /// Creates options extracting into `target_dir`, skipping existing
    /// files and applying no filename filters.
    pub fn new<P: AsRef<Path>>(target_dir: P) -> Self {
        Self {
            target_dir: target_dir.as_ref().to_path_buf(),
            overwrite: false,
            backup: false,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }

    /// Sets the overwrite flag.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Sets the backup flag.
    #[must_use]
    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }
}

/// Result of an unpack operation.
///
/// The engine emits no progress events; this report is how collaborators
/// learn which members were written, skipped, or filtered out.
#[derive(Debug, Clone)]
pub struct UnpackReport {
    /// Manifest parsed from the archive.
    pub manifest: Manifest,

    /// Relative paths written to disk, in manifest order.
    pub extracted: Vec<String>,

    /// Relative paths skipped because the target existed and `overwrite`
    /// was false.
    pub skipped_existing: Vec<String>,

    /// Number of members excluded by the filename filters.
    pub filtered: usize,
}

/// One discrepancy between a manifest and the extracted tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// The file named by the manifest does not exist.
    Missing {
        /// Relative path of the missing file.
        relative_path: String,
    },

    /// The file exists but its size differs from the manifest.
    SizeDiffers {
        /// Relative path of the file.
        relative_path: String,
        /// Size recorded in the manifest.
        expected: u64,
        /// Size found on disk.
        actual: u64,
    },

    /// The file exists with the right size but its digest differs.
    DigestDiffers {
        /// Relative path of the file.
        relative_path: String,
        /// Digest recorded in the manifest.
        expected: String,
        /// Digest computed from disk.
        actual: String,
    },
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing { relative_path } => write!(f, "{relative_path}: missing"),
            Self::SizeDiffers {
                relative_path,
                expected,
                actual,
            } => write!(
                f,
                "{relative_path}: size differs (expected {expected}, found {actual})"
            ),
            Self::DigestDiffers { relative_path, .. } => {
                write!(f, "{relative_path}: checksum mismatch")
            }
        }
    }
}
