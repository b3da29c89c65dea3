//! Pattern-driven environment file discovery.
//!
//! The scanner walks a directory tree in lexically sorted order, applies
//! the configured pattern families, and yields [`FileRecord`]s with
//! streamed SHA-256 digests. The walk is depth-bounded: depth is the number
//! of path separators in the path relative to the root, so `max_depth = 3`
//! admits files up to three separators deep. Any I/O failure fails the
//! whole scan; partial results are never returned.

pub mod patterns;

pub use patterns::compile_patterns;
pub use patterns::PatternSet;

use chrono::DateTime;
use chrono::Utc;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::walk_error;
use crate::error::ScanError;
use crate::types::FileRecord;
use crate::types::ScanOptions;
use crate::util;

/// Scans for environment files under `opts.root`.
///
/// Optional fields of `opts` fall back to `config`. Symlinks are not
/// followed, so a symlinked file never yields a record. The traversal is
/// lexically sorted per directory, which makes the output order
/// deterministic for a fixed filesystem state.
///
/// # Errors
///
/// - [`ScanError::NotAccessible`] if the root is missing or not a directory
/// - [`ScanError::InvalidPattern`] for an uncompilable pattern
/// - [`ScanError::Io`] for any stat, read, or digest failure
/// - [`ScanError::Changed`] if a file's size changes between stat and digest
///
/// # Examples
///
/// ```no_run
/// use goingenv_core::{scan, Config, ScanOptions};
///
/// let config = Config::default();
/// let records = scan::scan_files(&config, &ScanOptions::new("."))?;
/// for record in &records {
///     println!("{} ({} bytes)", record.relative_path, record.size);
/// }
/// # Ok::<(), goingenv_core::ScanError>(())
/// ```
pub fn scan_files(config: &Config, opts: &ScanOptions) -> Result<Vec<FileRecord>, ScanError> {
    let root = normalize_root(&opts.root)?;

    let max_depth = opts.max_depth.unwrap_or(config.default_depth);
    let include = opts.patterns.as_deref().unwrap_or(&config.env_patterns);
    let env_exclude = opts
        .env_exclude_patterns
        .as_deref()
        .unwrap_or(&config.env_exclude_patterns);
    let dir_exclude = opts
        .exclude_patterns
        .as_deref()
        .unwrap_or(&config.exclude_patterns);

    let patterns = PatternSet::compile(include, env_exclude, dir_exclude)?;

    let mut records = Vec::new();

    // A file at walkdir depth d has d - 1 separators in its relative path,
    // so depth max_depth + 1 is the deepest level that can still contain
    // admissible files.
    let mut walker = WalkDir::new(&root)
        .sort_by_file_name()
        .max_depth(max_depth + 1)
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.map_err(walk_error)?;
        if entry.depth() == 0 {
            continue;
        }

        let rel = relative_slash_path(entry.path(), &root);

        if entry.file_type().is_dir() {
            if patterns.is_directory_excluded(&rel) {
                walker.skip_current_dir();
            }
            continue;
        }

        // Symlinks are not followed; only regular files are eligible.
        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = entry.metadata().map_err(walk_error)?;
        if metadata.len() > config.max_file_size {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !patterns.is_candidate(&name) {
            continue;
        }
        if patterns.is_env_excluded(&name) {
            continue;
        }

        records.push(build_record(entry.path(), rel, &metadata)?);
    }

    Ok(records)
}

/// Checks that a single file is a readable regular file within the size
/// limit.
///
/// # Errors
///
/// - [`ScanError::NotAccessible`] if the path cannot be stat'ed or opened
/// - [`ScanError::NotAFile`] if the path is a directory
/// - [`ScanError::TooLarge`] if the file exceeds `config.max_file_size`
pub fn validate_file(config: &Config, path: &Path) -> Result<(), ScanError> {
    let metadata = fs::metadata(path).map_err(|source| ScanError::NotAccessible {
        path: path.to_path_buf(),
        source,
    })?;

    if metadata.is_dir() {
        return Err(ScanError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    if metadata.len() > config.max_file_size {
        return Err(ScanError::TooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max: config.max_file_size,
        });
    }

    fs::File::open(path)
        .map(drop)
        .map_err(|source| ScanError::NotAccessible {
            path: path.to_path_buf(),
            source,
        })
}

/// Keeps only records whose base filename matches one of `patterns`.
///
/// # Errors
///
/// Returns [`ScanError::InvalidPattern`] for an uncompilable pattern.
pub fn filter_by_patterns(
    records: &[FileRecord],
    patterns: &[String],
) -> Result<Vec<FileRecord>, ScanError> {
    let regexes = compile_patterns(patterns)?;
    Ok(records
        .iter()
        .filter(|record| {
            let name = base_name(&record.relative_path);
            regexes.iter().any(|re| re.is_match(name))
        })
        .cloned()
        .collect())
}

/// Aggregate statistics over a scan result.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct FileStats {
    /// Number of records.
    pub total_files: usize,
    /// Sum of record sizes in bytes.
    pub total_size: u64,
    /// Mean record size in bytes, zero when empty.
    pub average_size: u64,
    /// Record count per `.env` filename category.
    pub by_category: BTreeMap<&'static str, usize>,
}

impl FileStats {
    /// Computes statistics over `records`.
    #[must_use]
    pub fn collect(records: &[FileRecord]) -> Self {
        let mut stats = Self {
            total_files: records.len(),
            ..Default::default()
        };

        for record in records {
            stats.total_size += record.size;
            let category = util::categorize_env_file(base_name(&record.relative_path));
            *stats.by_category.entry(category).or_insert(0) += 1;
        }

        if !records.is_empty() {
            stats.average_size = stats.total_size / records.len() as u64;
        }

        stats
    }
}

/// Canonicalizes the scan root, requiring an accessible directory.
fn normalize_root(root: &Path) -> Result<PathBuf, ScanError> {
    let canonical = root
        .canonicalize()
        .map_err(|source| ScanError::NotAccessible {
            path: root.to_path_buf(),
            source,
        })?;

    if !canonical.is_dir() {
        return Err(ScanError::NotAccessible {
            path: root.to_path_buf(),
            source: io::Error::other("not a directory"),
        });
    }

    Ok(canonical)
}

/// Builds a record for one regular file, digesting its content.
fn build_record(
    path: &Path,
    relative_path: String,
    metadata: &fs::Metadata,
) -> Result<FileRecord, ScanError> {
    let (checksum, hashed) = util::file_sha256(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if hashed != metadata.len() {
        return Err(ScanError::Changed {
            path: path.to_path_buf(),
        });
    }

    let modified = metadata.modified().map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mod_time: DateTime<Utc> = modified.into();

    Ok(FileRecord {
        path: path.to_path_buf(),
        relative_path,
        size: metadata.len(),
        mod_time,
        checksum,
    })
}

/// Renders a path relative to `root` with `/` separators.
fn relative_slash_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("/")
}

/// Base filename of a slash-separated relative path.
fn base_name(relative_path: &str) -> &str {
    relative_path
        .rsplit('/')
        .next()
        .unwrap_or(relative_path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn rel_paths(records: &[FileRecord]) -> Vec<&str> {
        records.iter().map(|r| r.relative_path.as_str()).collect()
    }

    #[test]
    fn test_scan_finds_env_files() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".env", "A=1\n");
        write(temp.path(), ".env.local", "B=2\n");
        write(temp.path(), "readme.md", "hello\n");

        let config = Config::default();
        let records = scan_files(&config, &ScanOptions::new(temp.path())).unwrap();

        assert_eq!(rel_paths(&records), vec![".env", ".env.local"]);
    }

    #[test]
    fn test_scan_records_carry_metadata() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".env", "DEBUG=true\n");

        let config = Config::default();
        let records = scan_files(&config, &ScanOptions::new(temp.path())).unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.size, 11);
        assert_eq!(record.checksum.len(), 64);
        assert!(record.path.is_absolute());
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let config = Config::default();
        let err = scan_files(&config, &ScanOptions::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ScanError::NotAccessible { .. }));
    }

    #[test]
    fn test_scan_depth_bound() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".env", "A=1\n");
        write(temp.path(), "a/.env", "B=2\n");
        write(temp.path(), "a/b/.env", "C=3\n");
        write(temp.path(), "a/b/c/.env", "D=4\n");

        let config = Config::default();
        let opts = ScanOptions::new(temp.path()).with_max_depth(2);
        let records = scan_files(&config, &opts).unwrap();

        assert_eq!(rel_paths(&records), vec![".env", "a/.env", "a/b/.env"]);
        for record in &records {
            assert!(record.relative_path.matches('/').count() <= 2);
        }
    }

    #[test]
    fn test_scan_prunes_excluded_directories() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".env", "A=1\n");
        write(temp.path(), "node_modules/.env", "B=2\n");
        write(temp.path(), "packages/app/node_modules/.env", "C=3\n");

        let config = Config::default();
        let opts = ScanOptions::new(temp.path()).with_max_depth(5);
        let records = scan_files(&config, &opts).unwrap();

        assert_eq!(rel_paths(&records), vec![".env"]);
    }

    #[test]
    fn test_scan_skips_oversized_files_silently() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".env", "A=1\n");
        write(temp.path(), ".env.big", &"x".repeat(100));

        let config = Config {
            max_file_size: 10,
            ..Default::default()
        };
        let records = scan_files(&config, &ScanOptions::new(temp.path())).unwrap();

        assert_eq!(rel_paths(&records), vec![".env"]);
    }

    #[test]
    fn test_scan_env_exclude_wins_over_include() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".env", "A=1\n");
        write(temp.path(), ".env.example", "A=\n");

        let config = Config {
            env_exclude_patterns: vec![r"\.env\.example".to_string()],
            ..Default::default()
        };
        let records = scan_files(&config, &ScanOptions::new(temp.path())).unwrap();

        assert_eq!(rel_paths(&records), vec![".env"]);
    }

    #[test]
    fn test_scan_invalid_pattern_fails() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".env", "A=1\n");

        let config = Config::default();
        let opts = ScanOptions::new(temp.path()).with_patterns(vec!["[bad".to_string()]);
        let err = scan_files(&config, &opts).unwrap_err();
        assert!(matches!(err, ScanError::InvalidPattern { .. }));
    }

    #[test]
    fn test_scan_is_deterministic() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".env.c", "1\n");
        write(temp.path(), ".env.a", "2\n");
        write(temp.path(), ".env.b", "3\n");
        write(temp.path(), "sub/.env", "4\n");

        let config = Config::default();
        let opts = ScanOptions::new(temp.path());
        let first = scan_files(&config, &opts).unwrap();
        let second = scan_files(&config, &opts).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            rel_paths(&first),
            vec![".env.a", ".env.b", ".env.c", "sub/.env"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_does_not_follow_symlinks() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".env", "A=1\n");
        std::os::unix::fs::symlink(temp.path().join(".env"), temp.path().join(".env.link"))
            .unwrap();

        let config = Config::default();
        let records = scan_files(&config, &ScanOptions::new(temp.path())).unwrap();

        assert_eq!(rel_paths(&records), vec![".env"]);
    }

    #[test]
    fn test_validate_file() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".env", "A=1\n");

        let config = Config::default();
        assert!(validate_file(&config, &temp.path().join(".env")).is_ok());

        let err = validate_file(&config, &temp.path().join("missing")).unwrap_err();
        assert!(matches!(err, ScanError::NotAccessible { .. }));

        let err = validate_file(&config, temp.path()).unwrap_err();
        assert!(matches!(err, ScanError::NotAFile { .. }));

        let small = Config {
            max_file_size: 1,
            ..Default::default()
        };
        let err = validate_file(&small, &temp.path().join(".env")).unwrap_err();
        assert!(matches!(err, ScanError::TooLarge { .. }));
    }

    #[test]
    fn test_filter_by_patterns() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".env", "A=1\n");
        write(temp.path(), ".env.local", "B=2\n");
        write(temp.path(), "sub/.env.production", "C=3\n");

        let config = Config::default();
        let records = scan_files(&config, &ScanOptions::new(temp.path())).unwrap();

        let filtered =
            filter_by_patterns(&records, &[r"\.env\.local".to_string()]).unwrap();
        assert_eq!(rel_paths(&filtered), vec![".env.local"]);

        let err = filter_by_patterns(&records, &["[bad".to_string()]).unwrap_err();
        assert!(matches!(err, ScanError::InvalidPattern { .. }));
    }

    #[test]
    fn test_file_stats() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".env", "A=1\n");
        write(temp.path(), ".env.local", "BB=22\n");
        write(temp.path(), "sub/.env.production", "C=3\n");

        let config = Config::default();
        let records = scan_files(&config, &ScanOptions::new(temp.path())).unwrap();
        let stats = FileStats::collect(&records);

        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_size, 14);
        assert_eq!(stats.average_size, 4);
        assert_eq!(stats.by_category.get("Main"), Some(&1));
        assert_eq!(stats.by_category.get("Local"), Some(&1));
        assert_eq!(stats.by_category.get("Production"), Some(&1));

        assert_eq!(FileStats::collect(&[]).average_size, 0);
    }
}
