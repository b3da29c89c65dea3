//! Archive creation.

use std::collections::HashSet;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use secrecy::SecretString;
use tar::Builder;
use tar::Header;
use tempfile::NamedTempFile;

use crate::crypto;
use crate::error::ArchiveError;
use crate::error::ArchiveOp;
use crate::types::FileRecord;
use crate::types::Manifest;
use crate::types::ARCHIVE_VERSION;
use crate::types::METADATA_NAME;

/// Creates an encrypted archive of `records` at `output_path`.
///
/// The manifest is written as the first tar member, followed by each file
/// in input order with its current mode and mtime. The whole tar stream is
/// encrypted in memory and written atomically: the ciphertext goes to a
/// sibling temporary file that is fsynced and renamed over the output, so
/// a failed or interrupted pack leaves either the previous file or nothing.
///
/// The output's parent directory must already exist; creating it is the
/// caller's responsibility.
///
/// # Errors
///
/// - [`ArchiveError::NoFiles`] for an empty record list
/// - [`ArchiveError::DuplicateEntry`] when two records share a relative path
/// - [`ArchiveError::NoOutputDir`] when the parent directory is missing
/// - [`ArchiveError::Io`] for stat/read/write failures, including a file
///   whose size changed since it was scanned
/// - [`ArchiveError::Crypto`] when encryption fails
///
/// # Examples
///
/// ```no_run
/// use goingenv_core::{archive, scan, Config, ScanOptions};
/// use secrecy::SecretString;
///
/// let config = Config::default();
/// let records = scan::scan_files(&config, &ScanOptions::new("."))?;
/// let password = SecretString::from("hunter2!".to_string());
/// archive::pack(&records, ".goingenv/backup.enc".as_ref(), &password, "nightly")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn pack(
    records: &[FileRecord],
    output_path: &Path,
    password: &SecretString,
    description: &str,
) -> Result<(), ArchiveError> {
    if records.is_empty() {
        return Err(ArchiveError::NoFiles);
    }

    let mut seen = HashSet::new();
    for record in records {
        if !seen.insert(record.relative_path.as_str()) {
            return Err(ArchiveError::DuplicateEntry {
                name: record.relative_path.clone(),
            });
        }
    }

    let out_dir = parent_dir(output_path);
    if !out_dir.is_dir() {
        return Err(ArchiveError::NoOutputDir {
            path: out_dir.to_path_buf(),
        });
    }

    let manifest = Manifest {
        created_at: Utc::now(),
        files: records.to_vec(),
        total_size: records.iter().map(|r| r.size).sum(),
        description: description.to_string(),
        version: ARCHIVE_VERSION.to_string(),
    };

    let plaintext = build_tar(&manifest, records, output_path)?;

    let sealed = crypto::encrypt(&plaintext, password).map_err(|source| ArchiveError::Crypto {
        op: ArchiveOp::Pack,
        path: output_path.to_path_buf(),
        source,
    })?;
    drop(plaintext);

    write_atomic(output_path, out_dir, &sealed)
}

/// Serializes the manifest and file contents into an in-memory tar stream.
fn build_tar(
    manifest: &Manifest,
    records: &[FileRecord],
    output_path: &Path,
) -> Result<Vec<u8>, ArchiveError> {
    let pack_io = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| ArchiveError::Io {
            op: ArchiveOp::Pack,
            path,
            source,
        }
    };

    let json = serde_json::to_vec(manifest).map_err(|source| ArchiveError::Metadata {
        op: ArchiveOp::Pack,
        path: output_path.to_path_buf(),
        source,
    })?;

    let mut builder = Builder::new(Vec::new());

    let mut header = Header::new_gnu();
    header.set_size(json.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(manifest.created_at.timestamp().max(0) as u64);
    builder
        .append_data(&mut header, METADATA_NAME, json.as_slice())
        .map_err(pack_io(output_path))?;

    for record in records {
        let metadata = fs::metadata(&record.path).map_err(pack_io(&record.path))?;
        if metadata.len() != record.size {
            return Err(ArchiveError::Io {
                op: ArchiveOp::Pack,
                path: record.path.clone(),
                source: std::io::Error::other("file size changed since scan"),
            });
        }

        let mut header = Header::new_gnu();
        header.set_size(metadata.len());
        header.set_mode(file_mode(&metadata));
        header.set_mtime(unix_mtime(&metadata));

        let mut file = File::open(&record.path).map_err(pack_io(&record.path))?;
        builder
            .append_data(&mut header, &record.relative_path, &mut file)
            .map_err(pack_io(&record.path))?;
    }

    builder.into_inner().map_err(pack_io(output_path))
}

/// Writes `data` to `output_path` via a sibling temporary file, fsync, and
/// rename. The temporary file is removed on every failure path.
fn write_atomic(output_path: &Path, out_dir: &Path, data: &[u8]) -> Result<(), ArchiveError> {
    let io_err = |source: std::io::Error| ArchiveError::Io {
        op: ArchiveOp::Pack,
        path: output_path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(out_dir).map_err(io_err)?;
    tmp.write_all(data).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(output_path)
        .map(drop)
        .map_err(|err| io_err(err.error))
}

/// Parent directory of the output path, treating a bare filename as the
/// current directory.
fn parent_dir(output_path: &Path) -> &Path {
    match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(unix)]
fn file_mode(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn file_mode(metadata: &fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

/// Modification time as seconds since the epoch, clamped to zero for
/// pre-epoch timestamps.
fn unix_mtime(metadata: &fs::Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::scan;
    use crate::types::ScanOptions;
    use tempfile::TempDir;

    fn pw(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    fn scan_fixture(root: &Path) -> Vec<FileRecord> {
        let config = Config::default();
        scan::scan_files(&config, &ScanOptions::new(root)).unwrap()
    }

    #[test]
    fn test_pack_rejects_empty_list() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out.enc");
        let err = pack(&[], &out, &pw("p"), "").unwrap_err();
        assert!(matches!(err, ArchiveError::NoFiles));
    }

    #[test]
    fn test_pack_rejects_duplicate_paths() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".env"), "A=1\n").unwrap();
        let records = scan_fixture(temp.path());
        let doubled: Vec<FileRecord> = records.iter().chain(records.iter()).cloned().collect();

        let out = temp.path().join("out.enc");
        let err = pack(&doubled, &out, &pw("p"), "").unwrap_err();
        assert!(matches!(err, ArchiveError::DuplicateEntry { .. }));
    }

    #[test]
    fn test_pack_rejects_missing_output_dir() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".env"), "A=1\n").unwrap();
        let records = scan_fixture(temp.path());

        let out = temp.path().join("no/such/dir/out.enc");
        let err = pack(&records, &out, &pw("p"), "").unwrap_err();
        assert!(matches!(err, ArchiveError::NoOutputDir { .. }));
    }

    #[test]
    fn test_pack_produces_container() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".env"), "DEBUG=true\n").unwrap();
        let records = scan_fixture(temp.path());

        let out = temp.path().join("out.enc");
        pack(&records, &out, &pw("p"), "test archive").unwrap();

        assert!(out.is_file());
        let sealed = std::fs::read(&out).unwrap();
        // Larger than salt + nonce + tag: there is real ciphertext inside.
        assert!(sealed.len() > crate::error::MIN_CONTAINER_LEN);
    }

    #[test]
    fn test_pack_is_nondeterministic() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".env"), "A=1\n").unwrap();
        let records = scan_fixture(temp.path());

        let out_a = temp.path().join("a.enc");
        let out_b = temp.path().join("b.enc");
        pack(&records, &out_a, &pw("p"), "").unwrap();
        pack(&records, &out_b, &pw("p"), "").unwrap();

        assert_ne!(
            std::fs::read(&out_a).unwrap(),
            std::fs::read(&out_b).unwrap()
        );
    }

    #[test]
    fn test_pack_fails_when_source_changed() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".env"), "A=1\n").unwrap();
        let records = scan_fixture(temp.path());

        std::fs::write(temp.path().join(".env"), "A=1\nB=2\n").unwrap();

        let out = temp.path().join("out.enc");
        let err = pack(&records, &out, &pw("p"), "").unwrap_err();
        assert!(matches!(err, ArchiveError::Io { .. }));
    }

    #[test]
    fn test_pack_fails_when_source_missing() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".env"), "A=1\n").unwrap();
        let records = scan_fixture(temp.path());

        std::fs::remove_file(temp.path().join(".env")).unwrap();

        let out = temp.path().join("out.enc");
        let err = pack(&records, &out, &pw("p"), "").unwrap_err();
        assert!(matches!(err, ArchiveError::Io { .. }));
    }

    #[test]
    fn test_failed_pack_leaves_no_partial_output() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".env"), "A=1\n").unwrap();
        let records = scan_fixture(temp.path());
        std::fs::remove_file(temp.path().join(".env")).unwrap();

        let out = temp.path().join("out.enc");
        assert!(pack(&records, &out, &pw("p"), "").is_err());
        assert!(!out.exists());

        // No stray temporary files either.
        let leftovers: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert!(leftovers.is_empty(), "unexpected leftovers: {leftovers:?}");
    }

    #[test]
    fn test_parent_dir_of_bare_filename() {
        assert_eq!(parent_dir(Path::new("out.enc")), Path::new("."));
        assert_eq!(parent_dir(Path::new("dir/out.enc")), Path::new("dir"));
    }
}
