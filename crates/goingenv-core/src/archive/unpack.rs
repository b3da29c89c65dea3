//! Archive extraction.

use std::fs;
use std::fs::File;
use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use std::time::UNIX_EPOCH;

use secrecy::SecretString;

use super::open_container;
use super::take_manifest;
use crate::error::ArchiveError;
use crate::error::ArchiveOp;
use crate::scan::compile_patterns;
use crate::types::Manifest;
use crate::types::UnpackOptions;
use crate::types::UnpackReport;
use crate::types::METADATA_NAME;

/// Decrypts `archive_path` and extracts its members into
/// `opts.target_dir`.
///
/// Members are written in manifest order. Existing files are skipped
/// unless `overwrite` is set; with `backup` set as well, the existing file
/// is renamed to `<name>.backup` first, and a failed rename aborts the
/// whole unpack. Filename filters, when present, are applied to each
/// member's base name before extraction.
///
/// Every member name is checked against the target directory before
/// anything is written: names in the manifest that would resolve outside
/// it fail the operation up front.
///
/// A failure after partial extraction leaves the already-written files in
/// place; callers should treat the target directory as tainted until a
/// successful retry.
///
/// # Errors
///
/// - [`ArchiveError::Crypto`] when decryption fails (wrong password and
///   corrupted data are indistinguishable)
/// - [`ArchiveError::MissingMetadata`] / [`ArchiveError::Metadata`] for a
///   malformed archive
/// - [`ArchiveError::PathEscape`] for a member escaping the target
/// - [`ArchiveError::Backup`] when an existing file cannot be backed up
/// - [`ArchiveError::Io`] for filesystem failures
pub fn unpack(
    archive_path: &Path,
    password: &SecretString,
    opts: &UnpackOptions,
) -> Result<UnpackReport, ArchiveError> {
    let plaintext = open_container(archive_path, password, ArchiveOp::Unpack)?;

    let mut reader = tar::Archive::new(plaintext.as_slice());
    let mut entries = reader.entries().map_err(|source| ArchiveError::Io {
        op: ArchiveOp::Unpack,
        path: archive_path.to_path_buf(),
        source,
    })?;

    let manifest = take_manifest(&mut entries, ArchiveOp::Unpack, archive_path)?;

    // The manifest is authoritative; reject traversal attempts before any
    // file is written.
    validate_manifest_paths(&manifest)?;

    let include = compile_filters(&opts.include_patterns)?;
    let exclude = compile_filters(&opts.exclude_patterns)?;

    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: io::Error| ArchiveError::Io {
            op: ArchiveOp::Unpack,
            path,
            source,
        }
    };

    fs::create_dir_all(&opts.target_dir).map_err(io_err(&opts.target_dir))?;
    let target_root = opts
        .target_dir
        .canonicalize()
        .map_err(io_err(&opts.target_dir))?;

    let mut report = UnpackReport {
        manifest,
        extracted: Vec::new(),
        skipped_existing: Vec::new(),
        filtered: 0,
    };

    for entry in entries {
        let mut entry = entry.map_err(io_err(archive_path))?;
        let name: PathBuf = entry
            .path()
            .map_err(io_err(archive_path))?
            .into_owned();

        if name == Path::new(METADATA_NAME) {
            continue;
        }

        let base = name
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !passes_filters(&base, &include, &exclude) {
            report.filtered += 1;
            continue;
        }

        let dest = safe_join(&target_root, &name)?;

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
            // A symlinked parent could redirect the write outside the
            // target; resolve and re-check.
            let resolved = parent.canonicalize().map_err(io_err(parent))?;
            if !resolved.starts_with(&target_root) {
                return Err(ArchiveError::PathEscape { name });
            }
        }

        if dest.exists() {
            if !opts.overwrite {
                report
                    .skipped_existing
                    .push(name.to_string_lossy().into_owned());
                continue;
            }
            if opts.backup {
                let mut backup = dest.clone().into_os_string();
                backup.push(".backup");
                fs::rename(&dest, PathBuf::from(backup)).map_err(|source| {
                    ArchiveError::Backup {
                        path: dest.clone(),
                        source,
                    }
                })?;
            }
        }

        extract_member(&mut entry, &dest).map_err(io_err(&dest))?;
        report.extracted.push(name.to_string_lossy().into_owned());
    }

    Ok(report)
}

/// Writes one tar member to `dest`, restoring mode and mtime from its
/// header.
fn extract_member<R: io::Read>(entry: &mut tar::Entry<'_, R>, dest: &Path) -> io::Result<()> {
    let mode = entry.header().mode().unwrap_or(0o644);
    let mtime = entry.header().mtime().unwrap_or(0);

    let mut file = File::create(dest)?;
    io::copy(entry, &mut file)?;

    let times =
        fs::FileTimes::new().set_modified(UNIX_EPOCH + Duration::from_secs(mtime));
    file.set_times(times)?;
    drop(file);

    set_mode(dest, mode)
}

#[cfg(unix)]
fn set_mode(dest: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dest, fs::Permissions::from_mode(mode & 0o7777))
}

#[cfg(not(unix))]
fn set_mode(_dest: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

/// Joins a member name onto the target root, rejecting any component that
/// could resolve outside it.
fn safe_join(target_root: &Path, name: &Path) -> Result<PathBuf, ArchiveError> {
    let escape = || ArchiveError::PathEscape {
        name: name.to_path_buf(),
    };

    if name.as_os_str().is_empty() {
        return Err(escape());
    }

    let mut dest = target_root.to_path_buf();
    for component in name.components() {
        match component {
            Component::Normal(part) => dest.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(escape());
            }
        }
    }
    Ok(dest)
}

/// Rejects manifests whose relative paths contain traversal components.
fn validate_manifest_paths(manifest: &Manifest) -> Result<(), ArchiveError> {
    for record in &manifest.files {
        let name = Path::new(&record.relative_path);
        safe_join(Path::new(""), name)?;
    }
    Ok(())
}

fn compile_filters(patterns: &[String]) -> Result<Vec<regex::Regex>, ArchiveError> {
    compile_patterns(patterns).map_err(|err| match err {
        crate::error::ScanError::InvalidPattern { pattern, source } => {
            ArchiveError::InvalidFilter { pattern, source }
        }
        // compile_patterns only fails with InvalidPattern
        other => ArchiveError::Io {
            op: ArchiveOp::Unpack,
            path: PathBuf::new(),
            source: io::Error::other(other.to_string()),
        },
    })
}

fn passes_filters(base: &str, include: &[regex::Regex], exclude: &[regex::Regex]) -> bool {
    if !include.is_empty() && !include.iter().any(|re| re.is_match(base)) {
        return false;
    }
    !exclude.iter().any(|re| re.is_match(base))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::archive::pack;
    use crate::config::Config;
    use crate::error::CryptoError;
    use crate::scan;
    use crate::types::ScanOptions;
    use tempfile::TempDir;

    fn pw(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    fn make_archive(root: &Path, out: &Path, password: &SecretString) {
        let config = Config::default();
        let records = scan::scan_files(&config, &ScanOptions::new(root)).unwrap();
        pack(&records, out, password, "fixture").unwrap();
    }

    #[test]
    fn test_unpack_round_trip() {
        let source = TempDir::new().unwrap();
        std::fs::write(source.path().join(".env"), "DEBUG=true\n").unwrap();
        std::fs::create_dir(source.path().join("sub")).unwrap();
        std::fs::write(source.path().join("sub/.env.prod"), "PROD=yes\n").unwrap();

        let out = source.path().join("out.enc");
        let password = pw("pw");
        make_archive(source.path(), &out, &password);

        let target = TempDir::new().unwrap();
        let report = unpack(&out, &password, &UnpackOptions::new(target.path())).unwrap();

        assert_eq!(report.extracted, vec![".env", "sub/.env.prod"]);
        assert!(report.skipped_existing.is_empty());
        assert_eq!(
            std::fs::read(target.path().join(".env")).unwrap(),
            b"DEBUG=true\n"
        );
        assert_eq!(
            std::fs::read(target.path().join("sub/.env.prod")).unwrap(),
            b"PROD=yes\n"
        );
    }

    #[test]
    fn test_unpack_wrong_password() {
        let source = TempDir::new().unwrap();
        std::fs::write(source.path().join(".env"), "A=1\n").unwrap();
        let out = source.path().join("out.enc");
        make_archive(source.path(), &out, &pw("correct"));

        let target = TempDir::new().unwrap();
        let err = unpack(&out, &pw("wrong"), &UnpackOptions::new(target.path())).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::Crypto {
                source: CryptoError::Auth { .. },
                ..
            }
        ));
        // Target untouched.
        assert_eq!(std::fs::read_dir(target.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unpack_truncated_container() {
        let temp = TempDir::new().unwrap();
        let short = temp.path().join("short.enc");
        std::fs::write(&short, [0u8; 50]).unwrap();

        let target = TempDir::new().unwrap();
        let err = unpack(&short, &pw("p"), &UnpackOptions::new(target.path())).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::Crypto {
                source: CryptoError::Truncated { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_unpack_skips_existing_without_overwrite() {
        let source = TempDir::new().unwrap();
        std::fs::write(source.path().join(".env"), "NEW=1\n").unwrap();
        let out = source.path().join("out.enc");
        let password = pw("p");
        make_archive(source.path(), &out, &password);

        let target = TempDir::new().unwrap();
        std::fs::write(target.path().join(".env"), "OLD=1\n").unwrap();

        let report = unpack(&out, &password, &UnpackOptions::new(target.path())).unwrap();
        assert_eq!(report.skipped_existing, vec![".env"]);
        assert!(report.extracted.is_empty());
        assert_eq!(
            std::fs::read(target.path().join(".env")).unwrap(),
            b"OLD=1\n"
        );
    }

    #[test]
    fn test_unpack_overwrite_replaces() {
        let source = TempDir::new().unwrap();
        std::fs::write(source.path().join(".env"), "NEW=1\n").unwrap();
        let out = source.path().join("out.enc");
        let password = pw("p");
        make_archive(source.path(), &out, &password);

        let target = TempDir::new().unwrap();
        std::fs::write(target.path().join(".env"), "OLD=1\n").unwrap();

        let opts = UnpackOptions::new(target.path()).with_overwrite(true);
        let report = unpack(&out, &password, &opts).unwrap();
        assert_eq!(report.extracted, vec![".env"]);
        assert_eq!(
            std::fs::read(target.path().join(".env")).unwrap(),
            b"NEW=1\n"
        );
        assert!(!target.path().join(".env.backup").exists());
    }

    #[test]
    fn test_unpack_backup_preserves_previous() {
        let source = TempDir::new().unwrap();
        std::fs::write(source.path().join(".env"), "NEW=1\n").unwrap();
        let out = source.path().join("out.enc");
        let password = pw("p");
        make_archive(source.path(), &out, &password);

        let target = TempDir::new().unwrap();
        std::fs::write(target.path().join(".env"), "OLD=1\n").unwrap();

        let opts = UnpackOptions::new(target.path())
            .with_overwrite(true)
            .with_backup(true);
        unpack(&out, &password, &opts).unwrap();

        assert_eq!(
            std::fs::read(target.path().join(".env")).unwrap(),
            b"NEW=1\n"
        );
        assert_eq!(
            std::fs::read(target.path().join(".env.backup")).unwrap(),
            b"OLD=1\n"
        );
    }

    #[test]
    fn test_unpack_filename_filters() {
        let source = TempDir::new().unwrap();
        std::fs::write(source.path().join(".env"), "A=1\n").unwrap();
        std::fs::write(source.path().join(".env.local"), "B=2\n").unwrap();
        let out = source.path().join("out.enc");
        let password = pw("p");
        make_archive(source.path(), &out, &password);

        let target = TempDir::new().unwrap();
        let mut opts = UnpackOptions::new(target.path());
        opts.exclude_patterns = vec![r"\.env\.local".to_string()];

        let report = unpack(&out, &password, &opts).unwrap();
        assert_eq!(report.extracted, vec![".env"]);
        assert_eq!(report.filtered, 1);
        assert!(!target.path().join(".env.local").exists());
    }

    #[test]
    fn test_unpack_invalid_filter_pattern() {
        let source = TempDir::new().unwrap();
        std::fs::write(source.path().join(".env"), "A=1\n").unwrap();
        let out = source.path().join("out.enc");
        let password = pw("p");
        make_archive(source.path(), &out, &password);

        let target = TempDir::new().unwrap();
        let mut opts = UnpackOptions::new(target.path());
        opts.include_patterns = vec!["[bad".to_string()];

        let err = unpack(&out, &password, &opts).unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidFilter { .. }));
    }

    #[test]
    fn test_unpack_restores_mode_and_mtime() {
        let source = TempDir::new().unwrap();
        let env = source.path().join(".env");
        std::fs::write(&env, "A=1\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&env, std::fs::Permissions::from_mode(0o600)).unwrap();
        }

        let out = source.path().join("out.enc");
        let password = pw("p");
        make_archive(source.path(), &out, &password);

        let target = TempDir::new().unwrap();
        unpack(&out, &password, &UnpackOptions::new(target.path())).unwrap();

        let extracted = target.path().join(".env");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&extracted).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o600);
        }

        let original_mtime = std::fs::metadata(&env)
            .unwrap()
            .modified()
            .unwrap()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let extracted_mtime = std::fs::metadata(&extracted)
            .unwrap()
            .modified()
            .unwrap()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        assert_eq!(extracted_mtime, original_mtime);
    }

    #[test]
    fn test_unpack_rejects_traversal_in_crafted_archive() {
        use crate::crypto;
        use crate::types::{FileRecord, Manifest, ARCHIVE_VERSION};
        use chrono::Utc;

        // Build a malicious tar by hand: manifest names ../evil.
        let record = FileRecord {
            path: PathBuf::from("/tmp/evil"),
            relative_path: "../evil".to_string(),
            size: 5,
            mod_time: Utc::now(),
            checksum: "0".repeat(64),
        };
        let manifest = Manifest {
            created_at: Utc::now(),
            files: vec![record],
            total_size: 5,
            description: String::new(),
            version: ARCHIVE_VERSION.to_string(),
        };
        let json = serde_json::to_vec(&manifest).unwrap();

        let mut builder = tar::Builder::new(Vec::new());
        let mut header = tar::Header::new_gnu();
        header.set_size(json.len() as u64);
        header.set_mode(0o644);
        builder
            .append_data(&mut header, METADATA_NAME, json.as_slice())
            .unwrap();
        let tar_bytes = builder.into_inner().unwrap();

        let password = pw("p");
        let sealed = crypto::encrypt(&tar_bytes, &password).unwrap();
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("evil.enc");
        std::fs::write(&archive, sealed).unwrap();

        let target = TempDir::new().unwrap();
        let err = unpack(&archive, &password, &UnpackOptions::new(target.path())).unwrap_err();
        assert!(matches!(err, ArchiveError::PathEscape { .. }));
        assert_eq!(std::fs::read_dir(target.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_safe_join() {
        let root = Path::new("/safe");
        assert_eq!(
            safe_join(root, Path::new("a/b.txt")).unwrap(),
            Path::new("/safe/a/b.txt")
        );
        assert_eq!(
            safe_join(root, Path::new("./a.txt")).unwrap(),
            Path::new("/safe/a.txt")
        );
        assert!(safe_join(root, Path::new("../escape")).is_err());
        assert!(safe_join(root, Path::new("a/../../escape")).is_err());
        assert!(safe_join(root, Path::new("/absolute")).is_err());
        assert!(safe_join(root, Path::new("")).is_err());
    }
}
