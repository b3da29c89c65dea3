//! Error conversion utilities for the CLI.
//!
//! Converts the engine's typed errors (thiserror) into user-facing
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use goingenv_core::ArchiveError;
use goingenv_core::CryptoError;
use goingenv_core::ScanError;
use std::path::Path;

/// Converts an `ArchiveError` into a user-friendly anyhow error.
pub fn convert_archive_error(err: ArchiveError, archive: &Path) -> anyhow::Error {
    match err {
        ArchiveError::Crypto {
            source: CryptoError::Auth { .. },
            ..
        } => {
            anyhow!(
                "Could not decrypt '{}': invalid password or corrupted data\n\
                 HINT: Check the password. If it is correct, the archive may be damaged.",
                archive.display()
            )
        }
        ArchiveError::Crypto {
            source: CryptoError::Truncated { len, .. },
            ..
        } => {
            anyhow!(
                "'{}' is not a goingenv archive ({len} bytes is below the structural minimum)",
                archive.display()
            )
        }
        ArchiveError::NoOutputDir { path } => {
            anyhow!(
                "Output directory '{}' does not exist\n\
                 HINT: Run 'goingenv init' to create the archive directory.",
                path.display()
            )
        }
        ArchiveError::PathEscape { name } => {
            anyhow!(
                "Archive '{}' contains an entry that escapes the target directory: '{}'\n\
                 HINT: This archive may be malicious. Do not unpack it.",
                archive.display(),
                name.display()
            )
        }
        ArchiveError::NoFiles => {
            anyhow!("Nothing to pack: the file list is empty")
        }
        ArchiveError::MissingMetadata { .. } => {
            anyhow!(
                "'{}' decrypted, but it is not a goingenv archive (missing manifest)",
                archive.display()
            )
        }
        other => anyhow!(other),
    }
}

/// Converts a `ScanError` into a user-friendly anyhow error.
pub fn convert_scan_error(err: ScanError) -> anyhow::Error {
    match err {
        ScanError::NotAccessible { path, source } => {
            anyhow!(
                "Cannot scan '{}': {source}\n\
                 HINT: Check that the directory exists and is readable.",
                path.display()
            )
        }
        ScanError::InvalidPattern { pattern, source } => {
            anyhow!("Invalid pattern {pattern:?}: {source}")
        }
        other => anyhow!(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goingenv_core::ArchiveOp;
    use goingenv_core::CryptoOp;
    use std::path::PathBuf;

    #[test]
    fn test_auth_failure_message_stays_generic() {
        let err = ArchiveError::Crypto {
            op: ArchiveOp::Unpack,
            path: PathBuf::from("a.enc"),
            source: CryptoError::Auth {
                op: CryptoOp::Decrypt,
            },
        };
        let msg = convert_archive_error(err, Path::new("a.enc")).to_string();
        assert!(msg.contains("invalid password or corrupted data"));
        // Must not reveal which of the two causes occurred.
        assert!(!msg.contains("wrong password"));
        assert!(!msg.contains("tampered"));
    }

    #[test]
    fn test_no_output_dir_hints_init() {
        let err = ArchiveError::NoOutputDir {
            path: PathBuf::from(".goingenv"),
        };
        let msg = convert_archive_error(err, Path::new("x.enc")).to_string();
        assert!(msg.contains("goingenv init"));
    }

    #[test]
    fn test_path_escape_warns() {
        let err = ArchiveError::PathEscape {
            name: PathBuf::from("../etc/passwd"),
        };
        let msg = convert_archive_error(err, Path::new("evil.enc")).to_string();
        assert!(msg.contains("malicious"));
    }
}
