//! Post-extraction integrity verification.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::ArchiveError;
use crate::error::ArchiveOp;
use crate::types::Manifest;
use crate::types::Mismatch;
use crate::util;

/// Compares every file named by `manifest` against the extracted tree
/// under `target_dir`.
///
/// Returns one [`Mismatch`] per discrepancy: a missing file, a size
/// difference, or a digest difference. An empty list means the extraction
/// is intact.
///
/// # Errors
///
/// Returns [`ArchiveError::Io`] only when an existing file cannot be read;
/// a missing file is a mismatch, not an error.
pub fn verify_extracted(
    manifest: &Manifest,
    target_dir: &Path,
) -> Result<Vec<Mismatch>, ArchiveError> {
    let mut mismatches = Vec::new();

    for record in &manifest.files {
        let path = target_dir.join(&record.relative_path);

        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                mismatches.push(Mismatch::Missing {
                    relative_path: record.relative_path.clone(),
                });
                continue;
            }
            Err(source) => {
                return Err(ArchiveError::Io {
                    op: ArchiveOp::Verify,
                    path,
                    source,
                });
            }
        };

        if metadata.len() != record.size {
            mismatches.push(Mismatch::SizeDiffers {
                relative_path: record.relative_path.clone(),
                expected: record.size,
                actual: metadata.len(),
            });
            continue;
        }

        let (digest, _) = util::file_sha256(&path).map_err(|source| ArchiveError::Io {
            op: ArchiveOp::Verify,
            path: path.clone(),
            source,
        })?;

        if digest != record.checksum {
            mismatches.push(Mismatch::DigestDiffers {
                relative_path: record.relative_path.clone(),
                expected: record.checksum.clone(),
                actual: digest,
            });
        }
    }

    Ok(mismatches)
}
