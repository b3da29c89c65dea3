//! Manifest inspection without extraction.

use std::path::Path;

use secrecy::SecretString;

use super::open_container;
use super::take_manifest;
use crate::error::ArchiveError;
use crate::error::ArchiveOp;
use crate::types::Manifest;

/// Decrypts `archive_path` and returns its manifest.
///
/// Stops after parsing the first tar member; nothing is written to the
/// filesystem.
///
/// # Errors
///
/// - [`ArchiveError::Io`] when the archive cannot be read
/// - [`ArchiveError::Crypto`] when decryption fails
/// - [`ArchiveError::MissingMetadata`] when the first member is not the
///   manifest
/// - [`ArchiveError::Metadata`] when the manifest JSON is malformed
///
/// # Examples
///
/// ```no_run
/// use goingenv_core::archive;
/// use secrecy::SecretString;
///
/// let password = SecretString::from("hunter2!".to_string());
/// let manifest = archive::list(".goingenv/backup.enc".as_ref(), &password)?;
/// println!("{} files, {} bytes", manifest.files.len(), manifest.total_size);
/// # Ok::<(), goingenv_core::ArchiveError>(())
/// ```
pub fn list(archive_path: &Path, password: &SecretString) -> Result<Manifest, ArchiveError> {
    let plaintext = open_container(archive_path, password, ArchiveOp::List)?;

    let mut reader = tar::Archive::new(plaintext.as_slice());
    let mut entries = reader.entries().map_err(|source| ArchiveError::Io {
        op: ArchiveOp::List,
        path: archive_path.to_path_buf(),
        source,
    })?;

    take_manifest(&mut entries, ArchiveOp::List, archive_path)
}
