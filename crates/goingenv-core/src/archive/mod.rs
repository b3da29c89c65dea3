//! The container codec: tar-inside-AEAD archives with a manifest head.
//!
//! This module is the only place that knows the bit-exact container
//! layout. An archive is a single AES-256-GCM ciphertext (salt and nonce
//! embedded, see [`crate::crypto`]) over a POSIX tar stream whose first
//! member is always `metadata.json` and whose remaining members are the
//! manifest's files in manifest order.

mod list;
mod pack;
mod unpack;
mod verify;

pub use list::list;
pub use pack::pack;
pub use unpack::unpack;
pub use verify::verify_extracted;

use std::fs;
use std::io::Read;
use std::path::Path;

use secrecy::SecretString;

use crate::crypto;
use crate::error::ArchiveError;
use crate::error::ArchiveOp;
use crate::types::Manifest;
use crate::types::METADATA_NAME;

/// Reads and decrypts a container, yielding the plaintext tar stream.
fn open_container(
    archive_path: &Path,
    password: &SecretString,
    op: ArchiveOp,
) -> Result<Vec<u8>, ArchiveError> {
    let sealed = fs::read(archive_path).map_err(|source| ArchiveError::Io {
        op,
        path: archive_path.to_path_buf(),
        source,
    })?;

    crypto::decrypt(&sealed, password).map_err(|source| ArchiveError::Crypto {
        op,
        path: archive_path.to_path_buf(),
        source,
    })
}

/// Consumes the first tar member, which must be the manifest, and parses
/// it.
fn take_manifest<R: Read>(
    entries: &mut tar::Entries<'_, R>,
    op: ArchiveOp,
    archive_path: &Path,
) -> Result<Manifest, ArchiveError> {
    let missing = || ArchiveError::MissingMetadata {
        op,
        path: archive_path.to_path_buf(),
    };

    let entry = entries.next().ok_or_else(missing)?;
    let mut entry = entry.map_err(|source| ArchiveError::Io {
        op,
        path: archive_path.to_path_buf(),
        source,
    })?;

    let name = entry.path().map_err(|source| ArchiveError::Io {
        op,
        path: archive_path.to_path_buf(),
        source,
    })?;
    if name.as_ref() != Path::new(METADATA_NAME) {
        return Err(missing());
    }

    let mut json = Vec::new();
    entry
        .read_to_end(&mut json)
        .map_err(|source| ArchiveError::Io {
            op,
            path: archive_path.to_path_buf(),
            source,
        })?;

    serde_json::from_slice(&json).map_err(|source| ArchiveError::Metadata {
        op,
        path: archive_path.to_path_buf(),
        source,
    })
}
