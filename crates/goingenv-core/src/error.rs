//! Error types for engine operations.
//!
//! The taxonomy is flat: scanning, cryptography, archive I/O, and
//! configuration each have their own error enum, and operations return the
//! kind they own. Errors never carry password or key material, and
//! decryption failures deliberately collapse into a single generic message
//! so that a wrong password cannot be told apart from a tampered container.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Minimum valid container length: salt (32) + nonce (12) + GCM tag (16).
pub const MIN_CONTAINER_LEN: usize = 32 + 12 + 16;

/// Cryptographic operation being performed when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoOp {
    /// Encrypting a plaintext buffer.
    Encrypt,
    /// Decrypting a container.
    Decrypt,
    /// Validating a password against a container.
    Validate,
}

impl fmt::Display for CryptoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encrypt => write!(f, "encrypt"),
            Self::Decrypt => write!(f, "decrypt"),
            Self::Validate => write!(f, "validate"),
        }
    }
}

/// Archive operation being performed when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOp {
    /// Creating an archive.
    Pack,
    /// Extracting an archive.
    Unpack,
    /// Reading a manifest without extracting.
    List,
    /// Verifying extracted files against a manifest.
    Verify,
}

impl fmt::Display for ArchiveOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pack => write!(f, "pack"),
            Self::Unpack => write!(f, "unpack"),
            Self::List => write!(f, "list"),
            Self::Verify => write!(f, "verify"),
        }
    }
}

/// Errors raised while scanning for environment files.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The scan root is missing, unreadable, or not a directory.
    #[error("path not accessible: {path}")]
    NotAccessible {
        /// The offending path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A configured pattern failed to compile.
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The offending pattern string.
        pattern: String,
        /// Compile error from the regex engine.
        #[source]
        source: regex::Error,
    },

    /// An entry could not be read during the walk or digest.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path of the entry that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A file's size changed between stat and digest.
    #[error("file changed during scan: {path}")]
    Changed {
        /// Path of the file that changed.
        path: PathBuf,
    },

    /// A path expected to be a regular file is not one.
    #[error("not a regular file: {path}")]
    NotAFile {
        /// The offending path.
        path: PathBuf,
    },

    /// A file exceeds the configured size limit.
    #[error("file size {size} exceeds maximum allowed size {max}: {path}")]
    TooLarge {
        /// The offending path.
        path: PathBuf,
        /// Actual size in bytes.
        size: u64,
        /// Configured limit in bytes.
        max: u64,
    },
}

/// Errors raised by the crypto service.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The input buffer was empty.
    #[error("{op} failed: data cannot be empty")]
    EmptyData {
        /// Operation that rejected the input.
        op: CryptoOp,
    },

    /// The password was empty.
    #[error("{op} failed: password cannot be empty")]
    EmptyPassword {
        /// Operation that rejected the password.
        op: CryptoOp,
    },

    /// The container is shorter than salt + nonce + tag.
    #[error("{op} failed: encrypted data too short ({len} bytes, minimum {MIN_CONTAINER_LEN})")]
    Truncated {
        /// Operation that rejected the input.
        op: CryptoOp,
        /// Actual input length in bytes.
        len: usize,
    },

    /// Authentication failed. Deliberately does not distinguish a wrong
    /// password from corrupted or foreign ciphertext.
    #[error("{op} failed: invalid password or corrupted data")]
    Auth {
        /// Operation that failed authentication.
        op: CryptoOp,
    },

    /// The AEAD implementation rejected the input.
    #[error("{op} failed: cipher failure")]
    Cipher {
        /// Operation that failed.
        op: CryptoOp,
    },

    /// The system random source failed.
    #[error("{op} failed: random generator failure: {source}")]
    Rng {
        /// Operation that needed randomness.
        op: CryptoOp,
        /// Underlying generator error.
        #[source]
        source: getrandom::Error,
    },

    /// Requested generated password length is below the minimum.
    #[error("password length must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },
}

/// Errors raised by the archive codec and store.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Pack was invoked with an empty file list.
    #[error("pack failed: no files to pack")]
    NoFiles,

    /// Two records share the same relative path.
    #[error("pack failed: duplicate entry {name:?}")]
    DuplicateEntry {
        /// The duplicated relative path.
        name: String,
    },

    /// The output file's parent directory does not exist.
    #[error("pack failed: output directory does not exist: {path}")]
    NoOutputDir {
        /// The missing directory.
        path: PathBuf,
    },

    /// A filesystem or tar-stream operation failed.
    #[error("{op} failed for {path}: {source}")]
    Io {
        /// Operation in progress.
        op: ArchiveOp,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Encryption or decryption failed.
    #[error("{op} failed for {path}: {source}")]
    Crypto {
        /// Operation in progress.
        op: ArchiveOp,
        /// Path of the container.
        path: PathBuf,
        /// Underlying crypto error.
        #[source]
        source: CryptoError,
    },

    /// The first tar member is not the manifest.
    #[error("{op} failed for {path}: invalid archive format: missing metadata")]
    MissingMetadata {
        /// Operation in progress.
        op: ArchiveOp,
        /// Path of the container.
        path: PathBuf,
    },

    /// The manifest could not be serialized or parsed.
    #[error("{op} failed for {path}: malformed metadata: {source}")]
    Metadata {
        /// Operation in progress.
        op: ArchiveOp,
        /// Path of the container.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// An archive member would resolve outside the target directory.
    #[error("unpack failed: entry escapes target directory: {name}")]
    PathEscape {
        /// The offending member name.
        name: PathBuf,
    },

    /// An existing file could not be renamed to its backup name.
    #[error("unpack failed: could not back up existing file {path}: {source}")]
    Backup {
        /// The file that could not be backed up.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An unpack filter pattern failed to compile.
    #[error("unpack failed: invalid filter pattern {pattern:?}: {source}")]
    InvalidFilter {
        /// The offending pattern string.
        pattern: String,
        /// Compile error from the regex engine.
        #[source]
        source: regex::Error,
    },
}

/// A configuration field is out of range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("validation error for {field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field.
    pub field: &'static str,
    /// Human-readable constraint description.
    pub message: String,
}

/// Converts a walkdir error into a `ScanError`, keeping the entry path when
/// walkdir knows it.
pub(crate) fn walk_error(err: walkdir::Error) -> ScanError {
    let path = err.path().map(PathBuf::from).unwrap_or_default();
    ScanError::Io {
        path,
        source: err.into(),
    }
}
