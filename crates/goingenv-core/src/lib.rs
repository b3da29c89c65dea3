//! Engine for packing environment files into authenticated-encrypted
//! containers.
//!
//! `goingenv-core` scans a project tree for dotfiles of the `.env` family,
//! records their sizes, timestamps, and SHA-256 digests, and packs them
//! into a single container: a tar stream whose first member is a JSON
//! manifest, wrapped in AES-256-GCM with a key derived from a password via
//! PBKDF2-HMAC-SHA256. Unpacking restores the originals losslessly, with
//! mode and mtime, and can be verified against the manifest digests.
//!
//! The engine is single-threaded per operation, emits no progress events,
//! and treats the filesystem as the only shared resource. Interactive
//! concerns (prompts, output, project initialization) belong to
//! collaborators such as the `goingenv` CLI.
//!
//! # Examples
//!
//! ```no_run
//! use goingenv_core::{archive, scan, store, Config, ScanOptions};
//! use secrecy::SecretString;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let records = scan::scan_files(&config, &ScanOptions::new("."))?;
//!
//! let password = SecretString::from("correct horse battery staple".to_string());
//! let output = store::default_archive_path(store::STORE_DIR.as_ref());
//! archive::pack(&records, &output, &password, "nightly backup")?;
//!
//! let manifest = archive::list(&output, &password)?;
//! println!("packed {} files", manifest.files.len());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod config;
pub mod crypto;
pub mod error;
pub mod scan;
pub mod store;
pub mod types;
pub mod util;

pub use config::Config;
pub use error::ArchiveError;
pub use error::ArchiveOp;
pub use error::CryptoError;
pub use error::CryptoOp;
pub use error::ScanError;
pub use error::ValidationError;
pub use scan::FileStats;
pub use types::FileRecord;
pub use types::Manifest;
pub use types::Mismatch;
pub use types::ScanOptions;
pub use types::UnpackOptions;
pub use types::UnpackReport;
