//! Small shared helpers: digests, size formatting, filename categories.

use sha2::Digest;
use sha2::Sha256;
use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Path;

/// Read buffer size for streaming digests.
const DIGEST_BUF_LEN: usize = 64 * 1024;

/// Computes the SHA-256 digest of a file's content with a fixed read
/// buffer, returning the lowercase hex digest and the number of bytes
/// hashed.
pub fn file_sha256(path: &Path) -> io::Result<(String, u64)> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; DIGEST_BUF_LEN];
    let mut total: u64 = 0;

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        total += n as u64;
    }

    Ok((hex::encode(hasher.finalize()), total))
}

/// Formats a byte count for humans, e.g. `1.5 KB`.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    if bytes < UNIT {
        return format!("{bytes} B");
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    let prefixes = ['K', 'M', 'G', 'T', 'P', 'E'];
    format!("{:.1} {}B", bytes as f64 / div as f64, prefixes[exp])
}

/// Buckets an environment filename by its conventional suffix.
#[must_use]
pub fn categorize_env_file(filename: &str) -> &'static str {
    if filename == ".env" {
        "Main"
    } else if filename.starts_with(".env.local") {
        "Local"
    } else if filename.starts_with(".env.development") || filename.starts_with(".env.dev") {
        "Development"
    } else if filename.starts_with(".env.production") || filename.starts_with(".env.prod") {
        "Production"
    } else if filename.starts_with(".env.staging") || filename.starts_with(".env.stage") {
        "Staging"
    } else if filename.starts_with(".env.test") || filename.starts_with(".env.testing") {
        "Test"
    } else {
        "Other"
    }
}
