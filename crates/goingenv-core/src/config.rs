//! Scanner configuration.

use crate::error::ValidationError;
use serde::Deserialize;
use serde::Serialize;

/// Default maximum size of a single scanned file (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default maximum scan depth.
pub const DEFAULT_DEPTH: usize = 3;

/// Pattern and policy inputs consumed by the scanner.
///
/// A `Config` is immutable for the duration of a single scan, pack, or
/// unpack; callers may replace it between operations.
///
/// # Examples
///
/// ```
/// use goingenv_core::Config;
///
/// let config = Config::default();
/// assert!(config.validate().is_ok());
///
/// let custom = Config {
///     default_depth: 5,
///     ..Default::default()
/// };
/// assert!(custom.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Maximum scan depth, counted as path separators in the relative path.
    /// Must be between 1 and 10.
    pub default_depth: usize,

    /// Filename patterns that mark a file as an environment file.
    /// Must contain at least one pattern.
    pub env_patterns: Vec<String>,

    /// Filename patterns that exclude an otherwise matching file.
    pub env_exclude_patterns: Vec<String>,

    /// Directory-path patterns whose subtrees are pruned entirely.
    pub exclude_patterns: Vec<String>,

    /// Maximum size of a single file in bytes. Larger files are skipped
    /// silently. Must be greater than zero.
    pub max_file_size: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_depth: DEFAULT_DEPTH,
            env_patterns: vec![r"\.env.*".to_string()],
            env_exclude_patterns: Vec::new(),
            exclude_patterns: vec![
                r"node_modules/".to_string(),
                r"\.git/".to_string(),
                r"vendor/".to_string(),
                r"dist/".to_string(),
                r"build/".to_string(),
                r"target/".to_string(),
                r"bin/".to_string(),
                r"obj/".to_string(),
                r"\.next/".to_string(),
                r"\.nuxt/".to_string(),
                r"coverage/".to_string(),
            ],
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl Config {
    /// Checks all field ranges.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first out-of-range field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_depth < 1 || self.default_depth > 10 {
            return Err(ValidationError {
                field: "default_depth",
                message: "must be between 1 and 10".to_string(),
            });
        }

        if self.env_patterns.is_empty() {
            return Err(ValidationError {
                field: "env_patterns",
                message: "must have at least one pattern".to_string(),
            });
        }

        if self.max_file_size == 0 {
            return Err(ValidationError {
                field: "max_file_size",
                message: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
