//! Compiled pattern families for the scanner.

use regex::Regex;

use crate::error::ScanError;

/// Compiles a list of pattern strings, failing on the first invalid one.
///
/// # Errors
///
/// Returns [`ScanError::InvalidPattern`] naming the offending pattern.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, ScanError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| ScanError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// The three pattern families a scan evaluates.
///
/// Filename matchers (include and env-exclude) run against the base
/// filename only; directory matchers run against the directory path with a
/// trailing `/`. Each predicate returns on first match; there is no
/// ordering guarantee among multiple matching patterns.
#[derive(Debug)]
pub struct PatternSet {
    include: Vec<Regex>,
    env_exclude: Vec<Regex>,
    dir_exclude: Vec<Regex>,
}

impl PatternSet {
    /// Compiles the three families from their pattern strings.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidPattern`] for the first pattern that
    /// fails to compile, naming it.
    pub fn compile(
        include: &[String],
        env_exclude: &[String],
        dir_exclude: &[String],
    ) -> Result<Self, ScanError> {
        Ok(Self {
            include: compile_patterns(include)?,
            env_exclude: compile_patterns(env_exclude)?,
            dir_exclude: compile_patterns(dir_exclude)?,
        })
    }

    /// Whether a base filename matches any include pattern.
    #[must_use]
    pub fn is_candidate(&self, name: &str) -> bool {
        self.include.iter().any(|re| re.is_match(name))
    }

    /// Whether a base filename matches any env-exclude pattern.
    #[must_use]
    pub fn is_env_excluded(&self, name: &str) -> bool {
        self.env_exclude.iter().any(|re| re.is_match(name))
    }

    /// Whether a directory path matches any exclude pattern. The path is
    /// matched with a trailing `/` appended.
    #[must_use]
    pub fn is_directory_excluded(&self, path: &str) -> bool {
        if self.dir_exclude.is_empty() {
            return false;
        }
        let with_sep = format!("{path}/");
        self.dir_exclude.iter().any(|re| re.is_match(&with_sep))
    }
}
