//! Project bookkeeping and configuration loading.
//!
//! The engine deliberately never creates the `.goingenv` directory; that
//! responsibility, together with the `.gitignore` that keeps archives
//! committable, lives here.

use anyhow::Context;
use anyhow::Result;
use goingenv_core::store;
use goingenv_core::Config;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Name of the user-level configuration file, looked up in `$HOME`.
pub const CONFIG_FILE_NAME: &str = ".goingenv.json";

/// Content of the `.gitignore` written into the store directory. Archives
/// themselves stay committable; only temporary files are ignored.
const GITIGNORE_CONTENT: &str = "\
# goingenv directory gitignore
# Archives (*.enc) stay committable for safe env transfer
*.tmp
*.temp
";

/// The store directory for a project root.
pub fn store_dir(root: &Path) -> PathBuf {
    root.join(store::STORE_DIR)
}

/// Whether goingenv has been initialized under `root`.
pub fn is_initialized(root: &Path) -> bool {
    let dir = store_dir(root);
    dir.is_dir() && dir.join(".gitignore").is_file()
}

/// Creates the store directory and its `.gitignore`.
///
/// Returns `false` when the project was already initialized and `force`
/// was not given.
pub fn init_project(root: &Path, force: bool) -> Result<bool> {
    if is_initialized(root) && !force {
        return Ok(false);
    }

    let dir = store_dir(root);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    fs::write(dir.join(".gitignore"), GITIGNORE_CONTENT)
        .with_context(|| format!("failed to create {}", dir.join(".gitignore").display()))?;

    Ok(true)
}

/// Fails with a pointer to `goingenv init` when the project is not
/// initialized.
pub fn require_initialized(root: &Path) -> Result<()> {
    if !is_initialized(root) {
        anyhow::bail!(
            "goingenv is not initialized in this directory; run 'goingenv init' first"
        );
    }
    Ok(())
}

/// Loads the user configuration, falling back to defaults when no config
/// file exists.
pub fn load_config() -> Result<Config> {
    let Some(path) = config_path() else {
        return Ok(Config::default());
    };
    if !path.is_file() {
        return Ok(Config::default());
    }

    let data = fs::read(&path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: Config = serde_json::from_slice(&data)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid configuration in {}", path.display()))?;

    Ok(config)
}

fn config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_bookkeeping() {
        let temp = TempDir::new().unwrap();
        assert!(!is_initialized(temp.path()));

        assert!(init_project(temp.path(), false).unwrap());
        assert!(is_initialized(temp.path()));

        let gitignore = fs::read_to_string(store_dir(temp.path()).join(".gitignore")).unwrap();
        assert!(gitignore.contains("*.tmp"));
        assert!(!gitignore.contains("*.enc"));
    }

    #[test]
    fn test_init_is_idempotent() {
        let temp = TempDir::new().unwrap();
        assert!(init_project(temp.path(), false).unwrap());
        assert!(!init_project(temp.path(), false).unwrap());
        assert!(init_project(temp.path(), true).unwrap());
    }

    #[test]
    fn test_require_initialized() {
        let temp = TempDir::new().unwrap();
        assert!(require_initialized(temp.path()).is_err());
        init_project(temp.path(), false).unwrap();
        assert!(require_initialized(temp.path()).is_ok());
    }
}
